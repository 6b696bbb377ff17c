//! Public API for diff collection.

use crate::error::Result;
use tracing::{debug, warn};

use super::assemble::assemble;
use super::parser::HunkParser;
use super::source::{self, DiffRequest, RawDiff};
use super::stats::StatTable;
use super::types::{DiffReport, DiffResult};
use super::untracked::{self, PreviewLimits};

/// Collect the structured diff for `request`.
///
/// # Arguments
///
/// * `request` - Project path, optional file filter, staged flag and timeout
/// * `limits` - Ceilings applied to untracked file previews
///
/// # Returns
///
/// * `Ok(DiffResult)` - Files in first-seen order with summed totals
/// * `Err(DiffError::ExternalTool)` - A git invocation failed or timed out;
///   no partial result is returned
pub fn collect_diff(request: &DiffRequest, limits: PreviewLimits) -> Result<DiffResult> {
    let raw = source::collect(request)?;
    Ok(build_result(&raw, limits))
}

/// Collect the diff and fold any failure into an error report.
pub fn diff_report(request: &DiffRequest, limits: PreviewLimits) -> DiffReport {
    match collect_diff(request, limits) {
        Ok(result) => DiffReport::from_result(result),
        Err(err) => {
            warn!("diff collection failed: {}", err);
            DiffReport::error(err.to_string())
        }
    }
}

/// Turn raw git output into a result.
///
/// Untracked paths are read relative to `raw.root`.
pub fn build_result(raw: &RawDiff, limits: PreviewLimits) -> DiffResult {
    if raw.is_empty() {
        return DiffResult::default();
    }

    let mut stats = StatTable::parse(&raw.numstat);
    let parsed = HunkParser::parse(&raw.unified);
    let previews = untracked::synthesize(&raw.root, &raw.untracked, &mut stats, limits);

    debug!(
        stat_entries = stats.len(),
        parsed_files = parsed.len(),
        untracked_previews = previews.len(),
        "assembling diff"
    );

    assemble(&stats, parsed, previews)
}
