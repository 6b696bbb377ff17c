//! Merge stats, parsed hunks and untracked previews into one result.

use super::stats::StatTable;
use super::types::{DiffResult, FileDiff};
use std::collections::HashMap;

/// Combine the pipeline outputs keyed by path.
///
/// Order is first-seen: parsed files in announcement order, then paths only
/// known to `stats`, then untracked previews in discovery order. Stats come
/// from `stats`; paths missing there get zero counts. Totals are summed over
/// the final list.
pub fn assemble(stats: &StatTable, parsed: Vec<FileDiff>, untracked: Vec<FileDiff>) -> DiffResult {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut add = |file: FileDiff, files: &mut Vec<FileDiff>| match index.get(&file.path) {
        Some(&pos) => files[pos].hunks.extend(file.hunks),
        None => {
            index.insert(file.path.clone(), files.len());
            files.push(file);
        }
    };

    for file in parsed {
        add(file, &mut files);
    }
    for path in stats.paths() {
        add(FileDiff::new(path), &mut files);
    }
    for file in untracked {
        add(file, &mut files);
    }

    for file in &mut files {
        file.stats = stats.get(&file.path).unwrap_or_default();
    }

    let result = DiffResult::from_files(files);
    // Every stat path is in the list exactly once and the rest are zero.
    let expected = stats.totals();
    debug_assert_eq!((result.added, result.removed), (expected.added, expected.removed));
    result
}
