//! Command execution for hunkscope.
//!
//! Turns parsed arguments into a diff report and writes it to stdout.

use crate::cli::Cli;
use crate::diff::{DiffReport, PreviewLimits, diff_report};
use crate::error::{DiffError, Result};
use std::io::{self, Write};

/// Run the diff described by `cli` and print the report.
///
/// Git failures are printed as `"status": "error"` reports and still return
/// `Ok`. Usage errors and failures to write the report are returned.
pub fn run(cli: &Cli) -> Result<()> {
    let request = cli.to_request()?;
    let report = diff_report(&request, PreviewLimits::default());
    print_report(&report, cli.pretty).map_err(DiffError::Output)
}

/// Write one JSON document to stdout.
pub fn print_report(report: &DiffReport, pretty: bool) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write_report(&mut stdout, report, pretty)
}

/// Write one JSON document followed by a newline and flush.
pub fn write_report<W: Write>(out: &mut W, report: &DiffReport, pretty: bool) -> io::Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };

    let text = rendered.unwrap_or_else(|e| {
        // Only reachable if serialization itself breaks; keep stdout valid JSON.
        serde_json::json!({"status": "error", "message": e.to_string()}).to_string()
    });

    writeln!(out, "{}", text)?;
    out.flush()
}
