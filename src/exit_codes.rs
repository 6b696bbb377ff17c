//! Exit code constants for the hunkscope CLI.
//!
//! Only argument errors change the exit status:
//! - 0: A JSON report was printed (including `"status": "error"` reports)
//! - 1: Usage error (missing project path)
//! - 2: The report could not be written to stdout

/// A report was written to stdout.
pub const SUCCESS: i32 = 0;

/// Usage error: required arguments are missing.
pub const USAGE_ERROR: i32 = 1;

/// Output failure: stdout was closed or could not be written.
pub const OUTPUT_ERROR: i32 = 2;
