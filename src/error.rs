//! Error types for hunkscope.
//!
//! Uses thiserror for derive macros. Tool failures abort the whole diff,
//! while file access failures are scoped to a single untracked file.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for diff collection.
#[derive(Error, Debug)]
pub enum DiffError {
    /// Required arguments were not provided.
    #[error("{0}")]
    Usage(String),

    /// A git invocation failed, timed out, or could not be started.
    ///
    /// The message is the trimmed stderr of the failing command so it can be
    /// shown to the user verbatim.
    #[error("{0}")]
    ExternalTool(String),

    /// An untracked file could not be inspected or read.
    #[error("failed to read '{}': {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The report could not be written, so nothing reached the caller.
    #[error("failed to write report: {0}")]
    Output(#[source] std::io::Error),
}

impl DiffError {
    /// Returns the process exit code for this error type.
    ///
    /// Tool failures are still reported through a successful process exit
    /// because the JSON document carries the error.
    pub fn exit_code(&self) -> i32 {
        match self {
            DiffError::Usage(_) => exit_codes::USAGE_ERROR,
            DiffError::ExternalTool(_) => exit_codes::SUCCESS,
            DiffError::FileAccess { .. } => exit_codes::SUCCESS,
            DiffError::Output(_) => exit_codes::OUTPUT_ERROR,
        }
    }
}

/// Result type alias for hunkscope operations.
pub type Result<T> = std::result::Result<T, DiffError>;
