//! CLI argument parsing for hunkscope.
//!
//! Uses clap derive macros for declarative argument definitions. The
//! project path is optional at the clap level so a missing path can be
//! reported as a JSON usage error instead of clap's plain-text one.

use crate::diff::DiffRequest;
use crate::error::{DiffError, Result};
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// One-line usage shown in JSON usage errors.
pub const USAGE: &str = "usage: hunkscope <project_path> [file_path] [--cached]";

/// hunkscope: structured git diffs for diff viewers.
///
/// Prints exactly one JSON document describing the changes in a
/// repository: per-file counts, hunks, and classified lines. Untracked
/// files are included as pure additions.
#[derive(Parser, Debug)]
#[command(name = "hunkscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository (or any directory inside it) to inspect.
    pub project_path: Option<PathBuf>,

    /// Only report changes to this path (disables the untracked scan).
    pub file_path: Option<String>,

    /// Compare the staged index against the last commit.
    #[arg(long)]
    pub cached: bool,

    /// Seconds to wait for each git invocation before giving up.
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Pretty-print the JSON document.
    #[arg(long)]
    pub pretty: bool,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse process arguments.
    ///
    /// `--help` and `--version` print and exit as usual; every other parse
    /// failure becomes a usage error.
    pub fn parse_args() -> Result<Self> {
        Self::parse_from_iter(std::env::args_os())
    }

    pub fn parse_from_iter<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|err| match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                let detail = err.to_string();
                let detail = detail
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .trim_start_matches("error: ");
                DiffError::Usage(format!("{} ({})", USAGE, detail))
            }
        })
    }

    /// Build the diff request, failing if no project path was given.
    pub fn to_request(&self) -> Result<DiffRequest> {
        let project_path = self
            .project_path
            .clone()
            .ok_or_else(|| DiffError::Usage(USAGE.to_string()))?;

        let mut request = DiffRequest::new(project_path)
            .with_staged(self.cached)
            .with_timeout(Duration::from_secs(self.timeout));
        if let Some(file) = &self.file_path {
            request = request.with_file_filter(file.clone());
        }
        Ok(request)
    }

    /// Log level selected by `-v` flags.
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}
