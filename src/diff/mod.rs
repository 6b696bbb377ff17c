//! Diff parsing and assembly for hunkscope.
//!
//! This module turns git output into a structured, UI-ready diff:
//! - Per-file counts from `git diff --numstat`
//! - Hunks with classified, numbered lines from `git diff --unified=3`
//! - Untracked files previewed as pure additions
//!
//! The parsing is deterministic and supports:
//! - New files (from /dev/null) and deletions
//! - Renames (paths always resolve to the post-image side)
//! - Binary files (zero counts, no hunks)
//! - Quoted paths with escaped characters
//! - Repositories without any commit (diffed against the empty tree)

mod api;
mod assemble;
mod helpers;
mod parser;
mod source;
mod stats;
mod types;
mod untracked;


// Re-export public API
pub use api::{build_result, collect_diff, diff_report};
pub use parser::HunkParser;
pub use source::{DiffBase, DiffRequest, RawDiff};
pub use stats::StatTable;
pub use types::{DiffReport, DiffResult, FileDiff, FileStats, Hunk, Line, LineKind};
pub use untracked::PreviewLimits;
