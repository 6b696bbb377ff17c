//! hunkscope: structured git diffs for diff viewers.
//!
//! Collects working-tree (or staged) changes from git and turns them into
//! files, hunks and classified lines, with untracked files previewed as
//! pure additions. See [`diff::collect_diff`] for the library entry point.

pub mod cli;
pub mod commands;
pub mod diff;
pub mod error;
pub mod exit_codes;
pub mod git;

#[cfg(test)]
mod test_support;
