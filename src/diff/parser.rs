//! Core diff parsing logic.
//!
//! Walks `git diff` output line by line and groups it into files and hunks.
//! Per-file counts are not derived here; they come from numstat.

use super::helpers::{parse_diff_git_line, parse_hunk_header};
use super::types::{FileDiff, Hunk, Line, LineKind};
use tracing::warn;

/// Where the parser is relative to the diff structure.
#[derive(Debug)]
enum State {
    /// Before the first `diff --git` line.
    SeekFile,
    /// Inside a file's metadata, before or between hunks.
    InFile(FileDiff),
    /// Accumulating lines of a hunk.
    InHunk {
        file: FileDiff,
        hunk: Hunk,
        old_line: usize,
        new_line: usize,
    },
}

/// Line-oriented state machine over unified diff text.
#[derive(Debug)]
pub struct HunkParser {
    state: State,
    files: Vec<FileDiff>,
}

impl Default for HunkParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HunkParser {
    pub fn new() -> Self {
        Self {
            state: State::SeekFile,
            files: Vec::new(),
        }
    }

    /// Parse a complete diff in one call.
    pub fn parse(diff_output: &str) -> Vec<FileDiff> {
        let mut parser = HunkParser::new();
        for line in diff_output.lines() {
            parser.push_line(line);
        }
        parser.finish()
    }

    /// Feed one line (without its trailing newline).
    pub fn push_line(&mut self, line: &str) {
        let state = std::mem::replace(&mut self.state, State::SeekFile);

        // Format: "diff --git a/path/to/file b/path/to/file"
        if let Some(rest) = line.strip_prefix("diff --git ") {
            if let Some(file) = close_file(state) {
                self.files.push(file);
            }
            self.state = match parse_diff_git_line(rest).filter(|p| !p.is_empty()) {
                Some(path) => State::InFile(FileDiff::new(path)),
                None => {
                    // Hunks that follow have no file to attach to.
                    warn!(line, "no path in diff header; skipping file");
                    State::SeekFile
                }
            };
            return;
        }

        self.state = match state {
            State::SeekFile => State::SeekFile,
            State::InFile(file) => {
                if line.starts_with("@@") {
                    open_hunk(file, line)
                } else {
                    // index, mode, rename, similarity, ---/+++ and binary notices
                    State::InFile(file)
                }
            }
            State::InHunk {
                mut file,
                mut hunk,
                mut old_line,
                mut new_line,
            } => {
                if line.starts_with("@@") {
                    file.hunks.push(hunk);
                    open_hunk(file, line)
                } else {
                    let parsed = classify(line, &mut old_line, &mut new_line);
                    hunk.lines.push(parsed);
                    State::InHunk {
                        file,
                        hunk,
                        old_line,
                        new_line,
                    }
                }
            }
        };
    }

    /// Flush the open hunk and file and return every file in order.
    pub fn finish(mut self) -> Vec<FileDiff> {
        let state = std::mem::replace(&mut self.state, State::SeekFile);
        if let Some(file) = close_file(state) {
            self.files.push(file);
        }
        self.files
    }
}

fn open_hunk(file: FileDiff, header: &str) -> State {
    let (old_start, new_start) = parse_hunk_header(header);
    State::InHunk {
        file,
        hunk: Hunk {
            header: header.to_string(),
            old_start,
            new_start,
            lines: Vec::new(),
        },
        old_line: old_start,
        new_line: new_start,
    }
}

fn close_file(state: State) -> Option<FileDiff> {
    match state {
        State::SeekFile => None,
        State::InFile(file) => Some(file),
        State::InHunk { mut file, hunk, .. } => {
            file.hunks.push(hunk);
            Some(file)
        }
    }
}

/// Classify one hunk line and advance the counters it consumes.
fn classify(line: &str, old_line: &mut usize, new_line: &mut usize) -> Line {
    if let Some(content) = line.strip_prefix('+') {
        let number = *new_line;
        *new_line += 1;
        Line::numbered(LineKind::Add, content, number)
    } else if let Some(content) = line.strip_prefix('-') {
        let number = *old_line;
        *old_line += 1;
        Line::numbered(LineKind::Del, content, number)
    } else if let Some(note) = line.strip_prefix('\\') {
        // "\ No newline at end of file" belongs to the previous line.
        Line::unnumbered(LineKind::Header, note.trim_start())
    } else {
        let content = line.strip_prefix(' ').unwrap_or(line);
        let number = *new_line;
        *old_line += 1;
        *new_line += 1;
        Line::numbered(LineKind::Neutral, content, number)
    }
}
