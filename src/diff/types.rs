//! Structured diff types serialized into the JSON report.

use serde::{Deserialize, Serialize};

/// Classification of a single line inside a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Present only in the new revision (`+`).
    Add,
    /// Present only in the old revision (`-`).
    Del,
    /// Unchanged context.
    Neutral,
    /// Diff metadata shown inline, such as `\ No newline at end of file`.
    Header,
}

/// One line of a hunk with its diff marker stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub content: String,
    /// Position in the revision the line belongs to: the new file for
    /// `add`/`neutral`, the old file for `del`.
    #[serde(rename = "line", default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
}

impl Line {
    pub fn numbered(kind: LineKind, content: impl Into<String>, line_number: usize) -> Self {
        Self {
            kind,
            content: content.into(),
            line_number: Some(line_number),
        }
    }

    pub fn unnumbered(kind: LineKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            line_number: None,
        }
    }
}

/// A contiguous block of changes introduced by an `@@` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    /// The `@@ ... @@` line exactly as git printed it.
    pub header: String,
    pub old_start: usize,
    pub new_start: usize,
    pub lines: Vec<Line>,
}

/// Added/removed line counts for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    pub added: usize,
    pub removed: usize,
}

/// Everything known about one changed path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    /// Repository-relative path, unquoted.
    pub path: String,
    pub stats: FileStats,
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            stats: FileStats::default(),
            hunks: Vec::new(),
        }
    }

    /// Number of lines of the given kind across all hunks.
    pub fn count_lines(&self, kind: LineKind) -> usize {
        self.hunks
            .iter()
            .flat_map(|hunk| hunk.lines.iter())
            .filter(|line| line.kind == kind)
            .count()
    }
}

/// Collected changes with grand totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Sum of `files[i].stats.added`.
    pub added: usize,
    /// Sum of `files[i].stats.removed`.
    pub removed: usize,
    pub files: Vec<FileDiff>,
}

impl DiffResult {
    /// Build a result whose totals are summed from `files`.
    pub fn from_files(files: Vec<FileDiff>) -> Self {
        let added = files.iter().map(|f| f.stats.added).sum();
        let removed = files.iter().map(|f| f.stats.removed).sum();
        Self {
            added,
            removed,
            files,
        }
    }

    pub fn file(&self, path: &str) -> Option<&FileDiff> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// The single JSON document printed for every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiffReport {
    Success(DiffResult),
    NoChanges(DiffResult),
    Error { message: String },
}

impl DiffReport {
    /// Wrap a result, choosing `no_changes` when there are no files.
    pub fn from_result(result: DiffResult) -> Self {
        if result.files.is_empty() {
            DiffReport::NoChanges(result)
        } else {
            DiffReport::Success(result)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        DiffReport::Error {
            message: message.into(),
        }
    }

    /// The wrapped result, if the run did not fail.
    pub fn result(&self) -> Option<&DiffResult> {
        match self {
            DiffReport::Success(result) | DiffReport::NoChanges(result) => Some(result),
            DiffReport::Error { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_report_has_no_files_key() {
        let report = DiffReport::error("fatal: not a repository");
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!({"status": "error", "message": "fatal: not a repository"})
        );
    }

    #[test]
    fn empty_result_is_no_changes() {
        let report = DiffReport::from_result(DiffResult::from_files(Vec::new()));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!({"status": "no_changes", "added": 0, "removed": 0, "files": []})
        );
    }

    #[test]
    fn success_report_uses_ui_field_names() {
        let mut file = FileDiff::new("x.txt");
        file.stats = FileStats {
            added: 1,
            removed: 0,
        };
        file.hunks.push(Hunk {
            header: "@@ -0,0 +1 @@".to_string(),
            old_start: 0,
            new_start: 1,
            lines: vec![
                Line::numbered(LineKind::Add, "hello", 1),
                Line::unnumbered(LineKind::Header, "\\ No newline at end of file"),
            ],
        });

        let report = DiffReport::from_result(DiffResult::from_files(vec![file]));
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(
            value,
            json!({
                "status": "success",
                "added": 1,
                "removed": 0,
                "files": [{
                    "path": "x.txt",
                    "stats": {"added": 1, "removed": 0},
                    "hunks": [{
                        "header": "@@ -0,0 +1 @@",
                        "oldStart": 0,
                        "newStart": 1,
                        "lines": [
                            {"type": "add", "content": "hello", "line": 1},
                            {"type": "header", "content": "\\ No newline at end of file"}
                        ]
                    }]
                }]
            })
        );
    }

    #[test]
    fn totals_are_summed_from_files() {
        let mut a = FileDiff::new("a");
        a.stats = FileStats {
            added: 3,
            removed: 1,
        };
        let mut b = FileDiff::new("b");
        b.stats = FileStats {
            added: 2,
            removed: 5,
        };
        let result = DiffResult::from_files(vec![a, b]);
        assert_eq!(result.added, 5);
        assert_eq!(result.removed, 6);
    }

    #[test]
    fn report_deserializes_back() {
        let text = r#"{"status":"success","added":0,"removed":0,"files":[{"path":"img.png","stats":{"added":0,"removed":0},"hunks":[]}]}"#;
        let report: DiffReport = serde_json::from_str(text).unwrap();
        let result = report.result().unwrap();
        assert_eq!(result.files[0].path, "img.png");
    }
}
