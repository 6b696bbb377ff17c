//! Per-file line counts from `git diff --numstat`.

use super::helpers::{resolve_rename, unquote_path};
use super::types::FileStats;
use std::collections::HashMap;
use tracing::debug;

/// Path -> counts table that remembers insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatTable {
    order: Vec<String>,
    stats: HashMap<String, FileStats>,
}

impl StatTable {
    /// Parse numstat output (`added<TAB>removed<TAB>path` per line).
    ///
    /// Binary files (`-` counts) are recorded with zero counts. Lines with
    /// fewer than three fields are skipped.
    pub fn parse(numstat: &str) -> Self {
        let mut table = StatTable::default();

        for line in numstat.lines() {
            let mut fields = line.splitn(3, '\t');
            let (Some(added), Some(removed), Some(path)) =
                (fields.next(), fields.next(), fields.next())
            else {
                if !line.trim().is_empty() {
                    debug!(line, "skipping malformed numstat line");
                }
                continue;
            };

            let path = resolve_rename(&unquote_path(path));
            if path.is_empty() {
                continue;
            }

            let stats = match (added.trim().parse(), removed.trim().parse()) {
                (Ok(added), Ok(removed)) => FileStats { added, removed },
                _ => FileStats::default(),
            };
            table.insert(path, stats);
        }

        table
    }

    /// Record counts for `path`. A repeated path keeps its first position.
    pub fn insert(&mut self, path: String, stats: FileStats) {
        if !self.stats.contains_key(&path) {
            self.order.push(path.clone());
        }
        self.stats.insert(path, stats);
    }

    pub fn get(&self, path: &str) -> Option<FileStats> {
        self.stats.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.stats.contains_key(path)
    }

    /// Paths in first-seen order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of every recorded entry.
    pub fn totals(&self) -> FileStats {
        self.stats.values().fold(FileStats::default(), |acc, s| FileStats {
            added: acc.added + s.added,
            removed: acc.removed + s.removed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_counts_and_totals() {
        let table = StatTable::parse("10\t5\tsrc/main.rs\n3\t0\tREADME.md\n");
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get("src/main.rs"),
            Some(FileStats {
                added: 10,
                removed: 5
            })
        );
        assert_eq!(
            table.totals(),
            FileStats {
                added: 13,
                removed: 5
            }
        );
        assert_eq!(table.paths().collect::<Vec<_>>(), vec!["src/main.rs", "README.md"]);
    }

    #[test]
    fn binary_marker_means_zero_counts() {
        let table = StatTable::parse("-\t-\tlogo.png\n");
        assert!(table.contains("logo.png"));
        assert_eq!(table.get("logo.png"), Some(FileStats::default()));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let table = StatTable::parse("garbage\n4\t1\n\n2\t2\tok.txt\n");
        assert_eq!(table.len(), 1);
        assert!(table.contains("ok.txt"));
    }

    #[test]
    fn tabs_inside_path_are_kept() {
        let table = StatTable::parse("1\t0\tweird\tname.txt\n");
        assert!(table.contains("weird\tname.txt"));
    }

    #[test]
    fn quoted_and_renamed_paths_resolve() {
        let table = StatTable::parse(
            "1\t1\t\"caf\\303\\251.txt\"\n0\t0\tsrc/{old => new}/lib.rs\n2\t0\ta.txt => b.txt\n",
        );
        assert!(table.contains("café.txt"));
        assert!(table.contains("src/new/lib.rs"));
        assert!(table.contains("b.txt"));
    }

    #[test]
    fn repeated_path_keeps_first_position() {
        let mut table = StatTable::parse("1\t0\ta\n1\t0\tb\n");
        table.insert(
            "a".to_string(),
            FileStats {
                added: 9,
                removed: 0,
            },
        );
        assert_eq!(table.paths().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(table.get("a").unwrap().added, 9);
    }
}
