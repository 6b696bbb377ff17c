//! Previews for untracked files.
//!
//! Untracked files never show up in `git diff`, so each one is read from
//! disk and turned into a single all-additions hunk, the same shape git
//! prints for a newly added file. Reads are bounded by [`PreviewLimits`].

use super::stats::StatTable;
use super::types::{FileDiff, FileStats, Hunk, Line, LineKind};
use crate::error::{DiffError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Extensions that are never previewed as text.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tif", "tiff", "psd", "pdf", "zip", "gz",
    "tgz", "bz2", "xz", "7z", "rar", "tar", "jar", "war", "exe", "dll", "so", "dylib", "a", "o",
    "obj", "lib", "bin", "class", "pyc", "wasm", "mp3", "mp4", "m4a", "wav", "ogg", "flac", "mov",
    "avi", "mkv", "webm", "woff", "woff2", "ttf", "otf", "eot", "sqlite", "db", "dat",
];

/// How many leading bytes are checked for NUL when sniffing content.
const SNIFF_LEN: usize = 8000;

static BINARY_GLOBS: LazyLock<GlobSet> = LazyLock::new(|| {
    let mut builder = GlobSetBuilder::new();
    for ext in BINARY_EXTENSIONS {
        let glob = GlobBuilder::new(&format!("*.{}", ext))
            .case_insensitive(true)
            .build()
            .expect("Invalid binary extension glob");
        builder.add(glob);
    }
    builder.build().expect("Invalid binary extension glob set")
});

/// Ceilings on what an untracked preview may read and emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLimits {
    /// Files strictly larger than this many bytes are not previewed.
    pub max_bytes: u64,
    /// At most this many lines are emitted before a truncation marker.
    pub max_lines: usize,
}

impl Default for PreviewLimits {
    fn default() -> Self {
        Self {
            max_bytes: 100 * 1024,
            max_lines: 1000,
        }
    }
}

/// Returns true if the path's extension marks it as binary.
pub fn is_binary_path(path: &str) -> bool {
    BINARY_GLOBS.is_match(path)
}

/// Preview every untracked path not already known to `stats`.
///
/// Each previewed path is registered in `stats` (zero counts for binary and
/// oversized files) and returned in discovery order. Directories and files
/// that cannot be read are left out.
pub fn synthesize(
    root: &Path,
    paths: &[String],
    stats: &mut StatTable,
    limits: PreviewLimits,
) -> Vec<FileDiff> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_empty() || stats.contains(path) {
            continue;
        }

        match preview_file(root, path, limits) {
            Ok(Some(file)) => {
                stats.insert(file.path.clone(), file.stats);
                files.push(file);
            }
            Ok(None) => debug!(path = %path, "skipping untracked path that is not a file"),
            Err(err) => debug!(path = %path, "omitting untracked file: {}", err),
        }
    }

    files
}

/// Build the preview for a single untracked file.
///
/// Symlinks are never followed: like git, the link target text is the
/// content. Returns `Ok(None)` for directories and anything else that is
/// not a regular file.
pub fn preview_file(root: &Path, path: &str, limits: PreviewLimits) -> Result<Option<FileDiff>> {
    let full_path = root.join(path);
    let access_error = |source| DiffError::FileAccess {
        path: full_path.clone(),
        source,
    };

    let metadata = fs::symlink_metadata(&full_path).map_err(access_error)?;
    let file_type = metadata.file_type();

    if file_type.is_symlink() {
        let target = fs::read_link(&full_path).map_err(access_error)?;
        debug!(path, target = %target.display(), "untracked symlink");
        let text = target.to_string_lossy();
        return Ok(Some(addition_preview(path, &text, limits.max_lines)));
    }

    if !file_type.is_file() {
        return Ok(None);
    }

    if is_binary_path(path) {
        debug!(path, "untracked file is binary by extension");
        return Ok(Some(FileDiff::new(path)));
    }

    if metadata.len() > limits.max_bytes {
        debug!(
            path,
            size = metadata.len(),
            limit = limits.max_bytes,
            "untracked file too large to preview"
        );
        return Ok(Some(FileDiff::new(path)));
    }

    // The file may have grown since the stat above.
    let Some(bytes) = read_capped(&full_path, limits.max_bytes).map_err(access_error)? else {
        debug!(path, limit = limits.max_bytes, "untracked file grew past the preview limit");
        return Ok(Some(FileDiff::new(path)));
    };

    if bytes.iter().take(SNIFF_LEN).any(|&b| b == 0) {
        debug!(path, "untracked file looks binary");
        return Ok(Some(FileDiff::new(path)));
    }

    let text = String::from_utf8_lossy(&bytes);
    Ok(Some(addition_preview(path, &text, limits.max_lines)))
}

/// Read at most `max_bytes` from `path`.
///
/// Returns `Ok(None)` if there is more than that to read.
fn read_capped(path: &Path, max_bytes: u64) -> io::Result<Option<Vec<u8>>> {
    let mut bytes = Vec::new();
    File::open(path)?
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)?;

    if bytes.len() as u64 > max_bytes {
        return Ok(None);
    }
    Ok(Some(bytes))
}

/// Turn file text into a single hunk of additions.
///
/// Counts always reflect the whole file even when the emitted lines are
/// truncated to `max_lines`.
pub fn addition_preview(path: &str, text: &str, max_lines: usize) -> FileDiff {
    let line_count = text.lines().count();
    let mut file = FileDiff::new(path);
    file.stats = FileStats {
        added: line_count,
        removed: 0,
    };

    if line_count == 0 {
        return file;
    }

    let mut lines: Vec<Line> = text
        .lines()
        .take(max_lines)
        .enumerate()
        .map(|(idx, content)| Line::numbered(LineKind::Add, content, idx + 1))
        .collect();

    if line_count > max_lines {
        lines.push(Line::unnumbered(
            LineKind::Neutral,
            format!(
                "... {} more lines not shown (preview truncated at {} lines)",
                line_count - max_lines,
                max_lines
            ),
        ));
    }

    file.hunks.push(Hunk {
        header: format!("@@ -0,0 +1,{} @@", line_count),
        old_start: 0,
        new_start: 1,
        lines,
    });

    file
}
