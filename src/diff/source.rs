//! Raw text collection from git.
//!
//! Runs the three invocations the engine needs, strictly in sequence:
//! numstat summary, unified hunks, then the untracked listing.

use crate::error::Result;
use crate::git::{self, DEFAULT_TIMEOUT};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Everything needed to collect a diff. No ambient configuration is read.
#[derive(Debug, Clone)]
pub struct DiffRequest {
    /// Working directory for every git invocation.
    pub project_path: PathBuf,
    /// Restrict all invocations to a single path.
    pub file_filter: Option<String>,
    /// Compare the index against the last commit instead of the working tree.
    pub staged: bool,
    /// Upper bound for each git invocation.
    pub timeout: Duration,
}

impl DiffRequest {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            file_filter: None,
            staged: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_file_filter(mut self, file: impl Into<String>) -> Self {
        self.file_filter = Some(file.into());
        self
    }

    pub fn with_staged(mut self, staged: bool) -> Self {
        self.staged = staged;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Untracked files are listed only for whole-tree, working-tree diffs.
    pub fn scans_untracked(&self) -> bool {
        self.file_filter.is_none() && !self.staged
    }
}

/// What the diff is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffBase {
    /// The checked-out commit.
    Head,
    /// The empty tree, for repositories without any commit yet.
    EmptyTree(String),
}

impl DiffBase {
    /// Pick `HEAD` when it exists, otherwise the empty tree.
    ///
    /// Fails with git's message when `cwd` is not a repository.
    pub fn resolve(request: &DiffRequest) -> Result<Self> {
        let cwd = &request.project_path;
        if git::has_head(cwd, request.timeout)? {
            return Ok(DiffBase::Head);
        }

        git::ensure_repository(cwd, request.timeout)?;
        let id = git::empty_tree_id(cwd, request.timeout)?;
        Ok(DiffBase::EmptyTree(id))
    }

    pub fn as_rev(&self) -> &str {
        match self {
            DiffBase::Head => "HEAD",
            DiffBase::EmptyTree(id) => id,
        }
    }
}

/// Unprocessed output of the three git invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDiff {
    pub numstat: String,
    pub unified: String,
    /// Untracked, non-ignored paths in git's listing order.
    pub untracked: Vec<String>,
    /// Whether the untracked listing was run at all.
    pub scanned_untracked: bool,
    /// Directory untracked paths are relative to (the working tree root).
    pub root: PathBuf,
}

impl RawDiff {
    /// True if no invocation produced anything.
    pub fn is_empty(&self) -> bool {
        self.numstat.trim().is_empty()
            && self.unified.trim().is_empty()
            && self.untracked.is_empty()
    }
}

/// Run the numstat, unified and untracked invocations for `request`.
pub fn collect(request: &DiffRequest) -> Result<RawDiff> {
    let base = DiffBase::resolve(request)?;
    info!(
        project = %request.project_path.display(),
        base = base.as_rev(),
        staged = request.staged,
        file = request.file_filter.as_deref().unwrap_or(""),
        "collecting diff"
    );

    let numstat = run_diff(request, &base, "--numstat")?;
    let unified = run_diff(request, &base, "--unified=3")?;

    let (untracked, root) = if request.scans_untracked() {
        let root = git::repo_root(&request.project_path, request.timeout)?;
        (list_untracked(request)?, root)
    } else {
        (Vec::new(), request.project_path.clone())
    };
    debug!(count = untracked.len(), root = %root.display(), "listed untracked files");

    Ok(RawDiff {
        numstat,
        unified,
        untracked,
        scanned_untracked: request.scans_untracked(),
        root,
    })
}

/// Flags that override user config which would change paths or detection.
///
/// `diff.noprefix` and `diff.mnemonicPrefix` rewrite the `a/`/`b/` sides,
/// and `diff.relative` would make paths disagree with the root-relative
/// untracked listing.
const PINNED_DIFF_FLAGS: &[&str] = &[
    "--no-color",
    "--no-ext-diff",
    "--find-renames",
    "--src-prefix=a/",
    "--dst-prefix=b/",
    "--no-relative",
];

/// Argument list for one `git diff` mode.
pub fn diff_args<'a>(request: &'a DiffRequest, base: &'a DiffBase, mode: &'a str) -> Vec<&'a str> {
    let mut args = vec!["diff"];
    args.extend_from_slice(PINNED_DIFF_FLAGS);
    if request.staged {
        args.push("--cached");
    }
    args.push(mode);
    args.push(base.as_rev());
    if let Some(file) = request.file_filter.as_deref() {
        args.push("--");
        args.push(file);
    }
    args
}

fn run_diff(request: &DiffRequest, base: &DiffBase, mode: &str) -> Result<String> {
    let args = diff_args(request, base, mode);
    let output = git::run_git(&request.project_path, &args, request.timeout)?;
    Ok(output.stdout)
}

fn list_untracked(request: &DiffRequest) -> Result<Vec<String>> {
    // -z keeps paths unquoted and NUL separated; --full-name makes them
    // relative to the working tree root like `git diff` paths.
    let output = git::run_git(
        &request.project_path,
        &["ls-files", "-z", "--full-name", "--others", "--exclude-standard"],
        request.timeout,
    )?;

    Ok(output
        .stdout
        .split('\0')
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiffError;
    use crate::test_support::{commit_all, create_empty_repo, create_test_repo, git, write_file};
    use tempfile::TempDir;

    #[test]
    fn diff_args_working_tree() {
        let request = DiffRequest::new("/repo");
        let args = diff_args(&request, &DiffBase::Head, "--numstat");
        assert_eq!(
            args,
            vec![
                "diff",
                "--no-color",
                "--no-ext-diff",
                "--find-renames",
                "--src-prefix=a/",
                "--dst-prefix=b/",
                "--no-relative",
                "--numstat",
                "HEAD"
            ]
        );
    }

    #[test]
    fn diff_args_staged_with_filter() {
        let request = DiffRequest::new("/repo")
            .with_staged(true)
            .with_file_filter("src/lib.rs");
        let base = DiffBase::EmptyTree("abc".to_string());
        let args = diff_args(&request, &base, "--unified=3");
        assert_eq!(
            args,
            vec![
                "diff",
                "--no-color",
                "--no-ext-diff",
                "--find-renames",
                "--src-prefix=a/",
                "--dst-prefix=b/",
                "--no-relative",
                "--cached",
                "--unified=3",
                "abc",
                "--",
                "src/lib.rs"
            ]
        );
    }

    #[test]
    fn untracked_scan_rules() {
        assert!(DiffRequest::new(".").scans_untracked());
        assert!(!DiffRequest::new(".").with_staged(true).scans_untracked());
        assert!(!DiffRequest::new(".").with_file_filter("a").scans_untracked());
    }

    #[test]
    fn resolve_base_prefers_head() {
        let repo = create_test_repo();
        let base = DiffBase::resolve(&DiffRequest::new(repo.path())).unwrap();
        assert_eq!(base, DiffBase::Head);
    }

    #[test]
    fn resolve_base_without_commits_uses_empty_tree() {
        let repo = create_empty_repo();
        let base = DiffBase::resolve(&DiffRequest::new(repo.path())).unwrap();
        assert!(matches!(base, DiffBase::EmptyTree(_)));
    }

    #[test]
    fn resolve_base_outside_repository_fails() {
        let dir = TempDir::new().unwrap();
        let err = DiffBase::resolve(&DiffRequest::new(dir.path())).unwrap_err();
        assert!(matches!(err, DiffError::ExternalTool(_)));
    }

    #[test]
    fn collect_clean_repo_is_empty() {
        let repo = create_test_repo();
        let raw = collect(&DiffRequest::new(repo.path())).unwrap();
        assert!(raw.is_empty());
        assert!(raw.scanned_untracked);
    }

    #[test]
    fn collect_sees_modified_and_untracked() {
        let repo = create_test_repo();
        write_file(repo.path(), "README.md", "# Changed\n");
        write_file(repo.path(), "dir with space/new.txt", "hello\n");

        let raw = collect(&DiffRequest::new(repo.path())).unwrap();
        assert!(raw.numstat.contains("README.md"));
        assert!(raw.unified.contains("+# Changed"));
        assert_eq!(raw.untracked, vec!["dir with space/new.txt".to_string()]);
    }

    #[test]
    fn collect_staged_ignores_unstaged_and_untracked() {
        let repo = create_test_repo();
        write_file(repo.path(), "staged.txt", "one\n");
        git(repo.path(), &["add", "staged.txt"]);
        write_file(repo.path(), "README.md", "# Unstaged edit\n");
        write_file(repo.path(), "loose.txt", "x\n");

        let raw = collect(&DiffRequest::new(repo.path()).with_staged(true)).unwrap();
        assert!(raw.numstat.contains("staged.txt"));
        assert!(!raw.numstat.contains("README.md"));
        assert!(raw.untracked.is_empty());
        assert!(!raw.scanned_untracked);
    }

    #[test]
    fn collect_from_subdirectory_uses_root_relative_paths() {
        let repo = create_test_repo();
        write_file(repo.path(), "sub/inner.txt", "x\n");
        let sub = repo.path().join("sub");

        let raw = collect(&DiffRequest::new(&sub)).unwrap();
        assert_eq!(raw.untracked, vec!["sub/inner.txt".to_string()]);
        assert_eq!(
            raw.root.canonicalize().unwrap(),
            repo.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn collect_respects_gitignore() {
        let repo = create_test_repo();
        write_file(repo.path(), ".gitignore", "target/\n");
        commit_all(repo.path(), "ignore target");
        write_file(repo.path(), "target/out.txt", "build\n");
        write_file(repo.path(), "keep.txt", "keep\n");

        let raw = collect(&DiffRequest::new(repo.path())).unwrap();
        assert_eq!(raw.untracked, vec!["keep.txt".to_string()]);
    }
}
