//! Git command runner for hunkscope.
//!
//! Provides a wrapper around git commands with captured stdout/stderr, a
//! hard timeout per invocation and structured error handling. All git
//! operations should go through this module.

use crate::error::{DiffError, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default upper bound for a single git invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured output of a git command.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output, lossily decoded and left untrimmed.
    ///
    /// Diff text is whitespace-sensitive, so callers decide what to trim.
    pub stdout: String,
    /// Standard error (trimmed).
    pub stderr: String,
    /// Exit code of the process (None if terminated by a signal).
    pub exit_code: Option<i32>,
}

impl GitOutput {
    /// Returns true if stdout holds nothing but whitespace.
    pub fn is_empty(&self) -> bool {
        self.stdout.trim().is_empty()
    }

    /// Returns true if the command exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Message describing why the command failed.
    ///
    /// Prefers stderr, then stdout, then a generic status line.
    fn failure_message(&self, subcommand: &str) -> String {
        if !self.stderr.is_empty() {
            return self.stderr.clone();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.exit_code {
            Some(code) => format!("git {} exited with status {}", subcommand, code),
            None => format!("git {} was terminated by a signal", subcommand),
        }
    }
}

/// Run a git command and require a zero exit status.
///
/// # Arguments
///
/// * `cwd` - The working directory to run the command in
/// * `args` - The git command arguments (without "git" prefix)
/// * `timeout` - Maximum time to wait before killing the process
///
/// # Returns
///
/// * `Ok(GitOutput)` - On successful execution (exit code 0)
/// * `Err(DiffError::ExternalTool)` - On non-zero exit (message is the
///   trimmed stderr), spawn failure, or timeout
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str], timeout: Duration) -> Result<GitOutput> {
    let output = try_git(cwd, args, timeout)?;

    if output.success() {
        Ok(output)
    } else {
        let subcommand = args.first().copied().unwrap_or("");
        let message = output.failure_message(subcommand);
        warn!(
            subcommand,
            exit_code = ?output.exit_code,
            "git command failed: {}",
            message
        );
        Err(DiffError::ExternalTool(message))
    }
}

/// Run a git command and return its output whatever the exit status.
///
/// Only spawn failures and timeouts are errors. Use this for probes whose
/// non-zero exit is an answer rather than a failure.
pub fn try_git<P: AsRef<Path>>(cwd: P, args: &[&str], timeout: Duration) -> Result<GitOutput> {
    let cwd = cwd.as_ref();
    let subcommand = args.first().copied().unwrap_or("");

    // Output goes to anonymous temp files rather than pipes so a large diff
    // cannot fill a pipe buffer while we poll for exit.
    let mut stdout_file = capture_file(subcommand)?;
    let mut stderr_file = capture_file(subcommand)?;

    let started = Instant::now();
    let mut child = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(clone_handle(&stdout_file, subcommand)?))
        .stderr(Stdio::from(clone_handle(&stderr_file, subcommand)?))
        .spawn()
        .map_err(|e| {
            DiffError::ExternalTool(format!("failed to execute git {}: {}", subcommand, e))
        })?;

    let status = wait_with_timeout(&mut child, timeout, subcommand)?.ok_or_else(|| {
        warn!(subcommand, ?timeout, "git command timed out");
        DiffError::ExternalTool(format!(
            "git {} timed out after {:?}",
            subcommand, timeout
        ))
    })?;

    let stdout = read_captured(&mut stdout_file, subcommand)?;
    let stderr = read_captured(&mut stderr_file, subcommand)?;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    debug!(
        ?args,
        exit_code = ?status.code(),
        elapsed_ms,
        stdout_bytes = stdout.len(),
        "git finished"
    );

    Ok(GitOutput {
        stdout,
        stderr: stderr.trim().to_string(),
        exit_code: status.code(),
    })
}

/// Returns true if the repository has a commit checked out as `HEAD`.
pub fn has_head<P: AsRef<Path>>(cwd: P, timeout: Duration) -> Result<bool> {
    let output = try_git(cwd, &["rev-parse", "--verify", "--quiet", "HEAD"], timeout)?;
    Ok(output.success())
}

/// Ensure `cwd` is inside a git repository.
///
/// Fails with git's own message (e.g. `fatal: not a git repository ...`).
pub fn ensure_repository<P: AsRef<Path>>(cwd: P, timeout: Duration) -> Result<()> {
    run_git(cwd, &["rev-parse", "--git-dir"], timeout).map(|_| ())
}

/// Get the working tree root using `git rev-parse --show-toplevel`.
///
/// This works correctly from any location within a git repository.
pub fn repo_root<P: AsRef<Path>>(cwd: P, timeout: Duration) -> Result<PathBuf> {
    let output = run_git(cwd, &["rev-parse", "--show-toplevel"], timeout)?;
    Ok(PathBuf::from(output.stdout.trim_end_matches(['\n', '\r'])))
}

/// Object id of the empty tree in this repository's hash format.
///
/// Hashes empty stdin as a tree without writing anything to the object
/// store, so it is correct for both SHA-1 and SHA-256 repositories.
pub fn empty_tree_id<P: AsRef<Path>>(cwd: P, timeout: Duration) -> Result<String> {
    let output = run_git(cwd, &["hash-object", "-t", "tree", "--stdin"], timeout)?;
    let id = output.stdout.trim();
    if id.is_empty() {
        return Err(DiffError::ExternalTool(
            "git hash-object returned no object id for the empty tree".to_string(),
        ));
    }
    Ok(id.to_string())
}

/// Wait for a child process with timeout.
///
/// Returns `None` if the deadline passed and the process was killed.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    subcommand: &str,
) -> Result<Option<ExitStatus>> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    kill_process(child);
                    return Ok(None);
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                kill_process(child);
                return Err(DiffError::ExternalTool(format!(
                    "failed to wait for git {}: {}",
                    subcommand, e
                )));
            }
        }
    }
}

/// Kill a process and reap it.
fn kill_process(child: &mut Child) {
    // On Unix this is SIGKILL; on Windows it is TerminateProcess.
    let _ = child.kill();
    let _ = child.wait();
}

fn capture_file(subcommand: &str) -> Result<File> {
    tempfile::tempfile().map_err(|e| {
        DiffError::ExternalTool(format!(
            "failed to create output buffer for git {}: {}",
            subcommand, e
        ))
    })
}

fn clone_handle(file: &File, subcommand: &str) -> Result<File> {
    file.try_clone().map_err(|e| {
        DiffError::ExternalTool(format!(
            "failed to attach output buffer for git {}: {}",
            subcommand, e
        ))
    })
}

fn read_captured(file: &mut File, subcommand: &str) -> Result<String> {
    let mut bytes = Vec::new();
    file.seek(SeekFrom::Start(0))
        .and_then(|_| file.read_to_end(&mut bytes))
        .map_err(|e| {
            DiffError::ExternalTool(format!(
                "failed to read output of git {}: {}",
                subcommand, e
            ))
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
