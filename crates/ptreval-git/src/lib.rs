//! # ptreval-git
//!
//! **Tier 2 (Utilities)**
//!
//! Reads the identity of the analysed source repository (last tag, commit
//! hash, branch) by shelling out to `git`. Every query is best effort: a
//! missing `git` binary or a path outside any repository yields `None`
//! fields, never an error.
//!
//! ## What belongs here
//! * `git` process invocation with environment isolation
//! * Repository identity queries
//!
//! ## What does NOT belong here
//! * History walking or diffing
//! * Report assembly (use the `ptreval` CLI)

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use ptreval_types::RepoInfo;
use tracing::debug;

/// Create a `Command` for git that ignores `GIT_DIR` and `GIT_WORK_TREE`,
/// so the explicit `-C` path always wins.
fn git_cmd() -> Command {
    let mut cmd = Command::new("git");
    cmd.env_remove("GIT_DIR").env_remove("GIT_WORK_TREE");
    cmd
}

pub fn git_available() -> bool {
    git_cmd()
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run `git -C <path> <args>` and return trimmed stdout on success.
fn git_output(path: &Path, args: &[&str]) -> Option<String> {
    let output = git_cmd()
        .arg("-C")
        .arg(path)
        .args(args)
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        debug!(path = %path.display(), ?args, "git query failed");
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}

pub fn repo_root(path: &Path) -> Option<PathBuf> {
    git_output(path, &["rev-parse", "--show-toplevel"]).map(PathBuf::from)
}

/// Most recent tag reachable from `HEAD`.
pub fn last_tag(path: &Path) -> Option<String> {
    git_output(path, &["describe", "--tags", "--abbrev=0"])
}

pub fn head_commit(path: &Path) -> Option<String> {
    git_output(path, &["rev-parse", "HEAD"])
}

/// Current branch name; `HEAD` when detached.
pub fn branch(path: &Path) -> Option<String> {
    git_output(path, &["rev-parse", "--abbrev-ref", "HEAD"])
}

pub fn repo_info(path: &Path) -> RepoInfo {
    RepoInfo {
        tag: last_tag(path),
        commit: head_commit(path),
        branch: branch(path),
    }
}
