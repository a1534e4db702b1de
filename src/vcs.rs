//! Version-control boundary: the snapshot/rollback manager.
//!
//! The controller consumes git through a deliberately narrow surface -
//! query-dirty, branch checkout, stage-all, commit, hard-reset, remove
//! untracked - abstracted behind the [`Vcs`] trait so the loop can be
//! exercised against a fake. The committed revision is the implicit
//! checkpoint: `rollback` restores the tree exactly to it, including
//! deleting files the agent created.

use anyhow::Context;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use crate::error::{Result, WardenError};

/// Narrow git capability surface consumed by the controller.
pub trait Vcs {
    /// Whether the working tree has any uncommitted change (staged,
    /// unstaged, or untracked).
    fn is_dirty(&self) -> Result<bool>;

    /// Whether a local branch with this name exists.
    fn branch_exists(&self, branch: &str) -> Result<bool>;

    /// Switch to `branch`, creating it if absent. Idempotent.
    fn checkout(&self, branch: &str) -> Result<()>;

    /// Stage every change in the working tree.
    fn stage_all(&self) -> Result<()>;

    /// Create one commit with `message` from the staged changes.
    ///
    /// Returns `false` if the commit was refused (e.g. nothing staged);
    /// that is reported, not fatal, and handled by the caller.
    fn commit(&self, message: &str) -> Result<bool>;

    /// Discard all uncommitted modifications to tracked files.
    fn hard_reset(&self) -> Result<()>;

    /// Delete all untracked files and directories.
    fn clean_untracked(&self) -> Result<()>;

    /// Restore the tree exactly to the last commit.
    ///
    /// Unconditionally safe to call at any point after a checkpoint.
    fn rollback(&self) -> Result<()> {
        self.hard_reset()?;
        self.clean_untracked()
    }
}

/// Real implementation shelling out to the `git` binary.
pub struct GitVcs {
    project_dir: PathBuf,
}

impl GitVcs {
    /// Create a git wrapper rooted at `project_dir`.
    #[must_use]
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
        }
    }

    fn git(&self, args: &[&str]) -> Result<std::process::Output> {
        debug!("git {}", args.join(" "));
        Command::new("git")
            .args(args)
            .current_dir(&self.project_dir)
            .output()
            .with_context(|| format!("Failed to run git {}", args.join(" ")))
            .map_err(WardenError::from)
    }

    /// Run git and fail the operation on a nonzero exit.
    fn git_ok(&self, operation: &str, args: &[&str]) -> Result<()> {
        let output = self.git(args)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(WardenError::git(
                operation,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }
}

impl Vcs for GitVcs {
    fn is_dirty(&self) -> Result<bool> {
        let output = self.git(&["status", "--porcelain"])?;
        if !output.status.success() {
            return Err(WardenError::git(
                "status",
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
    }

    fn branch_exists(&self, branch: &str) -> Result<bool> {
        let output = self.git(&["branch", "--list", branch])?;
        Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        if self.branch_exists(branch)? {
            self.git_ok("checkout", &["checkout", branch])
        } else {
            self.git_ok("checkout", &["checkout", "-b", branch])
        }
    }

    fn stage_all(&self) -> Result<()> {
        self.git_ok("add", &["add", "-A"])
    }

    fn commit(&self, message: &str) -> Result<bool> {
        let output = self.git(&["commit", "-m", message])?;
        if !output.status.success() {
            warn!(
                "git commit refused: {}",
                String::from_utf8_lossy(&output.stdout).trim()
            );
        }
        Ok(output.status.success())
    }

    fn hard_reset(&self) -> Result<()> {
        self.git_ok("reset", &["reset", "--hard", "HEAD"])
    }

    fn clean_untracked(&self) -> Result<()> {
        self.git_ok("clean", &["clean", "-fd"])
    }
}
