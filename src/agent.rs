//! Agent invocation boundary.
//!
//! The agent is an opaque, untrusted text-in/text-out collaborator: the
//! prompt goes to its stdin, its stdout comes back whole. The call blocks
//! until the process exits - there is no timeout or cancellation, and no
//! two invocations ever overlap.
//!
//! Completion is signaled by an output line exactly equal to the
//! configured sentinel after trimming surrounding whitespace. A sentinel
//! embedded in a longer line does not count.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{Result, WardenError};

/// Opaque agent process: prompt in, output out.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Run one agent invocation with the given prompt, awaited to
    /// completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the process fails to spawn or its output
    /// cannot be collected. A nonzero agent exit is not an error; the
    /// output is still inspected for the sentinel.
    async fn run(&self, prompt: &str) -> Result<String>;
}

/// Real agent driven through a configured command line.
pub struct CommandAgent {
    command: Vec<String>,
    project_dir: PathBuf,
}

impl CommandAgent {
    /// Create an agent from a command line and working directory.
    #[must_use]
    pub fn new(command: Vec<String>, project_dir: impl AsRef<Path>) -> Self {
        Self {
            command,
            project_dir: project_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Agent for CommandAgent {
    async fn run(&self, prompt: &str) -> Result<String> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| WardenError::agent("agent command is empty"))?;

        debug!("spawning agent: {}", self.command.join(" "));
        let mut child = Command::new(program)
            .args(args)
            .current_dir(&self.project_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| WardenError::agent(format!("failed to spawn {program}: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| WardenError::agent(format!("failed to write prompt: {e}")))?;
            // Close stdin so the agent sees EOF.
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| WardenError::agent(format!("failed to collect output: {e}")))?;

        if !output.stderr.is_empty() {
            warn!(
                "agent stderr: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        if !output.status.success() {
            warn!("agent exited with {}", output.status);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Whether the agent output contains the exact completion line.
#[must_use]
pub fn signals_done(output: &str, sentinel: &str) -> bool {
    output.lines().any(|line| line.trim() == sentinel)
}
