//! Test-runner boundary.
//!
//! Invoked with no arguments beyond a working directory; a zero exit
//! status is a pass, anything else is a failure. The call blocks until
//! the runner exits.

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::error::{Result, WardenError};

/// Opaque pass/fail test collaborator.
pub trait TestRunner: Send + Sync {
    /// Run the test suite once.
    ///
    /// # Errors
    ///
    /// Returns an error only if the runner fails to start; a failing
    /// suite is `Ok(false)`.
    fn run(&self) -> Result<bool>;
}

/// Real test runner driven through a configured command line.
pub struct CommandTestRunner {
    command: Vec<String>,
    project_dir: PathBuf,
}

impl CommandTestRunner {
    /// Create a runner from a command line and working directory.
    #[must_use]
    pub fn new(command: Vec<String>, project_dir: impl AsRef<Path>) -> Self {
        Self {
            command,
            project_dir: project_dir.as_ref().to_path_buf(),
        }
    }
}

impl TestRunner for CommandTestRunner {
    fn run(&self) -> Result<bool> {
        let (program, args) = self.command.split_first().ok_or_else(|| {
            WardenError::TestRunner {
                message: "test command is empty".into(),
            }
        })?;

        debug!("running tests: {}", self.command.join(" "));
        let status = Command::new(program)
            .args(args)
            .current_dir(&self.project_dir)
            .status()
            .map_err(|e| WardenError::TestRunner {
                message: format!("failed to spawn {program}: {e}"),
            })?;

        Ok(status.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_passing_command() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandTestRunner::new(vec!["true".into()], dir.path());
        assert!(runner.run().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandTestRunner::new(vec!["false".into()], dir.path());
        assert!(!runner.run().unwrap());
    }

    #[test]
    fn test_missing_binary_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandTestRunner::new(
            vec!["definitely-not-a-real-binary-xyz".into()],
            dir.path(),
        );
        assert!(matches!(
            runner.run(),
            Err(WardenError::TestRunner { .. })
        ));
    }
}
