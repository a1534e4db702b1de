//! Run configuration for the warden loop.
//!
//! Everything the controller needs is threaded through one [`RunConfig`]
//! value built at startup - no ambient globals - so tests can substitute
//! fake collaborators and tiny retry budgets.
//!
//! Defaults match the conventional project layout (`backlog.json`,
//! `learnings.md` at the project root) and may be overridden by an
//! optional `warden.toml` in the project directory.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Result, WardenError};

/// Name of the optional per-project config file.
pub const CONFIG_FILE: &str = "warden.toml";

fn default_ledger_path() -> PathBuf {
    PathBuf::from("backlog.json")
}

fn default_log_path() -> PathBuf {
    PathBuf::from("learnings.md")
}

fn default_max_iterations() -> u32 {
    5
}

fn default_agent_command() -> Vec<String> {
    vec!["codex".into(), "exec".into()]
}

fn default_test_command() -> Vec<String> {
    vec!["cargo".into(), "test".into()]
}

fn default_done_sentinel() -> String {
    "DONE".into()
}

/// Process-wide fixed configuration: paths, retry budget, command lines.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Backlog document, relative to the project directory.
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,

    /// Learnings log, relative to the project directory.
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    /// Retry budget per story cycle.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Agent command line; the prompt is written to its stdin.
    #[serde(default = "default_agent_command")]
    pub agent_command: Vec<String>,

    /// Test command line; zero exit status means pass.
    #[serde(default = "default_test_command")]
    pub test_command: Vec<String>,

    /// Exact output line (after trimming) that signals agent completion.
    #[serde(default = "default_done_sentinel")]
    pub done_sentinel: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ledger_path: default_ledger_path(),
            log_path: default_log_path(),
            max_iterations: default_max_iterations(),
            agent_command: default_agent_command(),
            test_command: default_test_command(),
            done_sentinel: default_done_sentinel(),
        }
    }
}

impl RunConfig {
    /// Load configuration for `project_dir`.
    ///
    /// Reads `warden.toml` from the project directory if present;
    /// otherwise every field takes its default.
    ///
    /// # Errors
    ///
    /// Returns a config error if the file exists but is malformed, or if
    /// a loaded value fails [`Self::validate`].
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(CONFIG_FILE);
        let config = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            toml::from_str(&text)
                .map_err(|e| WardenError::config_with_path(e.to_string(), path))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the controller cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(WardenError::config("max_iterations must be at least 1"));
        }
        if self.agent_command.is_empty() {
            return Err(WardenError::config("agent_command must not be empty"));
        }
        if self.test_command.is_empty() {
            return Err(WardenError::config("test_command must not be empty"));
        }
        if self.done_sentinel.trim().is_empty() {
            return Err(WardenError::config("done_sentinel must not be blank"));
        }
        Ok(())
    }

    /// Absolute path of the backlog file.
    #[must_use]
    pub fn ledger_file(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.ledger_path)
    }

    /// Absolute path of the learnings log.
    #[must_use]
    pub fn log_file(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.log_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.ledger_path, PathBuf::from("backlog.json"));
        assert_eq!(config.log_path, PathBuf::from("learnings.md"));
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.done_sentinel, "DONE");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig::load(dir.path()).unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_load_partial_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
            max_iterations = 3
            agent_command = ["bash", "agent.sh"]
            "#,
        )
        .unwrap();

        let config = RunConfig::load(dir.path()).unwrap();
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.agent_command, vec!["bash", "agent.sh"]);
        // Untouched fields keep defaults
        assert_eq!(config.done_sentinel, "DONE");
        assert_eq!(config.ledger_path, PathBuf::from("backlog.json"));
    }

    #[test]
    fn test_load_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "max_iterations = ").unwrap();
        let err = RunConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, WardenError::Config { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let config = RunConfig {
            max_iterations: 0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_agent_command() {
        let config = RunConfig {
            agent_command: vec![],
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_paths_join_project_dir() {
        let config = RunConfig::default();
        let dir = Path::new("/work/project");
        assert_eq!(config.ledger_file(dir), dir.join("backlog.json"));
        assert_eq!(config.log_file(dir), dir.join("learnings.md"));
    }
}
