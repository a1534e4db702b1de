//! The story backlog: the structured document driving the run.
//!
//! The backlog is a single JSON document owned by the repository. The agent
//! is allowed to rewrite it, but only within the narrow mutation contract
//! enforced by [`crate::validate::ledger`]: one story's completion flag
//! and/or notes per invocation, nothing else.
//!
//! Field names on disk are camelCase (`branchName`, `userStories`,
//! `acceptanceCriteria`) to match the external document format. Unknown
//! fields are rejected at parse time, so an agent inventing new top-level
//! keys surfaces as a parse failure rather than slipping through the diff.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, WardenError};

/// One unit of work with immutable definition fields and a mutable
/// completion flag/notes pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Story {
    /// Stable identity key. Immutable.
    pub id: String,
    /// Short human-readable name. Immutable.
    pub title: String,
    /// What the story requires. Immutable.
    pub description: String,
    /// Numeric sort key; lower runs first. Immutable.
    pub priority: i64,
    /// Ordered acceptance criteria. Immutable.
    pub acceptance_criteria: Vec<String>,
    /// Completion flag. Absent means not done. Monotonic:
    /// absent/false may become true, never the reverse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passes: Option<bool>,
    /// Free-text notes. May be added or rewritten, never removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Story {
    /// Whether this story still needs work (`passes` not exactly `true`).
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.passes != Some(true)
    }

    /// Commit label for a completed story, e.g. `"US-001: Add login"`.
    #[must_use]
    pub fn commit_label(&self) -> String {
        format!("{}: {}", self.id, self.title)
    }
}

/// The backlog document: branch metadata plus the ordered story list.
///
/// Order and length are invariant for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Ledger {
    /// Branch the run commits to. Immutable for the lifetime of a run.
    pub branch_name: String,
    /// Ordered story list.
    pub user_stories: Vec<Story>,
}

impl Ledger {
    /// Parse a backlog document from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the document is malformed or carries
    /// unknown fields.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load and parse the backlog file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`WardenError::MissingFile`] if the file does not exist,
    /// otherwise IO/JSON errors.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WardenError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Stories whose completion flag is not exactly `true`.
    pub fn pending_stories(&self) -> Vec<&Story> {
        self.user_stories.iter().filter(|s| s.is_pending()).collect()
    }

    /// Look up a story by its identity key.
    pub fn story(&self, id: &str) -> Option<&Story> {
        self.user_stories.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "branchName": "feature/auth",
            "userStories": [
                {
                    "id": "US-001",
                    "title": "Add login",
                    "description": "Users can log in",
                    "priority": 1,
                    "acceptanceCriteria": ["login form exists", "session persists"]
                },
                {
                    "id": "US-002",
                    "title": "Add logout",
                    "description": "Users can log out",
                    "priority": 2,
                    "acceptanceCriteria": ["logout clears session"],
                    "passes": true,
                    "notes": "done early"
                }
            ]
        }"#
    }

    #[test]
    fn test_parse_camel_case_document() {
        let ledger = Ledger::parse(sample_json()).unwrap();
        assert_eq!(ledger.branch_name, "feature/auth");
        assert_eq!(ledger.user_stories.len(), 2);
        assert_eq!(ledger.user_stories[0].id, "US-001");
        assert_eq!(ledger.user_stories[0].acceptance_criteria.len(), 2);
        assert_eq!(ledger.user_stories[0].passes, None);
        assert_eq!(ledger.user_stories[1].passes, Some(true));
        assert_eq!(ledger.user_stories[1].notes.as_deref(), Some("done early"));
    }

    #[test]
    fn test_pending_stories_excludes_completed() {
        let ledger = Ledger::parse(sample_json()).unwrap();
        let pending = ledger.pending_stories();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "US-001");
    }

    #[test]
    fn test_absent_and_false_both_pending() {
        let mut ledger = Ledger::parse(sample_json()).unwrap();
        ledger.user_stories[0].passes = Some(false);
        assert!(ledger.user_stories[0].is_pending());
        ledger.user_stories[0].passes = None;
        assert!(ledger.user_stories[0].is_pending());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let doc = r#"{"branchName": "b", "userStories": [], "extra": 1}"#;
        assert!(Ledger::parse(doc).is_err());
    }

    #[test]
    fn test_non_boolean_passes_rejected() {
        let doc = r#"{
            "branchName": "b",
            "userStories": [{
                "id": "US-001", "title": "t", "description": "d",
                "priority": 1, "acceptanceCriteria": [], "passes": "yes"
            }]
        }"#;
        assert!(Ledger::parse(doc).is_err());
    }

    #[test]
    fn test_optional_fields_skipped_on_serialize() {
        let ledger = Ledger {
            branch_name: "b".into(),
            user_stories: vec![Story {
                id: "US-001".into(),
                title: "t".into(),
                description: "d".into(),
                priority: 1,
                acceptance_criteria: vec![],
                passes: None,
                notes: None,
            }],
        };
        let json = serde_json::to_string(&ledger).unwrap();
        assert!(!json.contains("passes"));
        assert!(!json.contains("notes"));
        assert!(json.contains("branchName"));
    }

    #[test]
    fn test_commit_label() {
        let ledger = Ledger::parse(sample_json()).unwrap();
        assert_eq!(ledger.user_stories[0].commit_label(), "US-001: Add login");
    }

    #[test]
    fn test_missing_file() {
        let err = Ledger::load(Path::new("/nonexistent/backlog.json")).unwrap_err();
        assert!(matches!(err, WardenError::MissingFile { .. }));
    }
}
