//! Append-only validation for the learnings log.
//!
//! The log is free-form text the agent may extend with factual notes, but
//! existing content is history: for any before/after pair, `after` must
//! begin with exactly the bytes of `before`. A SHA-256 fingerprint
//! short-circuits the common no-change case so the prefix comparison only
//! runs when the file actually moved.

use sha2::{Digest, Sha256};
use std::path::Path;

use super::Violation;
use crate::error::Result;

/// Point-in-time capture of the learnings log: existence plus content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSnapshot {
    /// Whether the file existed at capture time.
    pub exists: bool,
    /// Full content at capture time (empty if absent).
    pub content: String,
    /// SHA-256 of `content`, hex-encoded.
    pub digest: String,
}

impl LogSnapshot {
    /// Capture the log file at `path`.
    ///
    /// A missing file yields an empty snapshot with `exists = false`,
    /// which is a legal starting state (the log may be created from
    /// nothing).
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file exists but cannot be read.
    pub fn capture(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::absent());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_content(content))
    }

    /// Snapshot of a nonexistent log.
    #[must_use]
    pub fn absent() -> Self {
        Self {
            exists: false,
            content: String::new(),
            digest: hex::encode(Sha256::digest(b"")),
        }
    }

    /// Snapshot of an existing log with the given content.
    #[must_use]
    pub fn from_content(content: impl Into<String>) -> Self {
        let content = content.into();
        let digest = hex::encode(Sha256::digest(content.as_bytes()));
        Self {
            exists: true,
            content,
            digest,
        }
    }
}

/// Verify the log was only extended between two snapshots.
///
/// Rules, in order:
/// - existed before, absent after: [`Violation::LogDeleted`]
/// - fingerprints match: no change, accepted without comparison
/// - `after` does not start with the exact bytes of `before`:
///   [`Violation::LogRewritten`]
///
/// Creation from nothing and pure appends are the only paths through.
pub fn validate_append_only(
    before: &LogSnapshot,
    after: &LogSnapshot,
) -> std::result::Result<(), Violation> {
    if before.exists && !after.exists {
        return Err(Violation::LogDeleted);
    }
    if before.digest == after.digest {
        return Ok(());
    }
    if !after.content.starts_with(&before.content) {
        return Err(Violation::LogRewritten);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_append_accepted() {
        let before = LogSnapshot::from_content("Learning A\n");
        let after = LogSnapshot::from_content("Learning A\nLearning B\n");
        assert_eq!(validate_append_only(&before, &after), Ok(()));
    }

    #[test]
    fn test_rewrite_rejected() {
        let before = LogSnapshot::from_content("Learning A\n");
        let after = LogSnapshot::from_content("Learning B\n");
        assert_eq!(
            validate_append_only(&before, &after),
            Err(Violation::LogRewritten)
        );
    }

    #[test]
    fn test_truncation_rejected() {
        let before = LogSnapshot::from_content("Learning A\nLearning B\n");
        let after = LogSnapshot::from_content("Learning A\n");
        assert_eq!(
            validate_append_only(&before, &after),
            Err(Violation::LogRewritten)
        );
    }

    #[test]
    fn test_deletion_rejected_regardless_of_content() {
        let before = LogSnapshot::from_content("Learning A\n");
        let after = LogSnapshot::absent();
        assert_eq!(
            validate_append_only(&before, &after),
            Err(Violation::LogDeleted)
        );
    }

    #[test]
    fn test_no_change_accepted() {
        let before = LogSnapshot::from_content("Learning A\n");
        let after = LogSnapshot::from_content("Learning A\n");
        assert_eq!(validate_append_only(&before, &after), Ok(()));
    }

    #[test]
    fn test_created_from_nothing_accepted() {
        let before = LogSnapshot::absent();
        let after = LogSnapshot::from_content("First learning\n");
        assert_eq!(validate_append_only(&before, &after), Ok(()));
    }

    #[test]
    fn test_still_absent_accepted() {
        let before = LogSnapshot::absent();
        let after = LogSnapshot::absent();
        assert_eq!(validate_append_only(&before, &after), Ok(()));
    }

    #[test]
    fn test_capture_missing_file() {
        let snap = LogSnapshot::capture(Path::new("/nonexistent/learnings.md")).unwrap();
        assert!(!snap.exists);
        assert!(snap.content.is_empty());
    }

    #[test]
    fn test_capture_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learnings.md");
        std::fs::write(&path, "noted\n").unwrap();
        let snap = LogSnapshot::capture(&path).unwrap();
        assert!(snap.exists);
        assert_eq!(snap.content, "noted\n");
        assert_eq!(snap, LogSnapshot::from_content("noted\n"));
    }
}
