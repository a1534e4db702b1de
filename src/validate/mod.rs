//! Structural validators guarding the backlog and learnings log.
//!
//! After every agent invocation two checks run, in order, before the
//! agent's output is interpreted at all:
//!
//! 1. [`log::validate_append_only`] - the learnings log may only have
//!    grown; any edit, truncation, or deletion of existing content is a
//!    breach.
//! 2. [`ledger::diff`] - the backlog may differ in at most one story's
//!    completion flag and/or notes, under the transition rules encoded in
//!    [`ledger::PassesTransition`] and [`ledger::NotesTransition`].
//!
//! A [`Violation`] from either validator is a trust-boundary breach, not
//! an ordinary failed attempt: the controller rolls back and terminates
//! the run without consuming retry budget.

pub mod ledger;
pub mod log;

pub use ledger::{diff, StoryChange};
pub use log::{validate_append_only, LogSnapshot};

use thiserror::Error;

/// A detected breach of the mutation contract on the backlog or log.
///
/// Every variant is fatal and terminates the run after rollback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Learnings log existed before the invocation and is gone after.
    #[error("learnings log was deleted")]
    LogDeleted,

    /// Learnings log content no longer starts with its prior content.
    #[error("learnings log was edited non-append-only")]
    LogRewritten,

    /// Backlog could not be re-read or re-parsed after the invocation.
    #[error("backlog is unreadable after agent edit: {reason}")]
    LedgerUnreadable { reason: String },

    /// `branchName` (or other top-level metadata) changed.
    #[error("backlog branch metadata changed: {before:?} -> {after:?}")]
    BranchChanged { before: String, after: String },

    /// Stories were added, removed, or reordered.
    #[error("story sequence changed (no insertion, deletion, or reordering allowed)")]
    StorySequenceChanged,

    /// An immutable story field changed.
    #[error("story {id} definition was tampered with (field: {field})")]
    StoryTampered { id: String, field: &'static str },

    /// A completion flag went true -> false or true -> absent.
    #[error("story {id} completion flag was reverted")]
    PassesReverted { id: String },

    /// Notes were removed after being present.
    #[error("story {id} notes were removed")]
    NotesRemoved { id: String },

    /// More than one story changed in a single invocation.
    #[error("multiple stories changed in one invocation ({first} and {second})")]
    MultipleStoriesChanged { first: String, second: String },

    /// The changed story was already complete before the invocation.
    #[error("changed story {id} was not pending beforehand")]
    StoryNotPending { id: String },
}
