//! Structural diff of the backlog before and after an agent invocation.
//!
//! The mutation contract: at most one story may change, and only through
//! its `passes` flag (absent/false -> true) and/or its `notes` (added or
//! rewritten, never removed). Everything else in the document is frozen.
//!
//! The three-way flag state {absent, false, true} and the two-way notes
//! state {absent, present} are matched explicitly rather than collapsed
//! through defaults, so "never set" and "explicitly false" stay
//! distinguishable in the transition tables below.

use super::Violation;
use crate::ledger::{Ledger, Story};

/// Outcome of the `passes` transition table for one story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassesTransition {
    /// absent/false -> absent/false, or true -> true.
    NoOp,
    /// absent/false -> true: the one legal state change.
    Completed,
    /// true -> false or true -> absent: history rewrite.
    Reverted,
}

impl PassesTransition {
    /// Classify a before/after flag pair.
    #[must_use]
    pub fn classify(before: Option<bool>, after: Option<bool>) -> Self {
        match (before, after) {
            (None | Some(false), None | Some(false)) => Self::NoOp,
            (None | Some(false), Some(true)) => Self::Completed,
            (Some(true), Some(true)) => Self::NoOp,
            (Some(true), None | Some(false)) => Self::Reverted,
        }
    }
}

/// Outcome of the `notes` transition table for one story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotesTransition {
    /// absent -> absent, or identical present values.
    NoOp,
    /// absent -> present, or present -> different present value.
    Changed,
    /// present -> absent: notes must never be removed.
    Removed,
}

impl NotesTransition {
    /// Classify a before/after notes pair.
    #[must_use]
    pub fn classify(before: Option<&str>, after: Option<&str>) -> Self {
        match (before, after) {
            (None, None) => Self::NoOp,
            (None, Some(_)) => Self::Changed,
            (Some(a), Some(b)) if a == b => Self::NoOp,
            (Some(_), Some(_)) => Self::Changed,
            (Some(_), None) => Self::Removed,
        }
    }
}

/// The single legal change a diff may report.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryChange {
    /// Post-invocation image of the changed story.
    pub story: Story,
    /// Whether the completion flag flipped to true.
    pub completed: bool,
    /// Whether the notes were added or rewritten.
    pub notes_changed: bool,
}

/// Diff two backlog documents and return the single changed story, if any.
///
/// Checks run in contract order:
/// 1. `branchName` must be identical.
/// 2. The `id` sequence must be identical (length and order).
/// 3. Per story: immutable fields deep-equal.
/// 4. `passes` transitions legal per [`PassesTransition`].
/// 5. `notes` transitions legal per [`NotesTransition`].
/// 6. At most one story changed, and its pre-image flag was not true.
///
/// # Errors
///
/// Any breach returns the corresponding [`Violation`]; all are fatal to
/// the run.
pub fn diff(before: &Ledger, after: &Ledger) -> Result<Option<StoryChange>, Violation> {
    if before.branch_name != after.branch_name {
        return Err(Violation::BranchChanged {
            before: before.branch_name.clone(),
            after: after.branch_name.clone(),
        });
    }

    let before_ids: Vec<&str> = before.user_stories.iter().map(|s| s.id.as_str()).collect();
    let after_ids: Vec<&str> = after.user_stories.iter().map(|s| s.id.as_str()).collect();
    if before_ids != after_ids {
        return Err(Violation::StorySequenceChanged);
    }

    let mut change: Option<StoryChange> = None;

    for (old, new) in before.user_stories.iter().zip(&after.user_stories) {
        if let Some(field) = tampered_field(old, new) {
            return Err(Violation::StoryTampered {
                id: old.id.clone(),
                field,
            });
        }

        let passes = PassesTransition::classify(old.passes, new.passes);
        if passes == PassesTransition::Reverted {
            return Err(Violation::PassesReverted { id: old.id.clone() });
        }

        let notes = NotesTransition::classify(old.notes.as_deref(), new.notes.as_deref());
        if notes == NotesTransition::Removed {
            return Err(Violation::NotesRemoved { id: old.id.clone() });
        }

        let completed = passes == PassesTransition::Completed;
        let notes_changed = notes == NotesTransition::Changed;
        if !completed && !notes_changed {
            continue;
        }

        if let Some(prior) = &change {
            return Err(Violation::MultipleStoriesChanged {
                first: prior.story.id.clone(),
                second: new.id.clone(),
            });
        }
        if old.passes == Some(true) {
            // Notes-only edit to an already-complete story.
            return Err(Violation::StoryNotPending { id: old.id.clone() });
        }
        change = Some(StoryChange {
            story: new.clone(),
            completed,
            notes_changed,
        });
    }

    Ok(change)
}

/// Name the first immutable field that differs, if any.
fn tampered_field(old: &Story, new: &Story) -> Option<&'static str> {
    if old.title != new.title {
        Some("title")
    } else if old.description != new.description {
        Some("description")
    } else if old.priority != new.priority {
        Some("priority")
    } else if old.acceptance_criteria != new.acceptance_criteria {
        Some("acceptanceCriteria")
    } else {
        None
    }
}
