//! The guarded iteration loop.
//!
//! One cycle supervises the agent through a bounded number of attempts at
//! a single story:
//!
//! ```text
//! Attempting(n) --agent--> validate log --> validate backlog --> sentinel?
//!      ^                        |                  |                |
//!      |                     Aborted            Aborted         rollback
//!      |                                                           |
//!      +--- rollback <-- tests fail / no eligible change <---------+
//!                              |
//!                        commit -> Succeeded (or CommitFailed)
//! ```
//!
//! Validator verdicts are trust decisions, not attempt outcomes: a
//! violation aborts the whole run without consuming retry budget. The
//! outer loop keeps running cycles while stories remain pending and the
//! last cycle succeeded.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::agent::{signals_done, Agent};
use crate::config::RunConfig;
use crate::error::{Result, WardenError};
use crate::ledger::{Ledger, Story};
use crate::prompt::build_prompt;
use crate::tester::TestRunner;
use crate::validate::{diff, validate_append_only, LogSnapshot, Violation};
use crate::vcs::Vcs;

/// Terminal state of one controller cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    /// A story was completed, tested, and committed.
    Succeeded(Story),
    /// The retry budget ran out without a valid completion.
    Exhausted,
    /// A structural violation was detected; the run must terminate.
    Aborted(Violation),
    /// The commit was refused after an otherwise valid attempt.
    CommitFailed(Story),
}

/// Terminal state of a full run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every story's completion flag is true.
    AllComplete,
    /// A cycle exhausted its retry budget; the run halted.
    Exhausted,
    /// A structural violation terminated the run.
    Aborted(Violation),
    /// A commit was refused after a valid attempt; the run halted.
    CommitFailed { story_id: String },
}

/// The retry/rollback state machine plus outer story loop.
///
/// All collaborators are injected so the controller can run against
/// deterministic fakes; see [`crate::testing`].
pub struct Controller<V, A, T> {
    config: RunConfig,
    project_dir: PathBuf,
    vcs: V,
    agent: A,
    tests: T,
}

impl<V: Vcs, A: Agent, T: TestRunner> Controller<V, A, T> {
    /// Build a controller over a project directory and its collaborators.
    pub fn new(
        config: RunConfig,
        project_dir: impl AsRef<Path>,
        vcs: V,
        agent: A,
        tests: T,
    ) -> Self {
        Self {
            config,
            project_dir: project_dir.as_ref().to_path_buf(),
            vcs,
            agent,
            tests,
        }
    }

    /// Drive the full run: preflight, then one cycle per pending story
    /// while cycles keep succeeding.
    ///
    /// # Errors
    ///
    /// Returns [`WardenError::DirtyWorkspace`] if the tree is not clean
    /// at startup, and propagates collaborator failures (spawn errors,
    /// unreadable startup state). Violations and exhaustion are reported
    /// through [`RunOutcome`], not `Err`.
    pub async fn run(&self) -> Result<RunOutcome> {
        if self.vcs.is_dirty()? {
            return Err(WardenError::DirtyWorkspace);
        }

        let ledger = Ledger::load(&self.config.ledger_file(&self.project_dir))?;
        self.vcs.checkout(&ledger.branch_name)?;
        info!("on branch {}", ledger.branch_name);

        loop {
            let ledger = Ledger::load(&self.config.ledger_file(&self.project_dir))?;
            let pending = ledger.pending_stories();
            if pending.is_empty() {
                info!("all {} stories complete", ledger.user_stories.len());
                return Ok(RunOutcome::AllComplete);
            }
            info!("{} stories pending", pending.len());

            match self.run_cycle().await? {
                CycleOutcome::Succeeded(story) => {
                    info!("story {} committed", story.id);
                }
                CycleOutcome::Exhausted => {
                    warn!(
                        "retry budget ({}) exhausted; halting",
                        self.config.max_iterations
                    );
                    return Ok(RunOutcome::Exhausted);
                }
                CycleOutcome::Aborted(violation) => {
                    warn!("structural violation: {violation}");
                    return Ok(RunOutcome::Aborted(violation));
                }
                CycleOutcome::CommitFailed(story) => {
                    warn!("commit refused for story {}; halting", story.id);
                    return Ok(RunOutcome::CommitFailed { story_id: story.id });
                }
            }
        }
    }

    /// Run one cycle: up to `max_iterations` attempts at a single story.
    async fn run_cycle(&self) -> Result<CycleOutcome> {
        let ledger_path = self.config.ledger_file(&self.project_dir);
        let log_path = self.config.log_file(&self.project_dir);

        for attempt in 1..=self.config.max_iterations {
            info!("attempt {attempt}/{}", self.config.max_iterations);

            // Before-images: the baseline every validator diffs against.
            let ledger_text = std::fs::read_to_string(&ledger_path)?;
            let before = Ledger::parse(&ledger_text)?;
            let log_before = LogSnapshot::capture(&log_path)?;

            let prompt = build_prompt(&before, &ledger_text, &log_before.content, &self.config);
            let output = self.agent.run(&prompt).await?;

            // Both validators run before the agent's output is interpreted.
            let log_after = LogSnapshot::capture(&log_path)?;
            if let Err(violation) = validate_append_only(&log_before, &log_after) {
                self.vcs.rollback()?;
                return Ok(CycleOutcome::Aborted(violation));
            }

            let after = match read_ledger(&ledger_path) {
                Ok(ledger) => ledger,
                Err(reason) => {
                    self.vcs.rollback()?;
                    return Ok(CycleOutcome::Aborted(Violation::LedgerUnreadable { reason }));
                }
            };

            let change = match diff(&before, &after) {
                Ok(change) => change,
                Err(violation) => {
                    self.vcs.rollback()?;
                    return Ok(CycleOutcome::Aborted(violation));
                }
            };

            if !signals_done(&output, &self.config.done_sentinel) {
                info!("no completion sentinel; rolling back");
                self.vcs.rollback()?;
                continue;
            }

            if !self.tests.run()? {
                info!("tests failed; rolling back");
                self.vcs.rollback()?;
                continue;
            }

            match change {
                Some(change) if change.story.passes == Some(true) => {
                    let label = change.story.commit_label();
                    self.vcs.stage_all()?;
                    if self.vcs.commit(&label)? {
                        return Ok(CycleOutcome::Succeeded(change.story));
                    }
                    // A refused commit after a fully valid attempt is a
                    // run failure, not another retry.
                    self.vcs.rollback()?;
                    return Ok(CycleOutcome::CommitFailed(change.story));
                }
                _ => {
                    info!("no eligible story marked complete; rolling back");
                    self.vcs.rollback()?;
                    continue;
                }
            }
        }

        Ok(CycleOutcome::Exhausted)
    }
}

/// Re-read the backlog after an agent pass. Any failure here means the
/// agent corrupted or removed the document.
fn read_ledger(path: &Path) -> std::result::Result<Ledger, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    Ledger::parse(&text).map_err(|e| e.to_string())
}
