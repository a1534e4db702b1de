//! Warden - guarded iteration controller for untrusted coding agents.
//!
//! Warden supervises an adversarial-by-assumption agent across repeated
//! attempts at stories drawn from a shared backlog, guaranteeing that the
//! backlog and an append-only learnings log can only be mutated in
//! tightly constrained ways. Every attempt is an optimistic transaction:
//! the agent edits speculatively, two structural validators judge the
//! edits, tests run, and the working tree is either committed atomically
//! or rolled back to the checkpoint.
//!
//! # Architecture
//!
//! - [`ledger`] - the backlog document (stories, flags, notes)
//! - [`validate`] - append-only log validator and backlog diff validator
//! - [`vcs`] - snapshot/rollback manager over git
//! - [`agent`] / [`tester`] - opaque collaborator boundaries
//! - [`prompt`] - prompt assembly for agent invocations
//! - [`r#loop`] - the retry/rollback state machine and outer story loop
//! - [`config`] - run configuration threaded into the controller
//! - [`error`] - error taxonomy separating retries from trust breaches
//! - [`testing`] - mocks for deterministic controller tests
//!
//! # Example
//!
//! ```rust,ignore
//! use warden::config::RunConfig;
//! use warden::r#loop::Controller;
//! use warden::vcs::GitVcs;
//! use warden::agent::CommandAgent;
//! use warden::tester::CommandTestRunner;
//!
//! let config = RunConfig::load(project_dir)?;
//! let controller = Controller::new(
//!     config.clone(),
//!     project_dir,
//!     GitVcs::new(project_dir),
//!     CommandAgent::new(config.agent_command.clone(), project_dir),
//!     CommandTestRunner::new(config.test_command.clone(), project_dir),
//! );
//! let outcome = controller.run().await?;
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod ledger;
pub mod prompt;
pub mod r#loop;
pub mod tester;
pub mod testing;
pub mod validate;
pub mod vcs;

// Re-export commonly used types
pub use error::{Result, WardenError};

pub use agent::{signals_done, Agent, CommandAgent};
pub use config::RunConfig;
pub use ledger::{Ledger, Story};
pub use r#loop::{Controller, CycleOutcome, RunOutcome};
pub use tester::{CommandTestRunner, TestRunner};
pub use testing::{MockAgent, MockTestRunner, MockVcs};
pub use validate::{
    diff, validate_append_only, LogSnapshot, StoryChange, Violation,
};
pub use vcs::{GitVcs, Vcs};
