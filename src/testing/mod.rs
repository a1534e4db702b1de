//! Testing infrastructure: controllable doubles for the external
//! collaborators (git, agent, test runner).
//!
//! The mocks are deliberately richer than simple stubs: [`MockVcs`] can
//! track a real directory and make `rollback`/`commit` behave like the
//! genuine checkpoint discipline, so controller scenarios exercise the
//! same file reads the production loop performs.

pub mod mocks;

pub use mocks::{MockAgent, MockTestRunner, MockVcs};
