//! Custom error types for Warden.
//!
//! This module provides structured error types that separate ordinary
//! failures from trust-boundary breaches, so callers can decide whether
//! to retry, halt, or terminate the process.

use std::path::PathBuf;
use thiserror::Error;

use crate::validate::Violation;

/// Main error type for Warden operations
#[derive(Error, Debug)]
pub enum WardenError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load or parse configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Backlog file missing or unreadable at startup
    #[error("Missing required file: {path}")]
    MissingFile { path: PathBuf },

    // =========================================================================
    // Preflight Errors
    // =========================================================================
    /// Working tree had uncommitted changes at startup
    #[error("Working tree is dirty - commit or stash changes before running warden")]
    DirtyWorkspace,

    /// Missing required tool on PATH
    #[error("Missing required tool: {tool}")]
    MissingTool { tool: String },

    // =========================================================================
    // Trust Boundary Errors
    // =========================================================================
    /// The agent breached the backlog or learnings mutation contract.
    ///
    /// Always fatal: the run terminates after rollback, no retry.
    #[error("Structural violation: {0}")]
    Violation(#[from] Violation),

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    /// Agent subprocess failed to spawn or crashed
    #[error("Agent process failed: {message}")]
    AgentProcess { message: String },

    /// Test runner failed to spawn (distinct from tests failing)
    #[error("Test runner failed to start: {message}")]
    TestRunner { message: String },

    /// Git operation failed
    #[error("Git operation failed: {operation} - {message}")]
    Git { operation: String, message: String },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WardenError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    /// Create a git error
    pub fn git(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Git {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an agent process error
    pub fn agent(message: impl Into<String>) -> Self {
        Self::AgentProcess {
            message: message.into(),
        }
    }

    /// Check if this error is a structural violation (trust boundary breach)
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::Violation(_))
    }

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Violation(_) => 2,
            Self::DirtyWorkspace | Self::MissingTool { .. } => 6,
            Self::Config { .. } | Self::MissingFile { .. } => 7,
            _ => 1,
        }
    }
}

/// Type alias for Warden results
pub type Result<T> = std::result::Result<T, WardenError>;
