//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`FlowNavigatorError`] which covers every failure mode of the
//! command-construction layer. It uses `thiserror` for ergonomic error definitions
//! and includes constructor helpers for the variants that carry context.
//!
//! # Public API
//! - [`FlowNavigatorError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, FlowNavigatorError>`
//!
//! # Error Categories
//! - **Repository**: no current branch obtainable, git2 library errors
//! - **Configuration**: unknown branch types, ambiguous prefixes, bad overrides
//! - **External tool**: workflow CLI missing or returning an error
//! - **Settings and cache**: file system and serialization failures

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for flow-navigator
#[derive(Error, Debug)]
pub enum FlowNavigatorError {
    // Repository errors
    #[error("Not in a git repository")]
    NotARepository,

    #[error("Git repository error: {0}")]
    GitRepo(#[from] git2::Error),

    // Branch type configuration errors
    #[error("Unknown branch type: '{name}'")]
    UnknownBranchType { name: String },

    #[error("Ambiguous branch prefixes: '{first}' and '{second}' can match the same branch")]
    AmbiguousPrefix { first: String, second: String },

    #[error("Invalid configuration for branch type '{name}': {reason}")]
    InvalidBranchConfig { name: String, reason: String },

    #[error("Invalid {option} override for {kind} {operation}: {reason}")]
    InvalidOverride {
        kind: String,
        operation: String,
        option: String,
        reason: String,
    },

    // Command construction errors
    #[error("The '{action}' action requires a branch name")]
    MissingTarget { action: String },

    #[error("Current branch '{branch}' is not a workflow topic branch")]
    NotOnTopicBranch { branch: String },

    // External tool errors
    #[error("git-flow is not available: {remediation}")]
    ExternalToolUnavailable { remediation: String },

    #[error("{message}")]
    ExternalCommandFailed { message: String },

    // Settings errors
    #[error("Could not find configuration directory")]
    ConfigDirectoryNotFound,

    #[error("Failed to read settings file '{path}': {source}")]
    SettingsReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file '{path}': {source}")]
    SettingsParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    // Cache errors
    #[error("Failed to create cache directory '{path}': {source}")]
    CacheDirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write cache file '{path}': {source}")]
    CacheWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse cache file '{path}': {source}")]
    CacheParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to watch repository metadata: {0}")]
    Watch(#[from] notify::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using FlowNavigatorError
pub type Result<T> = std::result::Result<T, FlowNavigatorError>;

impl FlowNavigatorError {
    /// Create an unknown branch type error
    pub fn unknown_branch_type(name: impl Into<String>) -> Self {
        Self::UnknownBranchType { name: name.into() }
    }

    /// Create an ambiguous prefix error
    pub fn ambiguous_prefix(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::AmbiguousPrefix {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Create an invalid branch configuration error
    pub fn invalid_branch_config(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBranchConfig {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid override error
    pub fn invalid_override(
        kind: impl Into<String>,
        operation: impl Into<String>,
        option: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOverride {
            kind: kind.into(),
            operation: operation.into(),
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing target error
    pub fn missing_target(action: impl Into<String>) -> Self {
        Self::MissingTarget {
            action: action.into(),
        }
    }

    /// Create a not-on-topic-branch error
    pub fn not_on_topic_branch(branch: impl Into<String>) -> Self {
        Self::NotOnTopicBranch {
            branch: branch.into(),
        }
    }

    /// Create an external tool unavailable error
    pub fn external_tool_unavailable(remediation: impl Into<String>) -> Self {
        Self::ExternalToolUnavailable {
            remediation: remediation.into(),
        }
    }

    /// Create an external command failed error
    pub fn external_command_failed(message: impl Into<String>) -> Self {
        Self::ExternalCommandFailed {
            message: message.into(),
        }
    }

    /// Create a settings read failed error
    pub fn settings_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SettingsReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a settings parse failed error
    pub fn settings_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::SettingsParseFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache directory creation failed error
    pub fn cache_directory_creation_failed(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::CacheDirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache write failed error
    pub fn cache_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheWriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache parse failed error
    pub fn cache_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CacheParseFailed {
            path: path.into(),
            source,
        }
    }
}
