//! Core functionality for flow-navigator.
//!
//! This module provides the branch-type registry, branch classification,
//! layered argument resolution, command assembly and the state synchronizer.

pub mod classifier;
pub mod command;
pub mod debounce;
pub mod dirs;
pub mod error;
pub mod executor;
pub mod git;
pub mod output;
pub mod prompt;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod state;
pub mod store;
pub mod sync;
pub mod workflow;

// === Error handling ===
// Core error types and result type used throughout the application
pub use error::{FlowNavigatorError, Result};

// === Branch types ===
// Data-driven registry of base and topic kinds, loaded from git config
pub use registry::{BranchRole, BranchTypeConfig, BranchTypeRegistry, MergeStrategy};

// === Classification ===
pub use classifier::{classify, classify_current, BranchKind, BranchState};

// === Settings and resolution ===
// User settings, per-operation overrides and the three-layer resolver
pub use resolver::{resolve_options, Layer, ResolvedArguments, ResolvedOptions, SettingsResolver};
pub use settings::{
    ExplicitChoice, FastForwardMode, Operation, OperationOverride, RetentionMode, Setting,
    Settings,
};

// === Commands ===
pub use command::{propagate_configuration, Action, Command, CommandBuilder};
pub use executor::{extract_error_message, CommandExecutor, CommandOutput, ProcessExecutor};

// === Repository access ===
// git2-backed branch reader and configuration store
pub use git::{GitBranchReader, GitConfigStore, GitRepo};
pub use store::{ConfigStore, MemoryConfigStore};

// === State synchronization ===
// Snapshot publishing, debounced refresh and the on-disk snapshot cache
pub use debounce::{RefreshDebouncer, RefreshTrigger};
pub use state::StateCache;
pub use sync::{BranchReader, StateSynchronizer, UiStateSnapshot};

// === Workflow ===
pub use prompt::{NonInteractivePrompter, Prompter, TerminalPrompter};
pub use workflow::{ActionOutcome, FlowSession, WorkspaceContext};

// === Output formatting ===
// Unified output formatting for consistent CLI presentation
pub use output::{
    print_command, print_error, print_info, print_section_header, print_snapshot, print_success,
};
