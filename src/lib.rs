//! Flow Navigator - turns branch-workflow actions into `git flow` invocations and
//! keeps a live picture of the repository's branch state.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module, which provides:
//! - The branch-type registry and branch classification
//! - Layered resolution of settings into command-line flags
//! - Command assembly and execution
//! - The state synchronizer and its published snapshot
//! - Error handling and result types

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    // Commands
    Action,
    ActionOutcome,
    // Classification
    BranchKind,
    BranchReader,
    BranchState,
    BranchTypeConfig,
    // Branch types
    BranchTypeRegistry,
    Command,
    CommandBuilder,
    CommandExecutor,
    CommandOutput,
    ConfigStore,
    ExplicitChoice,
    // Workflow
    FlowSession,
    // Error handling
    FlowNavigatorError,
    MemoryConfigStore,
    MergeStrategy,
    Operation,
    OperationOverride,
    ResolvedArguments,
    Result,
    Setting,
    Settings,
    // Resolution
    SettingsResolver,
    // State synchronization
    StateSynchronizer,
    UiStateSnapshot,
    WorkspaceContext,
};
