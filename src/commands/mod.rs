pub mod current;
pub mod state;
pub mod topic;
pub mod types;

pub use current::*;
pub use state::*;
pub use topic::*;
pub use types::*;

use crate::core::{
    error::Result,
    git::GitRepo,
    output::{print_command, print_info, print_success, print_tool_output},
    state::save_snapshot,
    ActionOutcome, FlowSession, UiStateSnapshot, WorkspaceContext,
};
use std::path::PathBuf;
use tokio::sync::watch;

pub(crate) fn open_session(context: WorkspaceContext) -> Result<FlowSession> {
    FlowSession::open(context)
}

/// The working tree root, so every subdirectory shares one cache entry.
/// `None` outside a repository.
pub(crate) fn cache_key(context: &WorkspaceContext) -> Option<PathBuf> {
    GitRepo::open(&context.repo_path)
        .and_then(|repo| repo.get_workdir())
        .ok()
}

pub(crate) fn cache_snapshot(context: &WorkspaceContext, snapshot: &UiStateSnapshot) {
    let Some(key) = cache_key(context) else {
        return;
    };
    if let Err(e) = save_snapshot(&key, snapshot) {
        log::warn!("Caching branch state failed: {e}");
    }
}

/// Cache the state if the action refreshed it, then report.
pub(crate) fn finish_action(
    session: &FlowSession,
    mut updates: watch::Receiver<UiStateSnapshot>,
    result: Result<ActionOutcome>,
) -> Result<()> {
    if updates.has_changed().unwrap_or(false) {
        let snapshot = updates.borrow_and_update().clone();
        cache_snapshot(session.context(), &snapshot);
    }
    report_outcome(result?);
    Ok(())
}

pub(crate) fn report_outcome(outcome: ActionOutcome) {
    match outcome {
        ActionOutcome::Completed { command, output } => {
            print_command(&command.to_command_line());
            print_tool_output(&output.stdout);
            print_tool_output(&output.stderr);
            print_success("Done");
        }
        ActionOutcome::NoBranchesOfKind { kind } => {
            print_info(&format!("No {kind} branches found."));
        }
        ActionOutcome::NoSuchBranch { branch } => {
            print_info(&format!("No local branch named '{branch}'."));
        }
        ActionOutcome::Dismissed => {
            print_info("Nothing selected.");
        }
    }
}
