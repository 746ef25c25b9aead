//! Shorthands that act on whatever topic branch is checked out.

use crate::commands::{finish_action, open_session, FinishArgs};
use crate::commands::topic::{delete_choice, update_choice};
use crate::core::{error::Result, Action, ExplicitChoice, WorkspaceContext};

async fn run_on_current(
    context: WorkspaceContext,
    action: Action,
    target: Option<&str>,
    explicit: ExplicitChoice,
) -> Result<()> {
    let session = open_session(context)?;
    let updates = session.synchronizer().subscribe();
    let result = session.run_on_current(action, target, explicit).await;
    finish_action(&session, updates, result)
}

pub async fn execute_finish(context: WorkspaceContext, options: FinishArgs) -> Result<()> {
    run_on_current(context, Action::Finish, None, options.to_explicit()).await
}

pub async fn execute_delete(context: WorkspaceContext, force: bool) -> Result<()> {
    run_on_current(context, Action::Delete, None, delete_choice(force)).await
}

/// `update`, or `update --rebase` when `rebase` is set.
pub async fn execute_update(context: WorkspaceContext, rebase: bool) -> Result<()> {
    run_on_current(context, Action::Update, None, update_choice(rebase)).await
}

pub async fn execute_rename(context: WorkspaceContext, new_name: String) -> Result<()> {
    run_on_current(context, Action::Rename, Some(&new_name), ExplicitChoice::default()).await
}

pub async fn execute_publish(context: WorkspaceContext) -> Result<()> {
    run_on_current(context, Action::Publish, None, ExplicitChoice::default()).await
}

/// `finish --continue` / `finish --abort` for a paused finish.
pub async fn execute_resume(
    context: WorkspaceContext,
    kind: Option<String>,
    abort: bool,
) -> Result<()> {
    let session = open_session(context)?;
    let updates = session.synchronizer().subscribe();
    let result = session.resume_finish(kind.as_deref(), abort).await;
    finish_action(&session, updates, result)
}
