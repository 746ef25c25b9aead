//! Assembly of workflow tool invocations.
//!
//! [`CommandBuilder::build`] turns a kind, an [`Action`], an optional target and
//! resolved arguments into a [`Command`] of the form
//! `git flow <kind> <action> [target] [args...]`. Before a `start` or `finish`
//! is built, [`propagate_configuration`] writes the active remote and the
//! delete-remote preference into the tool's own configuration so the tool reads
//! current values when it runs.

use crate::core::error::{FlowNavigatorError, Result};
use crate::core::registry::BranchTypeConfig;
use crate::core::resolver::ResolvedArguments;
use crate::core::settings::Operation;
use crate::core::store::ConfigStore;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

pub const PROGRAM: &str = "git";
pub const SUBCOMMAND: &str = "flow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Start,
    Finish,
    Update,
    Checkout,
    Delete,
    Rename,
    List,
    Publish,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Finish => "finish",
            Action::Update => "update",
            Action::Checkout => "checkout",
            Action::Delete => "delete",
            Action::Rename => "rename",
            Action::List => "list",
            Action::Publish => "publish",
        }
    }

    /// Actions that cannot fall back to the checked-out branch.
    pub fn requires_target(self) -> bool {
        matches!(self, Action::Start | Action::Checkout | Action::Rename)
    }

    /// Whether the action can change the checked-out branch or the set of
    /// branches, and therefore needs a state refresh afterwards.
    pub fn changes_topology(self) -> bool {
        !matches!(self, Action::List | Action::Publish)
    }

    /// The override table this action reads, if any.
    pub fn operation(self) -> Option<Operation> {
        match self {
            Action::Start => Some(Operation::Start),
            Action::Finish => Some(Operation::Finish),
            Action::Update => Some(Operation::Update),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built invocation, run without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub program: String,
    pub args: Vec<String>,
}

impl Command {
    /// Human-readable command line, quoted for display and error messages.
    pub fn to_command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|arg| shell_escape::unix::escape(Cow::Borrowed(arg)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_command_line())
    }
}

pub struct CommandBuilder;

impl CommandBuilder {
    /// Assemble `git flow <kind> <action> [target] [resolved...]`.
    ///
    /// `list` never carries a target. A missing target for an action that
    /// needs one is a caller bug reported as `MissingTarget`.
    pub fn build(
        kind: &str,
        action: Action,
        target: Option<&str>,
        resolved: ResolvedArguments,
    ) -> Result<Command> {
        let target = target.map(str::trim).filter(|t| !t.is_empty());
        if action.requires_target() && target.is_none() {
            return Err(FlowNavigatorError::missing_target(action.as_str()));
        }

        let mut args = vec![
            SUBCOMMAND.to_string(),
            kind.to_string(),
            action.as_str().to_string(),
        ];
        if action != Action::List {
            args.extend(target.map(str::to_string));
        }
        args.extend(resolved.into_vec());

        Ok(Command {
            program: PROGRAM.to_string(),
            args,
        })
    }

    /// `git flow <kind> finish --continue` or `--abort` for a paused finish.
    pub fn resume_finish(kind: &str, abort: bool) -> Command {
        let flag = if abort { "--abort" } else { "--continue" };
        Command {
            program: PROGRAM.to_string(),
            args: vec![
                SUBCOMMAND.to_string(),
                kind.to_string(),
                Action::Finish.as_str().to_string(),
                flag.to_string(),
            ],
        }
    }
}

/// Write the active remote (start and finish) and the delete-remote-on-finish
/// preference (finish) into the workflow configuration. Both writes are
/// idempotent and happen before the command is built.
pub fn propagate_configuration(
    store: &dyn ConfigStore,
    config: &BranchTypeConfig,
    action: Action,
    remote: &str,
    delete_remote_on_finish: Option<bool>,
) -> Result<()> {
    if !matches!(action, Action::Start | Action::Finish) {
        return Ok(());
    }

    store.set("gitflow.origin", remote)?;
    if action == Action::Finish {
        let delete_remote = delete_remote_on_finish.unwrap_or(config.delete_remote_by_default);
        store.set(
            &format!("gitflow.{}.finish.deleteremote", config.name),
            if delete_remote { "true" } else { "false" },
        )?;
    }

    log::debug!("Propagated workflow configuration for {} {}", config.name, action);
    Ok(())
}
