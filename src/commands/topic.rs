//! `flow-navigator <kind> <action>`: one handler for every topic kind.
//!
//! The kind is whatever the first free-standing word names; it is checked
//! against the registry loaded from the repository, so custom kinds defined in
//! git config work without any code for them.

use crate::commands::{finish_action, open_session};
use crate::core::{
    error::Result, Action, ExplicitChoice, FastForwardMode, MergeStrategy, OperationOverride,
    RetentionMode, Setting, WorkspaceContext,
};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct KindCommand {
    #[command(subcommand)]
    action: TopicAction,
}

#[derive(Subcommand, Debug)]
enum TopicAction {
    /// Start a new branch of this kind
    Start {
        name: String,
        /// Start point instead of the configured one
        base: Option<String>,
        /// Fetch from the remote before starting
        #[arg(long)]
        fetch: bool,
    },
    /// Merge a branch of this kind back into its parent
    Finish {
        name: Option<String>,
        #[command(flatten)]
        options: FinishArgs,
    },
    /// Bring a branch of this kind up to date with its parent
    Update {
        name: Option<String>,
        /// Rebase instead of merging
        #[arg(long)]
        rebase: bool,
    },
    /// Switch to a branch of this kind, choosing interactively without a name
    Checkout { name: Option<String> },
    /// Delete a branch of this kind
    Delete {
        name: Option<String>,
        #[arg(short, long)]
        force: bool,
    },
    /// Rename the checked-out branch of this kind
    Rename { new_name: String },
    /// List branches of this kind
    List,
    /// Push a branch of this kind to the remote
    Publish { name: Option<String> },
}

/// Options accepted by `finish`, both per kind and as a shorthand.
#[derive(Args, Debug, Clone, Default)]
pub struct FinishArgs {
    /// Tag the finished branch
    #[arg(long, conflicts_with = "notag")]
    pub tag: bool,
    /// Do not tag the finished branch
    #[arg(long)]
    pub notag: bool,
    /// Sign the tag
    #[arg(long)]
    pub sign: bool,
    /// Tag message
    #[arg(short = 'm', long)]
    pub message: Option<String>,
    /// Read the tag message from a file
    #[arg(long)]
    pub messagefile: Option<String>,
    /// merge, rebase or squash
    #[arg(long)]
    pub strategy: Option<MergeStrategy>,
    /// delete, keep, keep-local or keep-remote
    #[arg(long)]
    pub retention: Option<RetentionMode>,
    #[arg(long)]
    pub force_delete: bool,
    #[arg(long, conflicts_with = "ff")]
    pub no_ff: bool,
    #[arg(long)]
    pub ff: bool,
    #[arg(long, conflicts_with = "no_preserve_merges")]
    pub preserve_merges: bool,
    #[arg(long)]
    pub no_preserve_merges: bool,
}

/// `Value(true)` when the flag was given, otherwise defer to lower layers.
fn when(flag: bool) -> Setting<bool> {
    if flag {
        Setting::Value(true)
    } else {
        Setting::UseGitConfig
    }
}

fn either<T>(yes: bool, no: bool, yes_value: T, no_value: T) -> Setting<T> {
    match (yes, no) {
        (true, _) => Setting::Value(yes_value),
        (false, true) => Setting::Value(no_value),
        (false, false) => Setting::UseGitConfig,
    }
}

impl FinishArgs {
    pub fn to_explicit(&self) -> ExplicitChoice {
        ExplicitChoice {
            overrides: OperationOverride {
                merge: self.strategy.into(),
                tag: either(self.tag, self.notag, true, false),
                sign_tag: when(self.sign),
                tag_message_file: self.messagefile.clone().into(),
                retention: self.retention.into(),
                force_delete: when(self.force_delete),
                fast_forward: either(self.ff, self.no_ff, FastForwardMode::Ff, FastForwardMode::NoFf),
                preserve_merges: either(self.preserve_merges, self.no_preserve_merges, true, false),
                ..OperationOverride::default()
            },
            tag_message: self.message.clone(),
            base_ref: None,
        }
    }
}

pub fn update_choice(rebase: bool) -> ExplicitChoice {
    ExplicitChoice {
        overrides: OperationOverride {
            merge: if rebase {
                Setting::Value(MergeStrategy::Rebase)
            } else {
                Setting::UseGitConfig
            },
            ..OperationOverride::default()
        },
        ..ExplicitChoice::default()
    }
}

pub fn delete_choice(force: bool) -> ExplicitChoice {
    ExplicitChoice {
        overrides: OperationOverride {
            force_delete: when(force),
            ..OperationOverride::default()
        },
        ..ExplicitChoice::default()
    }
}

/// Parse `<kind> <action> ...` and run it.
pub async fn execute_topic(context: WorkspaceContext, args: Vec<String>) -> Result<()> {
    let Some((kind, rest)) = args.split_first() else {
        return Ok(());
    };
    let parsed = match KindCommand::try_parse_from(rest) {
        Ok(parsed) => parsed,
        Err(e) => e.exit(),
    };

    let (action, target, explicit) = match parsed.action {
        TopicAction::Start { name, base, fetch } => (
            Action::Start,
            Some(name),
            ExplicitChoice {
                overrides: OperationOverride {
                    fetch: when(fetch),
                    ..OperationOverride::default()
                },
                base_ref: base,
                ..ExplicitChoice::default()
            },
        ),
        TopicAction::Finish { name, options } => (Action::Finish, name, options.to_explicit()),
        TopicAction::Update { name, rebase } => (Action::Update, name, update_choice(rebase)),
        TopicAction::Checkout { name } => (Action::Checkout, name, ExplicitChoice::default()),
        TopicAction::Delete { name, force } => (Action::Delete, name, delete_choice(force)),
        TopicAction::Rename { new_name } => (Action::Rename, Some(new_name), ExplicitChoice::default()),
        TopicAction::List => (Action::List, None, ExplicitChoice::default()),
        TopicAction::Publish { name } => (Action::Publish, name, ExplicitChoice::default()),
    };

    let session = open_session(context)?;
    let updates = session.synchronizer().subscribe();
    let result = session
        .run(kind, action, target.as_deref(), explicit)
        .await;
    finish_action(&session, updates, result)
}
