//! One logical workflow operation from start to finish.
//!
//! A [`FlowSession`] owns the collaborators for one repository and runs
//! actions in a fixed order: registry lookup, argument resolution, config
//! propagation, optional tag message prompt, command assembly, execution, and
//! finally a state refresh. The refresh after a topology-changing action
//! happens whether or not the command succeeded, since a failed finish may
//! have partially applied.
//!
//! Nothing is cached between operations except the registry, which is loaded
//! once per session from the workflow configuration.

use crate::core::classifier::classify_current;
use crate::core::command::{propagate_configuration, Action, Command, CommandBuilder};
use crate::core::error::{FlowNavigatorError, Result};
use crate::core::executor::{CommandExecutor, CommandOutput, ProcessExecutor};
use crate::core::git::{GitBranchReader, GitConfigStore};
use crate::core::prompt::{NonInteractivePrompter, Prompter, TerminalPrompter};
use crate::core::registry::{BranchTypeConfig, BranchTypeRegistry};
use crate::core::resolver::{resolve_options, ResolvedArguments};
use crate::core::settings::{ExplicitChoice, Operation, Settings};
use crate::core::store::ConfigStore;
use crate::core::sync::{BranchReader, StateSynchronizer, UiStateSnapshot};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything an entry point needs to know about where it runs.
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
    pub repo_path: PathBuf,
    pub settings: Settings,
}

impl WorkspaceContext {
    pub fn new(repo_path: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            repo_path: repo_path.into(),
            settings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed {
        command: Command,
        output: CommandOutput,
    },
    /// A selection had nothing to choose from. Not an error.
    NoBranchesOfKind { kind: String },
    /// Checkout of a branch that does not exist locally.
    NoSuchBranch { branch: String },
    /// The user dismissed a prompt; nothing ran.
    Dismissed,
}

pub struct FlowSession {
    context: WorkspaceContext,
    registry: Arc<BranchTypeRegistry>,
    store: Arc<dyn ConfigStore>,
    reader: Arc<dyn BranchReader>,
    executor: Arc<dyn CommandExecutor>,
    prompter: Arc<dyn Prompter>,
    synchronizer: Arc<StateSynchronizer>,
}

impl FlowSession {
    /// Session backed by the repository at `context.repo_path` and the real
    /// `git flow` executable.
    pub fn open(context: WorkspaceContext) -> Result<Self> {
        let store = Arc::new(GitConfigStore::new(&context.repo_path));
        let reader = Arc::new(GitBranchReader::new(&context.repo_path));
        let prompter: Arc<dyn Prompter> = if context.settings.interactive {
            Arc::new(TerminalPrompter)
        } else {
            Arc::new(NonInteractivePrompter)
        };
        Self::with_collaborators(context, store, reader, Arc::new(ProcessExecutor), prompter)
    }

    pub fn with_collaborators(
        context: WorkspaceContext,
        store: Arc<dyn ConfigStore>,
        reader: Arc<dyn BranchReader>,
        executor: Arc<dyn CommandExecutor>,
        prompter: Arc<dyn Prompter>,
    ) -> Result<Self> {
        let registry = match BranchTypeRegistry::load(store.as_ref()) {
            Ok(registry) => registry,
            // Outside a repository there is no config to read; state queries
            // still work and report the degraded snapshot.
            Err(FlowNavigatorError::NotARepository) => {
                log::debug!("No repository configuration, using preset branch types");
                BranchTypeRegistry::preset()
            }
            Err(e) => return Err(e),
        };
        let registry = Arc::new(registry);
        let synchronizer = Arc::new(StateSynchronizer::new(registry.clone(), reader.clone()));

        Ok(Self {
            context,
            registry,
            store,
            reader,
            executor,
            prompter,
            synchronizer,
        })
    }

    pub fn context(&self) -> &WorkspaceContext {
        &self.context
    }

    pub fn registry(&self) -> &BranchTypeRegistry {
        &self.registry
    }

    pub fn synchronizer(&self) -> Arc<StateSynchronizer> {
        self.synchronizer.clone()
    }

    pub async fn refresh(&self) -> UiStateSnapshot {
        self.synchronizer.refresh().await
    }

    /// Run `action` for the topic kind `kind`.
    pub async fn run(
        &self,
        kind: &str,
        action: Action,
        target: Option<&str>,
        explicit: ExplicitChoice,
    ) -> Result<ActionOutcome> {
        let config = self.registry.topic(kind)?;
        let target = normalize_target(config, action, target);

        if action == Action::Checkout {
            let Some(name) = &target else {
                return self.checkout_selected(config).await;
            };
            let branch = config.full_name(name);
            if !self.reader.branch_exists(&branch).await? {
                return Ok(ActionOutcome::NoSuchBranch { branch });
            }
        }

        let resolved = match action.operation() {
            Some(operation) => self.resolve_operation(config, action, operation, &explicit).await?,
            None => plain_arguments(action, &explicit),
        };

        let command = CommandBuilder::build(kind, action, target.as_deref(), resolved)?;
        self.execute(command, action.changes_topology()).await
    }

    /// Run `action` against whatever topic branch is checked out.
    pub async fn run_on_current(
        &self,
        action: Action,
        target: Option<&str>,
        explicit: ExplicitChoice,
    ) -> Result<ActionOutcome> {
        let state = classify_current(self.reader.as_ref(), &self.registry).await?;
        let Some(kind) = state.kind.topic_name() else {
            return Err(FlowNavigatorError::not_on_topic_branch(&state.full_ref_name));
        };

        let target = match action {
            Action::Rename => target,
            _ => Some(state.short_name.as_str()),
        };
        self.run(kind, action, target, explicit).await
    }

    /// `finish --continue` or `finish --abort` for a paused finish. Without an
    /// explicit kind, the checked-out topic kind is used.
    pub async fn resume_finish(&self, kind: Option<&str>, abort: bool) -> Result<ActionOutcome> {
        let kind = match kind {
            Some(kind) => self.registry.topic(kind)?.name.clone(),
            None => {
                let state = classify_current(self.reader.as_ref(), &self.registry).await?;
                state
                    .kind
                    .topic_name()
                    .map(str::to_string)
                    .ok_or_else(|| FlowNavigatorError::not_on_topic_branch(&state.full_ref_name))?
            }
        };

        self.execute(CommandBuilder::resume_finish(&kind, abort), true)
            .await
    }

    async fn resolve_operation(
        &self,
        config: &BranchTypeConfig,
        action: Action,
        operation: Operation,
        explicit: &ExplicitChoice,
    ) -> Result<ResolvedArguments> {
        let settings = &self.context.settings;
        let overrides = settings.operation_override(&config.name, operation);
        let mut options = resolve_options(config, operation, &overrides, explicit)?;

        propagate_configuration(
            self.store.as_ref(),
            config,
            action,
            &settings.remote,
            settings.delete_remote_on_finish,
        )?;

        if options.needs_tag_message_prompt() {
            options.tag_message = self
                .prompter
                .input(&format!("Tag message for {}", config.name))
                .await?;
        }

        Ok(options.to_arguments())
    }

    async fn checkout_selected(&self, config: &BranchTypeConfig) -> Result<ActionOutcome> {
        let names: Vec<String> = self
            .reader
            .list_branches(&config.prefix)
            .await?
            .iter()
            .filter_map(|branch| branch.strip_prefix(config.prefix.as_str()))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        if names.is_empty() {
            return Ok(ActionOutcome::NoBranchesOfKind {
                kind: config.name.clone(),
            });
        }

        let prompt = format!("Select a {} branch", config.name);
        let Some(choice) = self.prompter.select(&prompt, &names).await? else {
            return Ok(ActionOutcome::Dismissed);
        };

        let command = CommandBuilder::build(
            &config.name,
            Action::Checkout,
            Some(&choice),
            ResolvedArguments::new(),
        )?;
        self.execute(command, true).await
    }

    async fn execute(&self, command: Command, refresh: bool) -> Result<ActionOutcome> {
        let result = self
            .executor
            .run(&command, &self.context.repo_path)
            .await;

        if refresh {
            self.synchronizer.refresh().await;
        }

        let output = result?;
        Ok(ActionOutcome::Completed { command, output })
    }
}

/// Actions on existing branches accept the full branch name too.
fn normalize_target(config: &BranchTypeConfig, action: Action, target: Option<&str>) -> Option<String> {
    let target = target.map(str::trim).filter(|t| !t.is_empty())?;
    if matches!(action, Action::Start | Action::Rename) {
        return Some(target.to_string());
    }
    let short = target
        .strip_prefix(config.prefix.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(target);
    Some(short.to_string())
}

fn plain_arguments(action: Action, explicit: &ExplicitChoice) -> ResolvedArguments {
    let mut args = ResolvedArguments::new();
    if action == Action::Delete && explicit.overrides.force_delete.value() == Some(&true) {
        args.push("--force");
    }
    args
}
