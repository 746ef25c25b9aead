use clap::{Parser, Subcommand};
use flow_navigator::commands::*;
use flow_navigator::core::{
    error::{FlowNavigatorError, Result},
    print_error, Settings, WorkspaceContext,
};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flow-navigator")]
#[command(about = "Run git-flow branch workflows and track branch state")]
#[command(version = "0.1.0")]
#[command(after_help = "Per-kind actions: flow-navigator <kind> <start|finish|update|checkout|delete|rename|list|publish>")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Run as if started in <PATH>
    #[arg(short = 'C', global = true, value_name = "PATH")]
    path: Option<PathBuf>,

    /// Never prompt; dismiss every question
    #[arg(long, global = true)]
    no_input: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Finish the checked-out topic branch
    Finish(FinishArgs),
    /// Delete the checked-out topic branch
    Delete {
        #[arg(short, long)]
        force: bool,
    },
    /// Rebase the checked-out topic branch onto its parent
    Rebase,
    /// Update the checked-out topic branch from its parent
    Update {
        /// Rebase instead of merging
        #[arg(long)]
        rebase: bool,
    },
    /// Rename the checked-out topic branch
    Rename { new_name: String },
    /// Push the checked-out topic branch to the remote
    Publish,
    /// Continue a finish paused by conflicts
    Continue {
        /// Kind of the paused finish, if not the checked-out one
        #[arg(long)]
        kind: Option<String>,
    },
    /// Abort a finish paused by conflicts
    Abort {
        /// Kind of the paused finish, if not the checked-out one
        #[arg(long)]
        kind: Option<String>,
    },
    /// Show the current branch kind and state flags
    State {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the state flags whenever the repository changes
    Watch,
    /// List the configured branch types
    Types,
    #[command(external_subcommand)]
    Kind(Vec<String>),
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn workspace_context(path: Option<PathBuf>, no_input: bool) -> Result<WorkspaceContext> {
    let repo_path = match path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let mut settings = Settings::load()?;
    if no_input || !std::io::stdin().is_terminal() {
        settings.interactive = false;
    }
    Ok(WorkspaceContext::new(repo_path, settings))
}

async fn run(cli: Cli) -> Result<()> {
    let context = workspace_context(cli.path, cli.no_input)?;

    match cli.command {
        Commands::Finish(options) => execute_finish(context, options).await,
        Commands::Delete { force } => execute_delete(context, force).await,
        Commands::Rebase => execute_update(context, true).await,
        Commands::Update { rebase } => execute_update(context, rebase).await,
        Commands::Rename { new_name } => execute_rename(context, new_name).await,
        Commands::Publish => execute_publish(context).await,
        Commands::Continue { kind } => execute_resume(context, kind, false).await,
        Commands::Abort { kind } => execute_resume(context, kind, true).await,
        Commands::State { json } => execute_state(context, json).await,
        Commands::Watch => execute_watch(context).await,
        Commands::Types => execute_types(context),
        Commands::Kind(args) => execute_topic(context, args).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(cli).await {
        match &e {
            FlowNavigatorError::ExternalToolUnavailable { remediation } => {
                print_error(&format!("git-flow is not available. To fix: {remediation}"));
            }
            _ => print_error(&e.to_string()),
        }
        std::process::exit(1);
    }
}
