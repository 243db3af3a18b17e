use clap::{Parser, Subcommand};
use colored::*;
use std::process;

mod cli;

use cli::project::ProjectCommands;
use cli::task::TaskCommands;
use cli::workspace::WorkspaceCommands;
use tracksync_cli::{init_tracing, AppContext, Config};

#[derive(Parser)]
#[command(name = "tracksync")]
#[command(about = "Tracksync - keep local projects and tasks in step with Linear")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List teams of the connected Linear workspace
    Teams,
    /// Manage the Linear workspace connection
    #[command(subcommand)]
    Workspace(WorkspaceCommands),
    /// Local projects and their remote link
    #[command(subcommand)]
    Project(ProjectCommands),
    /// Local tasks and their remote issues
    #[command(subcommand)]
    Task(TaskCommands),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let ctx = AppContext::open(&config).await?;

    match command {
        Commands::Teams => cli::teams::list_teams(&ctx).await,
        Commands::Workspace(cmd) => cli::workspace::handle_workspace_command(&ctx, cmd).await,
        Commands::Project(cmd) => cli::project::handle_project_command(&ctx, cmd).await,
        Commands::Task(cmd) => cli::task::handle_task_command(&ctx, cmd).await,
    }
}
