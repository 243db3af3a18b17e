use chrono::NaiveDate;
use clap::Subcommand;
use colored::*;
use tracksync_cli::AppContext;
use tracksync_core::{Priority, Project, ProjectStatus};
use tracksync_sync::{IssueSyncReport, ProjectSyncOverview};

use super::{colored_status, format_time, new_table, print_sync_state};

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List local projects with their sync state
    List,
    /// Create a local project
    Add {
        /// Project name
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        /// planning, active, on_hold, completed or cancelled
        #[arg(long, default_value = "planning")]
        status: ProjectStatus,
        /// none, low, medium, high or urgent
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Create the project in Linear under a team and link it
    Link {
        /// Local project ID
        id: String,
        /// Linear team ID (see 'tracksync teams')
        #[arg(long)]
        team: String,
    },
    /// Overwrite the linked Linear project with local fields
    Push {
        /// Local project ID
        id: String,
    },
    /// Overwrite the local project from Linear
    Pull {
        /// Linear project ID
        remote_id: String,
    },
    /// Reconcile local tasks with the Linear project's issues
    Issues {
        /// Local project ID
        id: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show local and remote sync status
    Status {
        /// Local project ID
        id: String,
        /// Print the overview as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark the project as queued for sync
    Queue {
        /// Local project ID
        id: String,
    },
}

pub async fn handle_project_command(
    ctx: &AppContext,
    command: ProjectCommands,
) -> anyhow::Result<()> {
    match command {
        ProjectCommands::List => list_projects(ctx).await,
        ProjectCommands::Add {
            name,
            description,
            status,
            priority,
            start,
            end,
        } => {
            let mut project = Project::new(name);
            project.description = description;
            project.status = status;
            project.priority = priority;
            project.start_date = start;
            project.end_date = end;
            ctx.repository.save_project(&project).await?;

            println!(
                "{} Created project '{}' ({})",
                "✓".green(),
                project.name.bold(),
                project.id.cyan()
            );
            Ok(())
        }
        ProjectCommands::Link { id, team } => {
            let project = ctx.orchestrator.create_remote_project(&id, &team).await?;
            println!(
                "{} Linked '{}' to Linear project {}",
                "✓".green(),
                project.name.bold(),
                project.remote_project_id.as_deref().unwrap_or_default().cyan()
            );
            Ok(())
        }
        ProjectCommands::Push { id } => {
            let project = ctx.orchestrator.push_project_to_remote(&id).await?;
            println!("{} Pushed '{}'", "✓".green(), project.name.bold());
            Ok(())
        }
        ProjectCommands::Pull { remote_id } => {
            let project = ctx.orchestrator.pull_project_from_remote(&remote_id).await?;
            println!(
                "{} Pulled '{}' into {}",
                "✓".green(),
                project.name.bold(),
                project.id.cyan()
            );
            Ok(())
        }
        ProjectCommands::Issues { id, json } => {
            let report = ctx.orchestrator.sync_project_issues(&id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_issue_report(&report);
            }
            Ok(())
        }
        ProjectCommands::Status { id, json } => {
            let overview = ctx.orchestrator.get_project_sync_status(&id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
            } else {
                print_overview(&overview);
            }
            Ok(())
        }
        ProjectCommands::Queue { id } => {
            let project = ctx.orchestrator.queue_project_sync(&id).await?;
            println!(
                "{} '{}' is {}",
                "✓".green(),
                project.name.bold(),
                colored_status(project.sync.status())
            );
            Ok(())
        }
    }
}

async fn list_projects(ctx: &AppContext) -> anyhow::Result<()> {
    let projects = ctx.repository.list_projects().await?;

    if projects.is_empty() {
        println!("{}", "No projects found".yellow());
        println!(
            "{}",
            "Use 'tracksync project add' to create your first project".dimmed()
        );
        return Ok(());
    }

    let mut table = new_table(vec!["ID", "Name", "Status", "Linear", "Sync", "Last synced"]);
    for project in &projects {
        table.add_row(vec![
            project.id.clone(),
            project.name.clone(),
            project.status.to_string(),
            project
                .remote_project_id
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            colored_status(project.sync.status()).to_string(),
            format_time(project.sync.last_synced_at()),
        ]);
    }
    println!("{}", table);
    println!("Total: {} projects", projects.len().to_string().cyan());
    Ok(())
}

fn print_issue_report(report: &IssueSyncReport) {
    println!(
        "{} Synced {} issues: {} created, {} updated",
        if report.has_failures() {
            "!".yellow()
        } else {
            "✓".green()
        },
        report.processed(),
        report.created.len().to_string().green(),
        report.updated.len().to_string().cyan()
    );

    if report.has_failures() {
        println!();
        println!("{}", "Failed issues".red().bold());
        let mut table = new_table(vec!["Issue", "Error"]);
        for failure in &report.failed {
            table.add_row(vec![failure.identifier.clone(), failure.message.clone()]);
        }
        println!("{}", table);
    }

    if !report.orphaned.is_empty() {
        println!();
        println!(
            "{} {} local tasks point at issues no longer in this project:",
            "!".yellow(),
            report.orphaned.len()
        );
        for task_id in &report.orphaned {
            println!("  • {}", task_id);
        }
    }
}

fn print_overview(overview: &ProjectSyncOverview) {
    let project = &overview.project;
    println!("{}", format!("Project {}", project.name).blue().bold());
    println!("  ID:          {}", project.id);
    println!("  Status:      {}", project.status);
    println!("  Progress:    {}%", project.progress);
    println!(
        "  Linear:      {}",
        project.remote_project_id.as_deref().unwrap_or("not linked")
    );
    print_sync_state(&project.sync);

    if let Some(remote) = &overview.remote {
        println!();
        println!("{}", "Remote".blue().bold());
        println!("  Name:        {}", remote.name);
        println!("  State:       {}", remote.state);
        println!("  Progress:    {:.0}%", remote.progress * 100.0);
        if let Some(url) = &remote.url {
            println!("  URL:         {}", url);
        }
    } else if project.is_linked() {
        println!();
        println!("{}", "Remote project could not be fetched".yellow());
    }

    let counts = &overview.tasks;
    println!();
    println!(
        "Tasks: {} total, {} synced, {} pending, {} failed, {} not synced",
        counts.total,
        counts.synced.to_string().green(),
        counts.pending.to_string().yellow(),
        counts.failed.to_string().red(),
        counts.not_synced
    );
}
