use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use colored::*;
use tracksync_cli::AppContext;
use tracksync_core::{Priority, Task, TaskStatus};

use super::{colored_status, new_table, print_sync_state};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List the tasks of a local project
    List {
        /// Local project ID
        project_id: String,
    },
    /// Create a local task
    Add {
        /// Local project ID
        project_id: String,
        /// Task title
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// backlog, todo, in_progress, in_review, done or cancelled
        #[arg(long, default_value = "backlog")]
        status: TaskStatus,
        /// none, low, medium, high or urgent
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// Create or update the task's Linear issue
    Push {
        /// Local task ID
        id: String,
    },
    /// Overwrite the local task from its Linear issue
    Pull {
        /// Linear issue ID
        issue_id: String,
    },
    /// Show a task's sync state
    Show {
        /// Local task ID
        id: String,
    },
    /// Mark the task as queued for sync
    Queue {
        /// Local task ID
        id: String,
    },
}

pub async fn handle_task_command(ctx: &AppContext, command: TaskCommands) -> anyhow::Result<()> {
    match command {
        TaskCommands::List { project_id } => {
            let tasks = ctx.repository.list_tasks_for_project(&project_id).await?;
            if tasks.is_empty() {
                println!("{}", "No tasks found".yellow());
                return Ok(());
            }

            let mut table = new_table(vec!["ID", "Title", "Status", "Priority", "Issue", "Sync"]);
            for task in &tasks {
                table.add_row(vec![
                    task.id.clone(),
                    task.title.clone(),
                    task.status().to_string(),
                    task.priority.to_string(),
                    task.linear_issue_key
                        .clone()
                        .unwrap_or_else(|| "-".to_string()),
                    colored_status(task.sync.status()).to_string(),
                ]);
            }
            println!("{}", table);
            println!("Total: {} tasks", tasks.len().to_string().cyan());
            Ok(())
        }
        TaskCommands::Add {
            project_id,
            title,
            description,
            status,
            priority,
            due,
        } => {
            let mut task = Task::new(project_id, title);
            task.description = description;
            task.set_status(status, Utc::now());
            task.priority = priority;
            task.due_date = due;
            ctx.repository.save_task(&task).await?;

            println!(
                "{} Created task '{}' ({})",
                "✓".green(),
                task.title.bold(),
                task.id.cyan()
            );
            Ok(())
        }
        TaskCommands::Push { id } => {
            let task = ctx.orchestrator.push_task_to_remote(&id).await?;
            println!(
                "{} Pushed '{}' as {}",
                "✓".green(),
                task.title.bold(),
                task.linear_issue_key.as_deref().unwrap_or_default().cyan()
            );
            Ok(())
        }
        TaskCommands::Pull { issue_id } => {
            let task = ctx.orchestrator.pull_task_from_remote(&issue_id).await?;
            println!(
                "{} Pulled {} into '{}' ({})",
                "✓".green(),
                task.linear_issue_key.as_deref().unwrap_or(&issue_id),
                task.title.bold(),
                task.status()
            );
            Ok(())
        }
        TaskCommands::Show { id } => {
            let task = ctx
                .repository
                .find_task_by_id(&id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Task '{}' not found", id))?;

            println!("{}", format!("Task {}", task.title).blue().bold());
            println!("  ID:          {}", task.id);
            println!("  Project:     {}", task.project_id);
            println!("  Status:      {}", task.status());
            println!("  Priority:    {}", task.priority);
            println!(
                "  Issue:       {}",
                task.linear_issue_key.as_deref().unwrap_or("not linked")
            );
            print_sync_state(&task.sync);
            Ok(())
        }
        TaskCommands::Queue { id } => {
            let task = ctx.orchestrator.queue_task_sync(&id).await?;
            println!(
                "{} '{}' is {}",
                "✓".green(),
                task.title.bold(),
                colored_status(task.sync.status())
            );
            Ok(())
        }
    }
}
