use clap::Subcommand;
use colored::*;
use tracksync_cli::AppContext;
use tracksync_core::{TokenKind, WorkspaceConnection};

#[derive(Subcommand)]
pub enum WorkspaceCommands {
    /// Store a Linear token and make it the active connection
    Connect {
        /// API key or OAuth access token
        #[arg(long)]
        token: String,
        /// Display name for the connection
        #[arg(long, default_value = "default")]
        name: String,
        /// Treat the token as an OAuth access token
        #[arg(long)]
        oauth: bool,
        /// Override the Linear API base URL
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Show the active connection
    Show,
}

pub async fn handle_workspace_command(
    ctx: &AppContext,
    command: WorkspaceCommands,
) -> anyhow::Result<()> {
    match command {
        WorkspaceCommands::Connect {
            token,
            name,
            oauth,
            api_url,
        } => {
            let kind = if oauth {
                TokenKind::OAuth
            } else {
                TokenKind::ApiKey
            };
            let mut workspace = WorkspaceConnection::new(name, token.trim(), kind);
            workspace.api_url = api_url;
            ctx.repository.save_workspace(&workspace).await?;

            println!(
                "{} Connected workspace '{}' ({})",
                "✓".green(),
                workspace.name.bold(),
                workspace.masked_token()
            );
            Ok(())
        }
        WorkspaceCommands::Show => {
            match ctx.repository.active_workspace().await? {
                Some(workspace) => {
                    println!("{}", "Active Linear workspace".blue().bold());
                    println!("  Name:      {}", workspace.name);
                    println!("  Token:     {}", workspace.masked_token());
                    println!("  Kind:      {}", workspace.token_kind.as_str());
                    println!(
                        "  API URL:   {}",
                        workspace.api_url.as_deref().unwrap_or("(default)")
                    );
                }
                None => {
                    println!("{}", "No active workspace connection".yellow());
                    println!(
                        "{}",
                        "Use 'tracksync workspace connect --token <key>' or set LINEAR_API_KEY"
                            .dimmed()
                    );
                }
            }
            Ok(())
        }
    }
}
