use colored::*;
use tracksync_cli::AppContext;

use super::new_table;

pub async fn list_teams(ctx: &AppContext) -> anyhow::Result<()> {
    let teams = ctx.orchestrator.list_teams().await?;

    if teams.is_empty() {
        println!("{}", "No teams found in this workspace".yellow());
        return Ok(());
    }

    let mut table = new_table(vec!["ID", "Key", "Name"]);
    for team in &teams {
        table.add_row(vec![team.id.clone(), team.key.clone(), team.name.clone()]);
    }
    println!("{}", table);
    println!("Total: {} teams", teams.len().to_string().cyan());
    Ok(())
}
