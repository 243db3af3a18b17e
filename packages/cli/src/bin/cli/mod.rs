pub mod project;
pub mod task;
pub mod teams;
pub mod workspace;

use chrono::{DateTime, Utc};
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use tracksync_core::{SyncState, SyncStatus};

pub fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn colored_status(status: SyncStatus) -> ColoredString {
    match status {
        SyncStatus::Synced => status.as_str().green(),
        SyncStatus::PendingSync => status.as_str().yellow(),
        SyncStatus::SyncFailed => status.as_str().red(),
        SyncStatus::NotSynced => status.as_str().dimmed(),
    }
}

pub fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn print_sync_state(sync: &SyncState) {
    println!("  Sync status: {}", colored_status(sync.status()));
    println!("  Last synced: {}", format_time(sync.last_synced_at()));
    if let Some(error) = sync.last_sync_error() {
        println!("  Last error:  {}", error.red());
    }
}
