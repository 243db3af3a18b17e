use std::env;
use std::path::PathBuf;

/// Maximum length of a project name accepted locally
pub const MAX_PROJECT_NAME_LEN: usize = 255;

/// Maximum length of a task title accepted locally
pub const MAX_TASK_TITLE_LEN: usize = 512;

/// Get the path to the Tracksync directory (~/.tracksync)
pub fn tracksync_dir() -> PathBuf {
    // HOME first so tests can redirect it
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".tracksync")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tracksync")
    }
}

/// Get the default SQLite database path (~/.tracksync/tracksync.db)
pub fn default_database_path() -> PathBuf {
    tracksync_dir().join("tracksync.db")
}
