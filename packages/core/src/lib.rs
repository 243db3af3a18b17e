// ABOUTME: Core types, sync state machine, and translation tables for Tracksync
// ABOUTME: Foundational package shared by storage, the Linear client, and the sync engine

pub mod constants;
pub mod sync_state;
pub mod translate;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types
pub use types::{
    Personnel, Priority, Project, ProjectStatus, Task, TaskStatus, TokenKind, UnknownVariant,
    WorkspaceConnection,
};

pub use sync_state::{SyncState, SyncStatus, MAX_SYNC_ERROR_LEN, UNKNOWN_SYNC_ERROR};

// Re-export constants
pub use constants::{default_database_path, tracksync_dir};

// Re-export utilities
pub use utils::generate_id;

// Re-export validation
pub use validation::{truncate, validate_project, validate_task, ValidationError};
