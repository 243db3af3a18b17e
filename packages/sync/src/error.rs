// ABOUTME: Orchestrator error type and result alias
// ABOUTME: Separates pre-write refusals from recorded remote failures

use thiserror::Error;
use tracksync_storage::StorageError;

pub type SyncResult<T> = Result<T, SyncError>;

/// Orchestrator errors.
///
/// `NotLinked`, `AlreadyLinked` and `NotFound` are returned before anything
/// is written. `Remote` is returned after the failure has been recorded on
/// the entity as `sync_failed`.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Not linked to the remote tracker: {0}")]
    NotLinked(String),

    #[error("Already linked to the remote tracker: {0}")]
    AlreadyLinked(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Sync of {entity} failed: {message}")]
    Remote { entity: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl SyncError {
    pub fn remote(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Whether the caller asked for something the entity's link state forbids
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            SyncError::NotLinked(_) | SyncError::AlreadyLinked(_) | SyncError::NotFound(_)
        )
    }
}
