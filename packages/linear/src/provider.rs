// ABOUTME: Supplies the orchestrator with a tracker per call instead of a global client
// ABOUTME: Fails closed when no workspace connection is active

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use tracksync_storage::SyncRepository;

use crate::client::{ClientConfig, LinearClient};
use crate::error::{RemoteError, RemoteResult};
use crate::tracker::RemoteTracker;

/// Produces the tracker used for one orchestrator operation
#[async_trait]
pub trait TrackerProvider: Send + Sync {
    async fn tracker(&self) -> RemoteResult<Arc<dyn RemoteTracker>>;
}

/// Builds a [`LinearClient`] from the repository's active workspace
/// connection on every call, so a reconnect takes effect immediately.
pub struct WorkspaceTrackerProvider {
    repository: Arc<dyn SyncRepository>,
    config: ClientConfig,
}

impl WorkspaceTrackerProvider {
    pub fn new(repository: Arc<dyn SyncRepository>, config: ClientConfig) -> Self {
        Self { repository, config }
    }
}

#[async_trait]
impl TrackerProvider for WorkspaceTrackerProvider {
    async fn tracker(&self) -> RemoteResult<Arc<dyn RemoteTracker>> {
        let workspace = self
            .repository
            .active_workspace()
            .await
            .map_err(|e| {
                RemoteError::config(format!("Failed to load workspace connection: {}", e))
            })?
            .ok_or(RemoteError::NoActiveWorkspace)?;

        debug!("Using Linear workspace '{}'", workspace.name);
        let client = LinearClient::from_workspace(&workspace, self.config.clone())?;
        Ok(Arc::new(client))
    }
}

/// Always hands out the same tracker
#[derive(Clone)]
pub struct StaticTracker {
    tracker: Arc<dyn RemoteTracker>,
}

impl StaticTracker {
    pub fn new(tracker: Arc<dyn RemoteTracker>) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl TrackerProvider for StaticTracker {
    async fn tracker(&self) -> RemoteResult<Arc<dyn RemoteTracker>> {
        Ok(Arc::clone(&self.tracker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracksync_core::{TokenKind, WorkspaceConnection};
    use tracksync_storage::InMemoryRepository;

    #[tokio::test]
    async fn test_no_workspace_fails_closed() {
        let repo: Arc<dyn SyncRepository> = Arc::new(InMemoryRepository::new());
        let provider = WorkspaceTrackerProvider::new(repo, ClientConfig::default());

        let err = provider.tracker().await.err();
        assert_eq!(err, Some(RemoteError::NoActiveWorkspace));
    }

    #[tokio::test]
    async fn test_active_workspace_builds_client() {
        let repo = Arc::new(InMemoryRepository::new());
        repo.save_workspace(&WorkspaceConnection::new(
            "Acme",
            "lin_api_key",
            TokenKind::ApiKey,
        ))
        .await
        .unwrap();

        let provider = WorkspaceTrackerProvider::new(repo, ClientConfig::default());
        assert!(provider.tracker().await.is_ok());
    }
}
