use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

use tracksync_core::{TokenKind, WorkspaceConnection};
use tracksync_linear::WorkspaceTrackerProvider;
use tracksync_storage::{SqliteRepository, SyncRepository};
use tracksync_sync::SyncOrchestrator;

use crate::config::Config;

/// Everything a command needs: the repository and an orchestrator over it
pub struct AppContext {
    pub repository: Arc<dyn SyncRepository>,
    pub orchestrator: SyncOrchestrator,
}

impl AppContext {
    /// Open the SQLite database from `config` and wire the orchestrator
    pub async fn open(config: &Config) -> Result<Self> {
        let repository = SqliteRepository::new(config.storage_config())
            .await
            .with_context(|| {
                format!(
                    "Failed to open database at {}",
                    config.database_path.display()
                )
            })?;
        Self::with_repository(Arc::new(repository), config).await
    }

    pub async fn with_repository(
        repository: Arc<dyn SyncRepository>,
        config: &Config,
    ) -> Result<Self> {
        bootstrap_workspace(repository.as_ref(), config).await?;

        let provider = WorkspaceTrackerProvider::new(repository.clone(), config.client_config());
        let orchestrator = SyncOrchestrator::new(repository.clone(), Arc::new(provider));
        Ok(Self {
            repository,
            orchestrator,
        })
    }
}

/// Store `LINEAR_API_KEY` as the active workspace when none is connected yet.
/// Returns whether a connection was created.
pub async fn bootstrap_workspace(repository: &dyn SyncRepository, config: &Config) -> Result<bool> {
    let Some(api_key) = &config.api_key else {
        return Ok(false);
    };
    if repository.active_workspace().await?.is_some() {
        debug!("Active workspace already present, ignoring LINEAR_API_KEY");
        return Ok(false);
    }

    let mut workspace =
        WorkspaceConnection::new(config.workspace_name.clone(), api_key.clone(), TokenKind::ApiKey);
    workspace.api_url = config.api_url.clone();
    repository
        .save_workspace(&workspace)
        .await
        .context("Failed to store workspace connection")?;

    info!(
        "Connected workspace '{}' from environment ({})",
        workspace.name,
        workspace.masked_token()
    );
    Ok(true)
}
