use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracksync_cli::context::bootstrap_workspace;
use tracksync_cli::{AppContext, Config};
use tracksync_core::{Project, SyncStatus, TokenKind, WorkspaceConnection};
use tracksync_storage::{InMemoryRepository, SyncRepository};
use tracksync_sync::SyncError;

fn config(api_key: Option<&str>) -> Config {
    Config {
        database_path: PathBuf::from("unused.db"),
        db_max_connections: 1,
        api_url: Some("http://127.0.0.1:9".into()),
        api_key: api_key.map(str::to_string),
        workspace_name: "env".into(),
        request_timeout: Duration::from_secs(1),
        connect_timeout: Duration::from_secs(1),
    }
}

#[tokio::test]
async fn test_bootstrap_stores_api_key_workspace() {
    let repo = InMemoryRepository::new();

    let created = bootstrap_workspace(&repo, &config(Some("lin_api_123456")))
        .await
        .unwrap();
    assert!(created);

    let workspace = repo.active_workspace().await.unwrap().unwrap();
    assert_eq!(workspace.name, "env");
    assert_eq!(workspace.access_token, "lin_api_123456");
    assert_eq!(workspace.token_kind, TokenKind::ApiKey);
    assert_eq!(workspace.api_url.as_deref(), Some("http://127.0.0.1:9"));
}

#[tokio::test]
async fn test_bootstrap_keeps_existing_connection() {
    let repo = InMemoryRepository::new();
    let existing = WorkspaceConnection::new("manual", "oauth-token", TokenKind::OAuth);
    repo.save_workspace(&existing).await.unwrap();

    let created = bootstrap_workspace(&repo, &config(Some("lin_api_123456")))
        .await
        .unwrap();
    assert!(!created);

    let workspace = repo.active_workspace().await.unwrap().unwrap();
    assert_eq!(workspace.id, existing.id);
}

#[tokio::test]
async fn test_without_api_key_nothing_is_stored() {
    let repo = InMemoryRepository::new();
    assert!(!bootstrap_workspace(&repo, &config(None)).await.unwrap());
    assert!(repo.active_workspace().await.unwrap().is_none());
}

#[tokio::test]
async fn test_context_without_workspace_records_remote_failure() {
    let repo: Arc<dyn SyncRepository> = Arc::new(InMemoryRepository::new());
    let ctx = AppContext::with_repository(repo.clone(), &config(None))
        .await
        .unwrap();

    let project = Project::new("Offline");
    repo.save_project(&project).await.unwrap();

    let err = ctx
        .orchestrator
        .create_remote_project(&project.id, "team-1")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Remote { .. }));

    let stored = repo.find_project_by_id(&project.id).await.unwrap().unwrap();
    assert_eq!(stored.sync.status(), SyncStatus::SyncFailed);
    assert!(stored.remote_project_id.is_none());
}
