// ABOUTME: SyncRepository trait, the async contract for the local system of record
// ABOUTME: Each save persists domain and sync fields in one write

use async_trait::async_trait;
use tracksync_core::{Personnel, Project, Task, WorkspaceConnection};

use crate::error::StorageResult;

/// Read/write access to the system of record.
///
/// Each `save_*` call persists the whole entity in one atomic write, so
/// domain fields and sync fields always land together.
#[async_trait]
pub trait SyncRepository: Send + Sync {
    // Projects
    async fn find_project_by_id(&self, id: &str) -> StorageResult<Option<Project>>;
    async fn find_project_by_remote_id(
        &self,
        remote_project_id: &str,
    ) -> StorageResult<Option<Project>>;
    async fn list_projects(&self) -> StorageResult<Vec<Project>>;
    async fn save_project(&self, project: &Project) -> StorageResult<()>;

    // Tasks
    async fn find_task_by_id(&self, id: &str) -> StorageResult<Option<Task>>;
    async fn find_task_by_remote_issue_id(&self, issue_id: &str) -> StorageResult<Option<Task>>;
    async fn list_tasks_for_project(&self, project_id: &str) -> StorageResult<Vec<Task>>;
    async fn save_task(&self, task: &Task) -> StorageResult<()>;

    // Personnel
    async fn find_personnel_by_id(&self, id: &str) -> StorageResult<Option<Personnel>>;
    /// Case-insensitive lookup
    async fn find_personnel_by_email(&self, email: &str) -> StorageResult<Option<Personnel>>;
    async fn save_personnel(&self, personnel: &Personnel) -> StorageResult<()>;

    // Workspace connections
    async fn active_workspace(&self) -> StorageResult<Option<WorkspaceConnection>>;
    /// Saving an active workspace deactivates every other one
    async fn save_workspace(&self, workspace: &WorkspaceConnection) -> StorageResult<()>;
}
