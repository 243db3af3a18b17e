// ABOUTME: In-memory SyncRepository used by tests and dry runs
// ABOUTME: Enforces the same uniqueness and reference rules as the SQLite schema

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use tracksync_core::{
    validate_project, validate_task, Personnel, Project, Task, WorkspaceConnection,
};

use crate::error::{StorageError, StorageResult};
use crate::repository::SyncRepository;

#[derive(Default)]
struct Tables {
    projects: HashMap<String, Project>,
    tasks: HashMap<String, Task>,
    personnel: HashMap<String, Personnel>,
    workspaces: HashMap<String, WorkspaceConnection>,
}

#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn same_opt(a: &Option<String>, b: &Option<String>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x == y)
}

#[async_trait]
impl SyncRepository for InMemoryRepository {
    async fn find_project_by_id(&self, id: &str) -> StorageResult<Option<Project>> {
        Ok(self.tables.read().await.projects.get(id).cloned())
    }

    async fn find_project_by_remote_id(
        &self,
        remote_project_id: &str,
    ) -> StorageResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .values()
            .find(|p| p.remote_project_id.as_deref() == Some(remote_project_id))
            .cloned())
    }

    async fn list_projects(&self) -> StorageResult<Vec<Project>> {
        let mut projects: Vec<Project> =
            self.tables.read().await.projects.values().cloned().collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    async fn save_project(&self, project: &Project) -> StorageResult<()> {
        validate_project(project)?;
        let mut tables = self.tables.write().await;

        if tables.projects.values().any(|p| {
            p.id != project.id && same_opt(&p.remote_project_id, &project.remote_project_id)
        }) {
            return Err(StorageError::Conflict(format!(
                "remote project {:?} is already linked",
                project.remote_project_id
            )));
        }

        tables.projects.insert(project.id.clone(), project.clone());
        Ok(())
    }

    async fn find_task_by_id(&self, id: &str) -> StorageResult<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(id).cloned())
    }

    async fn find_task_by_remote_issue_id(&self, issue_id: &str) -> StorageResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .find(|t| t.linear_issue_id.as_deref() == Some(issue_id))
            .cloned())
    }

    async fn list_tasks_for_project(&self, project_id: &str) -> StorageResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .tables
            .read()
            .await
            .tasks
            .values()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(tasks)
    }

    async fn save_task(&self, task: &Task) -> StorageResult<()> {
        validate_task(task)?;
        let mut tables = self.tables.write().await;

        if !tables.projects.contains_key(&task.project_id) {
            return Err(StorageError::NotFound(format!(
                "task references a missing project: {}",
                task.project_id
            )));
        }
        if let Some(assignee) = &task.assignee_id {
            if !tables.personnel.contains_key(assignee) {
                return Err(StorageError::NotFound(format!(
                    "task references missing personnel: {}",
                    assignee
                )));
            }
        }
        if tables.tasks.values().any(|t| {
            t.id != task.id
                && (same_opt(&t.linear_issue_id, &task.linear_issue_id)
                    || same_opt(&t.linear_issue_key, &task.linear_issue_key))
        }) {
            return Err(StorageError::Conflict(format!(
                "remote issue {:?} is already linked",
                task.linear_issue_id
            )));
        }

        tables.tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn find_personnel_by_id(&self, id: &str) -> StorageResult<Option<Personnel>> {
        Ok(self.tables.read().await.personnel.get(id).cloned())
    }

    async fn find_personnel_by_email(&self, email: &str) -> StorageResult<Option<Personnel>> {
        let email = email.trim();
        let tables = self.tables.read().await;
        Ok(tables
            .personnel
            .values()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn save_personnel(&self, personnel: &Personnel) -> StorageResult<()> {
        let mut tables = self.tables.write().await;
        let email = personnel.email.trim();
        if tables
            .personnel
            .values()
            .any(|p| p.id != personnel.id && p.email.eq_ignore_ascii_case(email))
        {
            return Err(StorageError::Conflict(format!(
                "personnel email already in use: {}",
                email
            )));
        }

        let mut stored = personnel.clone();
        stored.email = email.to_string();
        tables.personnel.insert(stored.id.clone(), stored);
        Ok(())
    }

    async fn active_workspace(&self) -> StorageResult<Option<WorkspaceConnection>> {
        let tables = self.tables.read().await;
        Ok(tables.workspaces.values().find(|w| w.is_active).cloned())
    }

    async fn save_workspace(&self, workspace: &WorkspaceConnection) -> StorageResult<()> {
        let mut tables = self.tables.write().await;
        if workspace.is_active {
            for other in tables.workspaces.values_mut() {
                other.is_active = false;
            }
        }
        tables
            .workspaces
            .insert(workspace.id.clone(), workspace.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracksync_core::TokenKind;

    #[tokio::test]
    async fn test_task_requires_existing_project() {
        let repo = InMemoryRepository::new();
        let task = Task::new("missing", "Dangling");
        let err = repo.save_task(&task).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_remote_project_id_conflicts() {
        let repo = InMemoryRepository::new();
        let mut first = Project::new("First");
        first.remote_project_id = Some("proj-1".into());
        repo.save_project(&first).await.unwrap();

        let mut second = Project::new("Second");
        second.remote_project_id = Some("proj-1".into());
        let err = repo.save_project(&second).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        // Re-saving the owner is fine
        repo.save_project(&first).await.unwrap();
    }

    #[tokio::test]
    async fn test_only_one_active_workspace() {
        let repo = InMemoryRepository::new();
        let a = WorkspaceConnection::new("A", "key-aaaa", TokenKind::ApiKey);
        let b = WorkspaceConnection::new("B", "key-bbbb", TokenKind::ApiKey);
        repo.save_workspace(&a).await.unwrap();
        repo.save_workspace(&b).await.unwrap();

        let active = repo.active_workspace().await.unwrap().unwrap();
        assert_eq!(active.name, "B");
    }

    #[tokio::test]
    async fn test_email_lookup_ignores_case() {
        let repo = InMemoryRepository::new();
        repo.save_personnel(&Personnel::new("Ada", "Ada@Example.com"))
            .await
            .unwrap();
        let found = repo.find_personnel_by_email("ada@example.COM").await.unwrap();
        assert_eq!(found.map(|p| p.name), Some("Ada".to_string()));
    }
}
