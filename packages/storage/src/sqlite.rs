use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{migrate::MigrateDatabase, Row};
use std::path::PathBuf;
use tracing::{debug, info};

use tracksync_core::{
    default_database_path, validate_project, validate_task, Personnel, Priority, Project,
    ProjectStatus, SyncState, SyncStatus, Task, TaskStatus, TokenKind, WorkspaceConnection,
};

use crate::error::{StorageError, StorageResult};
use crate::repository::SyncRepository;

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub enable_wal: bool,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            enable_wal: true,
            max_connections: 10,
            busy_timeout_seconds: 30,
        }
    }
}

/// SQLite implementation of SyncRepository
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open (creating if needed) the database described by `config`
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }

        let database_url = format!("sqlite:{}", config.path.display());

        if !sqlx::Sqlite::database_exists(&database_url)
            .await
            .map_err(StorageError::Sqlx)?
        {
            debug!("Creating database at: {}", database_url);
            sqlx::Sqlite::create_database(&database_url)
                .await
                .map_err(StorageError::Sqlx)?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.busy_timeout_seconds))
            .connect(&database_url)
            .await
            .map_err(StorageError::Sqlx)?;

        if config.enable_wal {
            sqlx::query("PRAGMA journal_mode = WAL")
                .execute(&pool)
                .await
                .map_err(StorageError::Sqlx)?;
        }

        Self::configure(&pool).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database. A single connection keeps every query on
    /// the same memory database.
    pub async fn in_memory() -> StorageResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(StorageError::Sqlx)?;
        Self::configure(&pool).await?;
        let repository = Self { pool };
        repository.initialize().await?;
        Ok(repository)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn configure(pool: &SqlitePool) -> StorageResult<()> {
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(pool)
            .await
            .map_err(StorageError::Sqlx)?;

        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(pool)
            .await
            .map_err(StorageError::Sqlx)?;
        Ok(())
    }

    /// Run migrations
    pub async fn initialize(&self) -> StorageResult<()> {
        info!("Initializing SQLite storage with migrations");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;

        info!("SQLite storage initialized successfully");
        Ok(())
    }
}

fn parse_timestamp(value: &str, column: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StorageError::Database(format!("Invalid {} timestamp: {}", column, value)))
}

fn parse_optional_timestamp(
    value: Option<String>,
    column: &str,
) -> StorageResult<Option<DateTime<Utc>>> {
    value.map(|v| parse_timestamp(&v, column)).transpose()
}

fn parse_optional_date(value: Option<String>, column: &str) -> StorageResult<Option<NaiveDate>> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|_| StorageError::Database(format!("Invalid {} date: {}", column, v)))
        })
        .transpose()
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

fn row_to_sync_state(row: &SqliteRow) -> StorageResult<SyncState> {
    let status: String = row.try_get("sync_status")?;
    let status: SyncStatus = status.parse()?;
    let last_synced_at = parse_optional_timestamp(row.try_get("last_synced_at")?, "last_synced_at")?;
    let last_sync_error: Option<String> = row.try_get("last_sync_error")?;
    Ok(SyncState::restore(status, last_synced_at, last_sync_error))
}

fn row_to_project(row: &SqliteRow) -> StorageResult<Project> {
    let status: String = row.try_get("status")?;
    let priority: String = row.try_get("priority")?;
    let progress: i64 = row.try_get("progress")?;
    let cycle_ids_json: String = row.try_get("remote_cycle_ids")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Project {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        status: status.parse::<ProjectStatus>()?,
        priority: priority.parse::<Priority>()?,
        team_id: row.try_get("team_id")?,
        start_date: parse_optional_date(row.try_get("start_date")?, "start_date")?,
        end_date: parse_optional_date(row.try_get("end_date")?, "end_date")?,
        progress: u8::try_from(progress.clamp(0, 100)).unwrap_or(0),
        sync_enabled: row.try_get("sync_enabled")?,
        sync: row_to_sync_state(row)?,
        remote_project_id: row.try_get("remote_project_id")?,
        remote_team_id: row.try_get("remote_team_id")?,
        remote_cycle_ids: serde_json::from_str(&cycle_ids_json)?,
        created_at: parse_timestamp(&created_at, "created_at")?,
        updated_at: parse_timestamp(&updated_at, "updated_at")?,
    })
}

fn row_to_task(row: &SqliteRow) -> StorageResult<Task> {
    let project_id: String = row.try_get("project_id")?;
    let title: String = row.try_get("title")?;
    let status: String = row.try_get("status")?;
    let priority: String = row.try_get("priority")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    let mut task = Task::new(project_id, title);
    task.id = row.try_get("id")?;
    task.description = row.try_get("description")?;
    task.priority = priority.parse::<Priority>()?;
    task.assignee_id = row.try_get("assignee_id")?;
    task.due_date = parse_optional_date(row.try_get("due_date")?, "due_date")?;
    task.linear_issue_id = row.try_get("linear_issue_id")?;
    task.linear_issue_key = row.try_get("linear_issue_key")?;
    task.remote_project_id = row.try_get("remote_project_id")?;
    task.remote_state_id = row.try_get("remote_state_id")?;
    task.sync = row_to_sync_state(row)?;
    task.created_at = parse_timestamp(&created_at, "created_at")?;
    task.updated_at = parse_timestamp(&updated_at, "updated_at")?;

    let completed_at = parse_optional_timestamp(row.try_get("completed_at")?, "completed_at")?;
    task.restore_status(status.parse::<TaskStatus>()?, completed_at);
    Ok(task)
}

fn row_to_personnel(row: &SqliteRow) -> StorageResult<Personnel> {
    Ok(Personnel {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
    })
}

fn row_to_workspace(row: &SqliteRow) -> StorageResult<WorkspaceConnection> {
    let token_kind: String = row.try_get("token_kind")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(WorkspaceConnection {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        access_token: row.try_get("access_token")?,
        token_kind: token_kind.parse::<TokenKind>()?,
        api_url: row.try_get("api_url")?,
        is_active: row.try_get("is_active")?,
        created_at: parse_timestamp(&created_at, "created_at")?,
    })
}

/// Map constraint violations to domain errors
fn map_write_error(err: sqlx::Error, entity: &str) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(code) = db_err.code() {
            // SQLITE_CONSTRAINT_UNIQUE / SQLITE_CONSTRAINT_PRIMARYKEY
            if code == "2067" || code == "1555" {
                return StorageError::Conflict(format!("{}: {}", entity, db_err.message()));
            }
            // SQLITE_CONSTRAINT_FOREIGNKEY
            if code == "787" {
                return StorageError::NotFound(format!(
                    "{} references a missing row: {}",
                    entity,
                    db_err.message()
                ));
            }
        }
    }
    StorageError::Sqlx(err)
}

#[async_trait]
impl SyncRepository for SqliteRepository {
    async fn find_project_by_id(&self, id: &str) -> StorageResult<Option<Project>> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_project).transpose()
    }

    async fn find_project_by_remote_id(
        &self,
        remote_project_id: &str,
    ) -> StorageResult<Option<Project>> {
        let row = sqlx::query("SELECT * FROM projects WHERE remote_project_id = ?")
            .bind(remote_project_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_project).transpose()
    }

    async fn list_projects(&self) -> StorageResult<Vec<Project>> {
        let rows = sqlx::query("SELECT * FROM projects ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let projects = rows
            .iter()
            .map(row_to_project)
            .collect::<StorageResult<Vec<_>>>()?;
        debug!("Retrieved {} projects", projects.len());
        Ok(projects)
    }

    async fn save_project(&self, project: &Project) -> StorageResult<()> {
        validate_project(project)?;
        let cycle_ids_json = serde_json::to_string(&project.remote_cycle_ids)?;

        sqlx::query(
            r#"
            INSERT INTO projects (
                id, name, description, status, priority, team_id,
                start_date, end_date, progress, sync_enabled,
                sync_status, last_synced_at, last_sync_error,
                remote_project_id, remote_team_id, remote_cycle_ids,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                status = excluded.status,
                priority = excluded.priority,
                team_id = excluded.team_id,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                progress = excluded.progress,
                sync_enabled = excluded.sync_enabled,
                sync_status = excluded.sync_status,
                last_synced_at = excluded.last_synced_at,
                last_sync_error = excluded.last_sync_error,
                remote_project_id = excluded.remote_project_id,
                remote_team_id = excluded.remote_team_id,
                remote_cycle_ids = excluded.remote_cycle_ids,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(project.priority.as_str())
        .bind(&project.team_id)
        .bind(format_date(project.start_date))
        .bind(format_date(project.end_date))
        .bind(i64::from(project.progress))
        .bind(project.sync_enabled)
        .bind(project.sync.status().as_str())
        .bind(project.sync.last_synced_at().map(|t| t.to_rfc3339()))
        .bind(project.sync.last_sync_error())
        .bind(&project.remote_project_id)
        .bind(&project.remote_team_id)
        .bind(&cycle_ids_json)
        .bind(project.created_at.to_rfc3339())
        .bind(project.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "project"))?;

        debug!(
            "Saved project '{}' ({}) sync_status={}",
            project.name,
            project.id,
            project.sync.status()
        );
        Ok(())
    }

    async fn find_task_by_id(&self, id: &str) -> StorageResult<Option<Task>> {
        let row = sqlx::query("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_task).transpose()
    }

    async fn find_task_by_remote_issue_id(&self, issue_id: &str) -> StorageResult<Option<Task>> {
        let row = sqlx::query("SELECT * FROM tasks WHERE linear_issue_id = ?")
            .bind(issue_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_task).transpose()
    }

    async fn list_tasks_for_project(&self, project_id: &str) -> StorageResult<Vec<Task>> {
        debug!("Fetching tasks for project: {}", project_id);

        let rows = sqlx::query("SELECT * FROM tasks WHERE project_id = ? ORDER BY created_at, id")
            .bind(project_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_task).collect()
    }

    async fn save_task(&self, task: &Task) -> StorageResult<()> {
        validate_task(task)?;

        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, project_id, title, description, status, priority,
                assignee_id, due_date, completed_at,
                linear_issue_id, linear_issue_key, remote_project_id, remote_state_id,
                sync_status, last_synced_at, last_sync_error,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                project_id = excluded.project_id,
                title = excluded.title,
                description = excluded.description,
                status = excluded.status,
                priority = excluded.priority,
                assignee_id = excluded.assignee_id,
                due_date = excluded.due_date,
                completed_at = excluded.completed_at,
                linear_issue_id = excluded.linear_issue_id,
                linear_issue_key = excluded.linear_issue_key,
                remote_project_id = excluded.remote_project_id,
                remote_state_id = excluded.remote_state_id,
                sync_status = excluded.sync_status,
                last_synced_at = excluded.last_synced_at,
                last_sync_error = excluded.last_sync_error,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&task.id)
        .bind(&task.project_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status().as_str())
        .bind(task.priority.as_str())
        .bind(&task.assignee_id)
        .bind(format_date(task.due_date))
        .bind(task.completed_at().map(|t| t.to_rfc3339()))
        .bind(&task.linear_issue_id)
        .bind(&task.linear_issue_key)
        .bind(&task.remote_project_id)
        .bind(&task.remote_state_id)
        .bind(task.sync.status().as_str())
        .bind(task.sync.last_synced_at().map(|t| t.to_rfc3339()))
        .bind(task.sync.last_sync_error())
        .bind(task.created_at.to_rfc3339())
        .bind(task.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "task"))?;

        debug!(
            "Saved task '{}' ({}) sync_status={}",
            task.title,
            task.id,
            task.sync.status()
        );
        Ok(())
    }

    async fn find_personnel_by_id(&self, id: &str) -> StorageResult<Option<Personnel>> {
        let row = sqlx::query("SELECT * FROM personnel WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_personnel).transpose()
    }

    async fn find_personnel_by_email(&self, email: &str) -> StorageResult<Option<Personnel>> {
        let row = sqlx::query("SELECT * FROM personnel WHERE email = ? COLLATE NOCASE LIMIT 1")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_personnel).transpose()
    }

    async fn save_personnel(&self, personnel: &Personnel) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO personnel (id, name, email) VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name, email = excluded.email
            "#,
        )
        .bind(&personnel.id)
        .bind(&personnel.name)
        .bind(personnel.email.trim())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "personnel"))?;
        Ok(())
    }

    async fn active_workspace(&self) -> StorageResult<Option<WorkspaceConnection>> {
        let row = sqlx::query("SELECT * FROM linear_workspaces WHERE is_active = 1 LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_workspace).transpose()
    }

    async fn save_workspace(&self, workspace: &WorkspaceConnection) -> StorageResult<()> {
        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        if workspace.is_active {
            sqlx::query("UPDATE linear_workspaces SET is_active = 0 WHERE id != ?")
                .bind(&workspace.id)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::Sqlx)?;
        }

        sqlx::query(
            r#"
            INSERT INTO linear_workspaces (
                id, name, access_token, token_kind, api_url, is_active, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                access_token = excluded.access_token,
                token_kind = excluded.token_kind,
                api_url = excluded.api_url,
                is_active = excluded.is_active
            "#,
        )
        .bind(&workspace.id)
        .bind(&workspace.name)
        .bind(&workspace.access_token)
        .bind(workspace.token_kind.as_str())
        .bind(&workspace.api_url)
        .bind(workspace.is_active)
        .bind(workspace.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "workspace"))?;

        tx.commit().await.map_err(StorageError::Sqlx)?;
        info!("Saved workspace connection '{}'", workspace.name);
        Ok(())
    }
}
