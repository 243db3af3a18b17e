// ABOUTME: Local domain types for projects, tasks, personnel, and workspace connections
// ABOUTME: Enumerations use the local vocabulary; remote vocabulary lives in translate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::sync_state::SyncState;
use crate::utils::generate_id;

/// Returned when a stored or user-supplied string names no known variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Status options for projects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Planning
    }
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Planning,
        ProjectStatus::Active,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
        ProjectStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Planning => write!(f, "Planning"),
            ProjectStatus::Active => write!(f, "Active"),
            ProjectStatus::OnHold => write!(f, "On Hold"),
            ProjectStatus::Completed => write!(f, "Completed"),
            ProjectStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("project status", s))
    }
}

/// Task status options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Backlog,
    Todo,
    InProgress,
    InReview,
    Done,
    Cancelled,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Backlog
    }
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Backlog,
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::InReview,
        TaskStatus::Done,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Backlog => "backlog",
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::InReview => "in_review",
            TaskStatus::Done => "done",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Backlog => write!(f, "Backlog"),
            TaskStatus::Todo => write!(f, "Todo"),
            TaskStatus::InProgress => write!(f, "In Progress"),
            TaskStatus::InReview => write!(f, "In Review"),
            TaskStatus::Done => write!(f, "Done"),
            TaskStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("task status", s))
    }
}

/// Priority levels, shared by projects and tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    None,
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    pub const ALL: [Priority; 5] = [
        Priority::None,
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::None => "none",
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::None => write!(f, "None"),
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
            Priority::Urgent => write!(f, "Urgent"),
        }
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("priority", s))
    }
}

/// A project tracked locally and optionally mirrored in the remote tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub priority: Priority,
    pub team_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Percentage, 0..=100
    #[serde(default)]
    pub progress: u8,

    // Sync bookkeeping
    #[serde(default)]
    pub sync_enabled: bool,
    #[serde(flatten)]
    pub sync: SyncState,
    pub remote_project_id: Option<String>,
    pub remote_team_id: Option<String>,
    #[serde(default)]
    pub remote_cycle_ids: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// A fresh, never-synced local project
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            name: name.into(),
            description: None,
            status: ProjectStatus::default(),
            priority: Priority::default(),
            team_id: None,
            start_date: None,
            end_date: None,
            progress: 0,
            sync_enabled: false,
            sync: SyncState::new(),
            remote_project_id: None,
            remote_team_id: None,
            remote_cycle_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the project has been created remotely
    pub fn is_linked(&self) -> bool {
        self.remote_project_id.is_some()
    }

    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
    }
}

/// A unit of work, optionally linked 1:1 to a remote issue.
///
/// `status` and `completed_at` are private: `completed_at` is set exactly
/// when the status is `done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TaskRecord")]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: Option<String>,
    status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    pub assignee_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    completed_at: Option<DateTime<Utc>>,

    // Remote linkage
    pub linear_issue_id: Option<String>,
    pub linear_issue_key: Option<String>,
    pub remote_project_id: Option<String>,
    pub remote_state_id: Option<String>,

    #[serde(flatten)]
    pub sync: SyncState,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// A fresh, never-synced local task in `backlog`
    pub fn new(project_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            project_id: project_id.into(),
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: Priority::default(),
            assignee_id: None,
            due_date: None,
            completed_at: None,
            linear_issue_id: None,
            linear_issue_key: None,
            remote_project_id: None,
            remote_state_id: None,
            sync: SyncState::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Change status, stamping or clearing `completed_at` to match.
    /// Re-entering `done` keeps the original completion time.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == TaskStatus::Done {
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        } else {
            self.completed_at = None;
        }
    }

    /// Rebuild status fields from storage, repairing rows that break the
    /// done/completed_at pairing.
    pub fn restore_status(&mut self, status: TaskStatus, completed_at: Option<DateTime<Utc>>) {
        self.status = status;
        self.completed_at = match status {
            TaskStatus::Done => Some(completed_at.unwrap_or(self.updated_at)),
            _ => None,
        };
    }
}

/// Unchecked wire/storage form of [`Task`]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: String,
    project_id: String,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    #[serde(default)]
    priority: Priority,
    assignee_id: Option<String>,
    due_date: Option<NaiveDate>,
    completed_at: Option<DateTime<Utc>>,
    linear_issue_id: Option<String>,
    linear_issue_key: Option<String>,
    remote_project_id: Option<String>,
    remote_state_id: Option<String>,
    #[serde(flatten)]
    sync: SyncState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let mut task = Task {
            id: record.id,
            project_id: record.project_id,
            title: record.title,
            description: record.description,
            status: record.status,
            priority: record.priority,
            assignee_id: record.assignee_id,
            due_date: record.due_date,
            completed_at: None,
            linear_issue_id: record.linear_issue_id,
            linear_issue_key: record.linear_issue_key,
            remote_project_id: record.remote_project_id,
            remote_state_id: record.remote_state_id,
            sync: record.sync,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        task.restore_status(record.status, record.completed_at);
        task
    }
}

/// Local personnel record, used to resolve remote assignees by email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personnel {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl Personnel {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// How the workspace token is presented to the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    ApiKey,
    OAuth,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::ApiKey => "api_key",
            TokenKind::OAuth => "oauth",
        }
    }
}

impl FromStr for TokenKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api_key" => Ok(TokenKind::ApiKey),
            "oauth" => Ok(TokenKind::OAuth),
            other => Err(UnknownVariant::new("token kind", other)),
        }
    }
}

/// An authenticated connection to a remote tracker workspace
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConnection {
    pub id: String,
    pub name: String,
    pub access_token: String,
    pub token_kind: TokenKind,
    /// Overrides the default API base URL when set
    pub api_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl WorkspaceConnection {
    pub fn new(name: impl Into<String>, access_token: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            access_token: access_token.into(),
            token_kind: kind,
            api_url: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Token with everything but the last four characters hidden
    pub fn masked_token(&self) -> String {
        let chars: Vec<char> = self.access_token.chars().collect();
        if chars.len() <= 4 {
            return "****".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{}", tail)
    }
}

impl fmt::Debug for WorkspaceConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkspaceConnection")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("access_token", &self.masked_token())
            .field("token_kind", &self.token_kind)
            .field("api_url", &self.api_url)
            .field("is_active", &self.is_active)
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync_state::SyncStatus;
    use chrono::Duration;

    #[test]
    fn test_new_project_defaults() {
        let project = Project::new("Hiring pipeline");
        assert_eq!(project.status, ProjectStatus::Planning);
        assert_eq!(project.priority, Priority::Medium);
        assert_eq!(project.sync.status(), SyncStatus::NotSynced);
        assert!(!project.is_linked());
        assert!(!project.sync_enabled);
    }

    #[test]
    fn test_set_progress_clamps() {
        let mut project = Project::new("Clamp");
        project.set_progress(250);
        assert_eq!(project.progress, 100);
    }

    #[test]
    fn test_task_done_sets_completed_at() {
        let mut task = Task::new("p1", "Write offer letter");
        let now = Utc::now();
        task.set_status(TaskStatus::Done, now);
        assert_eq!(task.completed_at(), Some(now));

        // Staying in done keeps the first stamp
        task.set_status(TaskStatus::Done, now + Duration::minutes(5));
        assert_eq!(task.completed_at(), Some(now));

        task.set_status(TaskStatus::InReview, now);
        assert!(task.completed_at().is_none());
    }

    #[test]
    fn test_restore_status_repairs_pairing() {
        let mut task = Task::new("p1", "Restore");
        task.restore_status(TaskStatus::Done, None);
        assert_eq!(task.completed_at(), Some(task.updated_at));

        task.restore_status(TaskStatus::Todo, Some(Utc::now()));
        assert!(task.completed_at().is_none());
    }

    #[test]
    fn test_enum_string_round_trips() {
        for status in ProjectStatus::ALL {
            assert_eq!(status.as_str().parse::<ProjectStatus>().unwrap(), status);
        }
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        for priority in Priority::ALL {
            assert_eq!(priority.as_str().parse::<Priority>().unwrap(), priority);
        }
        assert!("in-progress".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_workspace_debug_masks_token() {
        let ws = WorkspaceConnection::new("Acme", "lin_api_supersecret1234", TokenKind::ApiKey);
        let debug = format!("{:?}", ws);
        assert!(!debug.contains("supersecret"));
        assert!(debug.contains("****1234"));
    }

    #[test]
    fn test_project_serializes_sync_fields_flat() {
        let project = Project::new("Serde");
        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(value["syncStatus"], "not_synced");
        assert!(value.get("remoteProjectId").is_some());
    }

    #[test]
    fn test_task_deserialize_repairs_completed_at() {
        let task = Task::new("p1", "Serde");
        let mut value = serde_json::to_value(&task).unwrap();

        value["status"] = serde_json::json!("done");
        value["completedAt"] = serde_json::Value::Null;
        let done: Task = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(done.status(), TaskStatus::Done);
        assert_eq!(done.completed_at(), Some(task.updated_at));

        value["status"] = serde_json::json!("todo");
        value["completedAt"] = serde_json::json!("2024-05-01T12:00:00Z");
        let todo: Task = serde_json::from_value(value).unwrap();
        assert_eq!(todo.status(), TaskStatus::Todo);
        assert!(todo.completed_at().is_none());
    }
}
