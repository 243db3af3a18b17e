// ABOUTME: Typed remote snapshots and mutation inputs for the Linear tracker
// ABOUTME: Snapshots are decoded at the client boundary and never persisted verbatim

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Bumped whenever a snapshot gains, loses, or changes the meaning of a field
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}

/// A team's workflow state. `kind` is the fixed category
/// (`backlog`, `unstarted`, `started`, `completed`, `canceled`, `triage`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub id: String,
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub schema_version: u32,
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Remote project state, e.g. `planned` or `started`
    pub state: String,
    /// Fraction of completed scope, 0.0..=1.0
    pub progress: f64,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub team_ids: Vec<String>,
    pub url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSnapshot {
    pub schema_version: u32,
    pub id: String,
    /// Human-readable key such as `ENG-42`
    pub identifier: String,
    pub title: String,
    pub description: Option<String>,
    pub state: WorkflowState,
    /// 0..=4 on the wire; absent when the tracker omits it
    pub priority: Option<i64>,
    pub assignee: Option<RemoteUser>,
    pub project_id: Option<String>,
    pub team_id: String,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl IssueSnapshot {
    pub fn assignee_email(&self) -> Option<&str> {
        self.assignee.as_ref().and_then(|a| a.email.as_deref())
    }
}

/// Fields for `projectCreate`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub state: String,
    pub team_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
}

/// Fields for `projectUpdate`; `None` leaves the remote value alone
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
}

/// Fields for `issueCreate`. State and assignee are given by name and email
/// and resolved by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueInput {
    pub team_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: u8,
    pub project_id: Option<String>,
    pub state_name: Option<String>,
    pub assignee_email: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Fields for `issueUpdate`; `None` leaves the remote value alone.
/// Clearable fields take `Some(None)` to null the remote value.
/// `team_id` only scopes state-name resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssuePatch {
    pub team_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<u8>,
    pub state_name: Option<String>,
    pub assignee_email: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDate>>,
}
