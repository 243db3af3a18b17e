// ABOUTME: Private GraphQL response shapes and their conversion into typed snapshots
// ABOUTME: Every required field is checked here so callers never see partial data

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, RemoteResult};
use crate::types::{
    IssueSnapshot, ProjectSnapshot, RemoteUser, Team, WorkflowState, SNAPSHOT_SCHEMA_VERSION,
};

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
}

/// Only the `errors` member, decodable whatever shape `data` has
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlErrorExtensions {
    pub code: Option<String>,
    #[serde(rename = "userPresentableMessage")]
    pub user_message: Option<String>,
}

impl GraphQlError {
    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref().and_then(|e| e.code.as_deref())
    }

    pub fn display_message(&self) -> &str {
        self.extensions
            .as_ref()
            .and_then(|e| e.user_message.as_deref())
            .unwrap_or(&self.message)
    }
}

/// Classify a non-empty GraphQL error list
pub(crate) fn classify_errors(errors: &[GraphQlError]) -> RemoteError {
    let message = errors
        .iter()
        .map(GraphQlError::display_message)
        .collect::<Vec<_>>()
        .join("; ");

    let has_code = |wanted: &str| errors.iter().any(|e| e.code() == Some(wanted));

    if has_code("RATELIMITED") {
        RemoteError::RateLimited(message)
    } else if has_code("AUTHENTICATION_ERROR") || has_code("FORBIDDEN") {
        RemoteError::Authentication(message)
    } else if errors
        .iter()
        .any(|e| e.message.to_lowercase().contains("not found"))
    {
        RemoteError::NotFound(message)
    } else {
        RemoteError::Api(message)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
    pub page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdOnly {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTeam {
    pub id: Option<String>,
    pub key: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireUser {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireState {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireProject {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub state: Option<String>,
    pub progress: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub teams: Option<Connection<IdOnly>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireIssue {
    pub id: Option<String>,
    pub identifier: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub state: Option<WireState>,
    pub assignee: Option<WireUser>,
    pub project: Option<IdOnly>,
    pub team: Option<IdOnly>,
}

/// Mutation payload common to every Linear `*Create`/`*Update`
#[derive(Debug, Deserialize)]
pub(crate) struct MutationPayload<T> {
    pub success: bool,
    #[serde(alias = "project", alias = "issue")]
    pub entity: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireIssueInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

/// `issueUpdate` input. An inner `None` serializes as `null` and clears
/// the remote field.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireIssueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
}

fn required<T>(value: Option<T>, entity: &str, field: &str) -> RemoteResult<T> {
    value.ok_or_else(|| {
        RemoteError::invalid(format!("{} is missing required field '{}'", entity, field))
    })
}

impl TryFrom<WireTeam> for Team {
    type Error = RemoteError;

    fn try_from(wire: WireTeam) -> RemoteResult<Self> {
        Ok(Team {
            id: required(wire.id, "team", "id")?,
            key: required(wire.key, "team", "key")?,
            name: required(wire.name, "team", "name")?,
        })
    }
}

impl TryFrom<WireUser> for RemoteUser {
    type Error = RemoteError;

    fn try_from(wire: WireUser) -> RemoteResult<Self> {
        Ok(RemoteUser {
            id: required(wire.id, "user", "id")?,
            name: wire.name.unwrap_or_default(),
            email: wire.email.filter(|e| !e.trim().is_empty()),
        })
    }
}

impl TryFrom<WireState> for WorkflowState {
    type Error = RemoteError;

    fn try_from(wire: WireState) -> RemoteResult<Self> {
        Ok(WorkflowState {
            id: required(wire.id, "workflow state", "id")?,
            name: required(wire.name, "workflow state", "name")?,
            kind: wire.kind.unwrap_or_default(),
        })
    }
}

impl TryFrom<WireProject> for ProjectSnapshot {
    type Error = RemoteError;

    fn try_from(wire: WireProject) -> RemoteResult<Self> {
        let team_ids = wire
            .teams
            .map(|c| c.nodes.into_iter().filter_map(|t| t.id).collect())
            .unwrap_or_default();

        Ok(ProjectSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            id: required(wire.id, "project", "id")?,
            name: required(wire.name, "project", "name")?,
            description: wire.description.filter(|d| !d.trim().is_empty()),
            state: required(wire.state, "project", "state")?,
            progress: wire.progress.unwrap_or(0.0),
            start_date: wire.start_date,
            target_date: wire.target_date,
            team_ids,
            url: wire.url,
            updated_at: required(wire.updated_at, "project", "updatedAt")?,
        })
    }
}

impl TryFrom<WireIssue> for IssueSnapshot {
    type Error = RemoteError;

    fn try_from(wire: WireIssue) -> RemoteResult<Self> {
        let state = required(wire.state, "issue", "state")?.try_into()?;
        let assignee = wire.assignee.map(RemoteUser::try_from).transpose()?;
        let team_id = required(wire.team.and_then(|t| t.id), "issue", "team.id")?;

        Ok(IssueSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            id: required(wire.id, "issue", "id")?,
            identifier: required(wire.identifier, "issue", "identifier")?,
            title: required(wire.title, "issue", "title")?,
            description: wire.description.filter(|d| !d.trim().is_empty()),
            state,
            priority: wire.priority,
            assignee,
            project_id: wire.project.and_then(|p| p.id),
            team_id,
            due_date: wire.due_date,
            completed_at: wire.completed_at,
            updated_at: required(wire.updated_at, "issue", "updatedAt")?,
        })
    }
}
