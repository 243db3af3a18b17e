// ABOUTME: reqwest-based Linear GraphQL client implementing RemoteTracker
// ABOUTME: Owns auth headers, timeouts, status mapping, and pagination

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use tracksync_core::{TokenKind, WorkspaceConnection};

use crate::error::{RemoteError, RemoteResult};
use crate::queries;
use crate::tracker::RemoteTracker;
use crate::types::{
    IssueInput, IssuePatch, IssueSnapshot, ProjectInput, ProjectPatch, ProjectSnapshot, Team,
    WorkflowState,
};
use crate::wire::{
    classify_errors, Connection, ErrorEnvelope, GraphQlResponse, MutationPayload, WireIssue,
    WireIssueInput, WireIssueUpdate, WireProject, WireState, WireTeam, WireUser,
};

pub const DEFAULT_API_URL: &str = "https://api.linear.app";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Issues fetched per page when listing a project's issues
pub const ISSUE_PAGE_SIZE: u32 = 50;

/// HTTP settings for [`LinearClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct TeamsData {
    teams: Connection<WireTeam>,
}

#[derive(Deserialize)]
struct ProjectData {
    project: Option<WireProject>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectCreateData {
    project_create: MutationPayload<WireProject>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectUpdateData {
    project_update: MutationPayload<WireProject>,
}

#[derive(Deserialize)]
struct ProjectIssuesData {
    project: Option<ProjectIssuesNode>,
}

#[derive(Deserialize)]
struct ProjectIssuesNode {
    issues: Connection<WireIssue>,
}

#[derive(Deserialize)]
struct IssueData {
    issue: Option<WireIssue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueCreateData {
    issue_create: MutationPayload<WireIssue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueUpdateData {
    issue_update: MutationPayload<WireIssue>,
}

#[derive(Deserialize)]
struct TeamStatesData {
    team: Option<TeamStatesNode>,
}

#[derive(Deserialize)]
struct TeamStatesNode {
    states: Connection<WireState>,
}

#[derive(Deserialize)]
struct UsersData {
    users: Connection<WireUser>,
}

/// Linear API client bound to one workspace credential
#[derive(Clone)]
pub struct LinearClient {
    http_client: Client,
    endpoint: String,
    auth_header: String,
}

impl std::fmt::Debug for LinearClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl LinearClient {
    /// Create a client for `token`. API keys are sent as-is, OAuth tokens as
    /// bearer tokens.
    pub fn new(token: &str, kind: TokenKind, config: ClientConfig) -> RemoteResult<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(RemoteError::config("Linear access token is empty"));
        }

        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("tracksync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::config(e.to_string()))?;

        let auth_header = match kind {
            TokenKind::ApiKey => token.to_string(),
            TokenKind::OAuth => format!("Bearer {}", token),
        };

        Ok(Self {
            http_client,
            endpoint: format!("{}/graphql", config.api_url.trim_end_matches('/')),
            auth_header,
        })
    }

    /// Create a client from a stored workspace connection. The connection's
    /// `api_url` overrides the configured one.
    pub fn from_workspace(
        workspace: &WorkspaceConnection,
        mut config: ClientConfig,
    ) -> RemoteResult<Self> {
        if let Some(api_url) = workspace.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
            config.api_url = api_url.to_string();
        }
        Self::new(&workspace.access_token, workspace.token_kind, config)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> RemoteResult<T> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Authorization", &self.auth_header)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(RemoteError::Authentication(error_text(status, &body)));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(RemoteError::RateLimited(error_text(status, &body)));
            }
            _ => {}
        }

        // Linear reports GraphQL failures with a JSON body, sometimes on 400
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            if !envelope.errors.is_empty() {
                let err = classify_errors(&envelope.errors);
                debug!("Linear returned GraphQL errors: {}", err);
                return Err(err);
            }
        }

        if !status.is_success() {
            return Err(RemoteError::Http {
                status: status.as_u16(),
                message: error_text(status, &body),
            });
        }

        let response: GraphQlResponse<T> = serde_json::from_str(&body)?;
        response
            .data
            .ok_or_else(|| RemoteError::invalid("response has no data"))
    }

    /// All workflow states of a team
    pub async fn get_team_states(&self, team_id: &str) -> RemoteResult<Vec<WorkflowState>> {
        let data: TeamStatesData = self
            .execute(queries::TEAM_STATES, json!({ "teamId": team_id }))
            .await?;
        let team = data
            .team
            .ok_or_else(|| RemoteError::NotFound(format!("team {}", team_id)))?;
        team.states
            .nodes
            .into_iter()
            .map(WorkflowState::try_from)
            .collect()
    }

    async fn resolve_state_id(&self, team_id: &str, state_name: &str) -> RemoteResult<Option<String>> {
        let wanted = state_name.trim();
        let states = self.get_team_states(team_id).await?;
        let found = states
            .into_iter()
            .find(|s| s.name.trim().eq_ignore_ascii_case(wanted))
            .map(|s| s.id);
        if found.is_none() {
            warn!(
                "No workflow state named '{}' in team {}, leaving state unchanged",
                wanted, team_id
            );
        }
        Ok(found)
    }

    async fn resolve_user_id(&self, email: &str) -> RemoteResult<Option<String>> {
        let data: UsersData = self
            .execute(queries::USER_BY_EMAIL, json!({ "email": email.trim() }))
            .await?;
        let found = data.users.nodes.into_iter().find_map(|u| u.id);
        if found.is_none() {
            warn!("No Linear user with email '{}', leaving issue unassigned", email);
        }
        Ok(found)
    }

    async fn resolve_names(
        &self,
        team_id: Option<&str>,
        state_name: Option<&str>,
        assignee_email: Option<&str>,
    ) -> RemoteResult<(Option<String>, Option<String>)> {
        let state_id = match (team_id, state_name) {
            (Some(team), Some(name)) => self.resolve_state_id(team, name).await?,
            _ => None,
        };
        let assignee_id = match assignee_email.filter(|e| !e.trim().is_empty()) {
            Some(email) => self.resolve_user_id(email).await?,
            None => None,
        };
        Ok((state_id, assignee_id))
    }
}

fn error_text(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        tracksync_core::truncate(body, 500)
    }
}

fn accepted<W, S>(payload: MutationPayload<W>, what: &str) -> RemoteResult<S>
where
    S: TryFrom<W, Error = RemoteError>,
{
    if !payload.success {
        return Err(RemoteError::Rejected(format!("{} was not applied", what)));
    }
    let entity = payload
        .entity
        .ok_or_else(|| RemoteError::invalid(format!("{} returned no entity", what)))?;
    S::try_from(entity)
}

#[async_trait]
impl RemoteTracker for LinearClient {
    async fn get_teams(&self) -> RemoteResult<Vec<Team>> {
        let data: TeamsData = self.execute(queries::TEAMS, json!({})).await?;
        data.teams.nodes.into_iter().map(Team::try_from).collect()
    }

    async fn get_project(&self, project_id: &str) -> RemoteResult<ProjectSnapshot> {
        let data: ProjectData = self
            .execute(&queries::project(), json!({ "id": project_id }))
            .await?;
        data.project
            .ok_or_else(|| RemoteError::NotFound(format!("project {}", project_id)))?
            .try_into()
    }

    async fn create_project(&self, input: &ProjectInput) -> RemoteResult<ProjectSnapshot> {
        let data: ProjectCreateData = self
            .execute(&queries::project_create(), json!({ "input": input }))
            .await?;
        accepted(data.project_create, "projectCreate")
    }

    async fn update_project(
        &self,
        project_id: &str,
        patch: &ProjectPatch,
    ) -> RemoteResult<ProjectSnapshot> {
        let data: ProjectUpdateData = self
            .execute(
                &queries::project_update(),
                json!({ "id": project_id, "input": patch }),
            )
            .await?;
        accepted(data.project_update, "projectUpdate")
    }

    async fn get_project_issues(&self, project_id: &str) -> RemoteResult<Vec<IssueSnapshot>> {
        let query = queries::project_issues();
        let mut issues = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let data: ProjectIssuesData = self
                .execute(
                    &query,
                    json!({ "id": project_id, "first": ISSUE_PAGE_SIZE, "after": after }),
                )
                .await?;
            let connection = data
                .project
                .ok_or_else(|| RemoteError::NotFound(format!("project {}", project_id)))?
                .issues;

            for wire in connection.nodes {
                issues.push(IssueSnapshot::try_from(wire)?);
            }

            match connection.page_info {
                Some(page) if page.has_next_page => match page.end_cursor {
                    Some(cursor) => after = Some(cursor),
                    None => {
                        return Err(RemoteError::invalid(
                            "pageInfo.hasNextPage without endCursor",
                        ))
                    }
                },
                _ => break,
            }
        }

        debug!("Fetched {} issues for project {}", issues.len(), project_id);
        Ok(issues)
    }

    async fn create_issue(&self, input: &IssueInput) -> RemoteResult<IssueSnapshot> {
        let (state_id, assignee_id) = self
            .resolve_names(
                Some(&input.team_id),
                input.state_name.as_deref(),
                input.assignee_email.as_deref(),
            )
            .await?;

        let wire_input = WireIssueInput {
            team_id: Some(input.team_id.clone()),
            title: Some(input.title.clone()),
            description: input.description.clone(),
            priority: Some(input.priority),
            project_id: input.project_id.clone(),
            state_id,
            assignee_id,
            due_date: input.due_date,
        };

        let data: IssueCreateData = self
            .execute(&queries::issue_create(), json!({ "input": wire_input }))
            .await?;
        accepted(data.issue_create, "issueCreate")
    }

    async fn update_issue(&self, issue_id: &str, patch: &IssuePatch) -> RemoteResult<IssueSnapshot> {
        // State names are per team; look the team up when the caller did not say
        let team_id = match (&patch.team_id, &patch.state_name) {
            (Some(team), _) => Some(team.clone()),
            (None, Some(_)) => Some(self.get_issue(issue_id).await?.team_id),
            (None, None) => None,
        };

        let email = patch.assignee_email.as_ref().and_then(|e| e.as_deref());
        let (state_id, resolved_assignee) = self
            .resolve_names(team_id.as_deref(), patch.state_name.as_deref(), email)
            .await?;

        // An unknown email leaves the assignee alone; an explicit clear unassigns
        let assignee_id = match &patch.assignee_email {
            None => None,
            Some(None) => Some(None),
            Some(Some(_)) => resolved_assignee.map(Some),
        };

        let wire_input = WireIssueUpdate {
            title: patch.title.clone(),
            description: patch.description.clone(),
            priority: patch.priority,
            state_id,
            assignee_id,
            due_date: patch.due_date,
        };

        let data: IssueUpdateData = self
            .execute(
                &queries::issue_update(),
                json!({ "id": issue_id, "input": wire_input }),
            )
            .await?;
        accepted(data.issue_update, "issueUpdate")
    }

    async fn get_issue(&self, issue_id: &str) -> RemoteResult<IssueSnapshot> {
        let data: IssueData = self
            .execute(&queries::issue(), json!({ "id": issue_id }))
            .await?;
        data.issue
            .ok_or_else(|| RemoteError::NotFound(format!("issue {}", issue_id)))?
            .try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = ClientConfig {
            api_url: "http://localhost:9999/".into(),
            ..ClientConfig::default()
        };
        let client = LinearClient::new("key", TokenKind::ApiKey, config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9999/graphql");
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let err = LinearClient::new("  ", TokenKind::ApiKey, ClientConfig::default()).unwrap_err();
        assert!(matches!(err, RemoteError::Configuration(_)));
    }

    #[test]
    fn test_workspace_api_url_overrides_config() {
        let mut ws = WorkspaceConnection::new("Acme", "lin_oauth_x", TokenKind::OAuth);
        ws.api_url = Some("http://127.0.0.1:4000".into());
        let client = LinearClient::from_workspace(&ws, ClientConfig::default()).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:4000/graphql");
        assert_eq!(client.auth_header, "Bearer lin_oauth_x");
    }
}
