// ABOUTME: HTTP-level tests for the Linear client against a wiremock server
// ABOUTME: Covers auth headers, status mapping, GraphQL errors, pagination, and name resolution

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tracksync_core::TokenKind;
use tracksync_linear::{
    ClientConfig, IssueInput, IssuePatch, LinearClient, ProjectInput, RemoteError, RemoteTracker,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, kind: TokenKind) -> LinearClient {
    let config = ClientConfig {
        api_url: server.uri(),
        ..ClientConfig::default()
    };
    LinearClient::new("lin_test_key", kind, config).unwrap()
}

fn project_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Q3 hiring",
        "description": "Fill five roles",
        "state": "started",
        "progress": 0.25,
        "startDate": "2024-07-01",
        "targetDate": "2024-09-30",
        "url": "https://linear.app/acme/project/q3-hiring",
        "updatedAt": "2024-07-02T09:00:00.000Z",
        "teams": {"nodes": [{"id": "team-1"}]}
    })
}

fn issue_json(id: &str, key: &str, title: &str) -> Value {
    json!({
        "id": id,
        "identifier": key,
        "title": title,
        "description": null,
        "priority": 1,
        "dueDate": null,
        "completedAt": null,
        "updatedAt": "2024-07-02T09:00:00.000Z",
        "state": {"id": "state-done", "name": "Done", "type": "completed"},
        "assignee": {"id": "user-1", "name": "Ada", "email": "ada@example.com"},
        "project": {"id": "proj-123"},
        "team": {"id": "team-1"}
    })
}

#[tokio::test]
async fn test_api_key_sent_without_bearer_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("Authorization", "lin_test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"teams": {"nodes": [{"id": "team-1", "key": "ENG", "name": "Engineering"}]}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let teams = client_for(&server, TokenKind::ApiKey)
        .get_teams()
        .await
        .unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].key, "ENG");
}

#[tokio::test]
async fn test_oauth_token_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("Authorization", "Bearer lin_test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"teams": {"nodes": []}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let teams = client_for(&server, TokenKind::OAuth)
        .get_teams()
        .await
        .unwrap();
    assert!(teams.is_empty());
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = client_for(&server, TokenKind::ApiKey)
        .get_teams()
        .await
        .unwrap_err();
    assert_eq!(err, RemoteError::Authentication("invalid api key".into()));
}

#[tokio::test]
async fn test_too_many_requests_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = client_for(&server, TokenKind::ApiKey)
        .get_project("proj-123")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::RateLimited(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_server_error_maps_to_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client_for(&server, TokenKind::ApiKey)
        .get_project("proj-123")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RemoteError::Http {
            status: 503,
            message: "maintenance".into()
        }
    );
}

#[tokio::test]
async fn test_graphql_errors_map_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{"message": "Argument Validation Error", "extensions": {"code": "INVALID_INPUT"}}]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server, TokenKind::ApiKey)
        .get_project("proj-123")
        .await
        .unwrap_err();
    assert_eq!(err, RemoteError::Api("Argument Validation Error".into()));
}

#[tokio::test]
async fn test_get_project_decodes_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("query Project("))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"project": project_json("proj-123")}
        })))
        .mount(&server)
        .await;

    let project = client_for(&server, TokenKind::ApiKey)
        .get_project("proj-123")
        .await
        .unwrap();
    assert_eq!(project.id, "proj-123");
    assert_eq!(project.state, "started");
    assert_eq!(project.progress, 0.25);
    assert_eq!(project.team_ids, vec!["team-1".to_string()]);
    assert_eq!(project.target_date.map(|d| d.to_string()), Some("2024-09-30".into()));
}

#[tokio::test]
async fn test_missing_project_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"project": null}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server, TokenKind::ApiKey)
        .get_project("proj-missing")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::NotFound(_)));
}

#[tokio::test]
async fn test_partial_snapshot_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"project": {"id": "proj-123", "name": "No state"}}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server, TokenKind::ApiKey)
        .get_project("proj-123")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_create_project_sends_input_and_reads_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("projectCreate"))
        .and(body_string_contains("\"teamIds\":[\"team-1\"]"))
        .and(body_string_contains("\"state\":\"planned\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"projectCreate": {"success": true, "project": project_json("proj-123")}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let input = ProjectInput {
        name: "Q3 hiring".into(),
        description: None,
        state: "planned".into(),
        team_ids: vec!["team-1".into()],
        start_date: None,
        target_date: None,
    };
    let created = client_for(&server, TokenKind::ApiKey)
        .create_project(&input)
        .await
        .unwrap();
    assert_eq!(created.id, "proj-123");
}

#[tokio::test]
async fn test_unsuccessful_mutation_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"projectUpdate": {"success": false, "project": null}}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server, TokenKind::ApiKey)
        .update_project("proj-123", &Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Rejected(_)));
}

#[tokio::test]
async fn test_project_issues_follow_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("\"after\":null"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"project": {"issues": {
                "nodes": [issue_json("iss-1", "ENG-1", "Fix bug"), issue_json("iss-2", "ENG-2", "Add tests")],
                "pageInfo": {"hasNextPage": true, "endCursor": "cursor-1"}
            }}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("\"after\":\"cursor-1\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"project": {"issues": {
                "nodes": [issue_json("iss-3", "ENG-3", "Ship it")],
                "pageInfo": {"hasNextPage": false, "endCursor": null}
            }}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let issues = client_for(&server, TokenKind::ApiKey)
        .get_project_issues("proj-123")
        .await
        .unwrap();
    let ids: Vec<&str> = issues.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["iss-1", "iss-2", "iss-3"]);
    assert_eq!(issues[0].assignee_email(), Some("ada@example.com"));
    assert_eq!(issues[0].state.kind, "completed");
}

#[tokio::test]
async fn test_create_issue_resolves_state_and_assignee() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("TeamStates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"team": {"states": {"nodes": [
                {"id": "state-todo", "name": "Todo", "type": "unstarted"},
                {"id": "state-progress", "name": "In Progress", "type": "started"}
            ]}}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("UserByEmail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"users": {"nodes": [{"id": "user-1", "name": "Ada", "email": "ada@example.com"}]}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("issueCreate"))
        .and(body_string_contains("\"stateId\":\"state-progress\""))
        .and(body_string_contains("\"assigneeId\":\"user-1\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"issueCreate": {"success": true, "issue": issue_json("iss-9", "ENG-9", "Wire up CI")}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let input = IssueInput {
        team_id: "team-1".into(),
        title: "Wire up CI".into(),
        description: None,
        priority: 2,
        project_id: Some("proj-123".into()),
        state_name: Some("in progress".into()),
        assignee_email: Some("ADA@example.com".into()),
        due_date: None,
    };
    let issue = client_for(&server, TokenKind::ApiKey)
        .create_issue(&input)
        .await
        .unwrap();
    assert_eq!(issue.identifier, "ENG-9");
}

#[tokio::test]
async fn test_unresolved_names_are_omitted_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("TeamStates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"team": {"states": {"nodes": [
                {"id": "state-todo", "name": "Todo", "type": "unstarted"}
            ]}}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("UserByEmail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"users": {"nodes": []}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("issueUpdate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"issueUpdate": {"success": true, "issue": issue_json("iss-1", "ENG-1", "Fix bug")}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let patch = IssuePatch {
        team_id: Some("team-1".into()),
        state_name: Some("Blocked by legal".into()),
        assignee_email: Some(Some("ghost@example.com".into())),
        ..IssuePatch::default()
    };
    let issue = client_for(&server, TokenKind::ApiKey)
        .update_issue("iss-1", &patch)
        .await
        .unwrap();
    assert_eq!(issue.id, "iss-1");

    let requests = server.received_requests().await.unwrap_or_default();
    let update_body = requests
        .iter()
        .map(|r| String::from_utf8_lossy(&r.body).to_string())
        .find(|b| b.contains("issueUpdate"))
        .unwrap();
    assert!(!update_body.contains("stateId"));
    assert!(!update_body.contains("assigneeId"));
}

#[tokio::test]
async fn test_update_issue_sends_null_for_cleared_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("issueUpdate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"issueUpdate": {"success": true, "issue": issue_json("iss-1", "ENG-1", "Fix bug")}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let patch = IssuePatch {
        title: Some("Fix bug".into()),
        description: Some(None),
        assignee_email: Some(None),
        due_date: Some(None),
        ..IssuePatch::default()
    };
    client_for(&server, TokenKind::ApiKey)
        .update_issue("iss-1", &patch)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let input = &body["variables"]["input"];
    assert_eq!(input["title"], json!("Fix bug"));
    assert_eq!(input.get("description"), Some(&Value::Null));
    assert_eq!(input.get("assigneeId"), Some(&Value::Null));
    assert_eq!(input.get("dueDate"), Some(&Value::Null));
    assert!(input.get("priority").is_none());
    assert!(input.get("stateId").is_none());
}

#[tokio::test]
async fn test_request_timeout_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_millis(500))
                .set_body_json(json!({"data": {"teams": {"nodes": []}}})),
        )
        .mount(&server)
        .await;

    let config = ClientConfig {
        api_url: server.uri(),
        request_timeout: std::time::Duration::from_millis(50),
        ..ClientConfig::default()
    };
    let client = LinearClient::new("lin_test_key", TokenKind::ApiKey, config).unwrap();
    let err = client.get_teams().await.unwrap_err();
    assert!(matches!(err, RemoteError::Timeout(_)), "got {:?}", err);
    assert!(err.is_retryable());
}
