// GraphQL documents sent to the Linear API

const PROJECT_FIELDS: &str = r#"
    id
    name
    description
    state
    progress
    startDate
    targetDate
    url
    updatedAt
    teams { nodes { id } }
"#;

const ISSUE_FIELDS: &str = r#"
    id
    identifier
    title
    description
    priority
    dueDate
    completedAt
    updatedAt
    state { id name type }
    assignee { id name email }
    project { id }
    team { id }
"#;

pub(crate) const TEAMS: &str = r#"
query Teams {
    teams(first: 250) {
        nodes { id key name }
    }
}
"#;

pub(crate) fn project() -> String {
    format!(
        "query Project($id: String!) {{ project(id: $id) {{ {} }} }}",
        PROJECT_FIELDS
    )
}

pub(crate) fn project_create() -> String {
    format!(
        "mutation ProjectCreate($input: ProjectCreateInput!) {{ projectCreate(input: $input) {{ success project {{ {} }} }} }}",
        PROJECT_FIELDS
    )
}

pub(crate) fn project_update() -> String {
    format!(
        "mutation ProjectUpdate($id: String!, $input: ProjectUpdateInput!) {{ projectUpdate(id: $id, input: $input) {{ success project {{ {} }} }} }}",
        PROJECT_FIELDS
    )
}

pub(crate) fn project_issues() -> String {
    format!(
        "query ProjectIssues($id: String!, $first: Int!, $after: String) {{ project(id: $id) {{ issues(first: $first, after: $after) {{ nodes {{ {} }} pageInfo {{ hasNextPage endCursor }} }} }} }}",
        ISSUE_FIELDS
    )
}

pub(crate) fn issue() -> String {
    format!(
        "query Issue($id: String!) {{ issue(id: $id) {{ {} }} }}",
        ISSUE_FIELDS
    )
}

pub(crate) fn issue_create() -> String {
    format!(
        "mutation IssueCreate($input: IssueCreateInput!) {{ issueCreate(input: $input) {{ success issue {{ {} }} }} }}",
        ISSUE_FIELDS
    )
}

pub(crate) fn issue_update() -> String {
    format!(
        "mutation IssueUpdate($id: String!, $input: IssueUpdateInput!) {{ issueUpdate(id: $id, input: $input) {{ success issue {{ {} }} }} }}",
        ISSUE_FIELDS
    )
}

pub(crate) const TEAM_STATES: &str = r#"
query TeamStates($teamId: String!) {
    team(id: $teamId) {
        states { nodes { id name type } }
    }
}
"#;

pub(crate) const USER_BY_EMAIL: &str = r#"
query UserByEmail($email: String!) {
    users(filter: { email: { eqIgnoreCase: $email } }, first: 1) {
        nodes { id name email }
    }
}
"#;
