// ABOUTME: Pure conversions between local entities and remote inputs/snapshots
// ABOUTME: All vocabulary changes go through the core translation tables

use chrono::{DateTime, Utc};

use tracksync_core::translate::{
    priority_from_remote, priority_to_remote, progress_from_remote, project_status_from_remote,
    project_status_to_remote, task_status_from_state, task_status_to_remote,
};
use tracksync_core::{Project, Task, TaskStatus};
use tracksync_linear::{
    IssueInput, IssuePatch, IssueSnapshot, ProjectInput, ProjectPatch, ProjectSnapshot,
};

pub fn project_input(project: &Project, team_id: &str) -> ProjectInput {
    ProjectInput {
        name: project.name.clone(),
        description: project.description.clone(),
        state: project_status_to_remote(project.status).to_string(),
        team_ids: vec![team_id.to_string()],
        start_date: project.start_date,
        target_date: project.end_date,
    }
}

/// Every locally owned field, for a full-state push
pub fn project_patch(project: &Project) -> ProjectPatch {
    ProjectPatch {
        name: Some(project.name.clone()),
        description: project.description.clone(),
        state: Some(project_status_to_remote(project.status).to_string()),
        start_date: project.start_date,
        target_date: project.end_date,
    }
}

/// Remote wins for fields the snapshot supplies; local wins for the rest
pub fn apply_project_snapshot(
    project: &mut Project,
    snapshot: &ProjectSnapshot,
    now: DateTime<Utc>,
) {
    project.name = snapshot.name.clone();
    project.status = project_status_from_remote(&snapshot.state);
    project.set_progress(progress_from_remote(snapshot.progress));

    if let Some(description) = &snapshot.description {
        project.description = Some(description.clone());
    }
    if let Some(start) = snapshot.start_date {
        project.start_date = Some(start);
    }
    if let Some(end) = snapshot.target_date {
        project.end_date = Some(end);
    }
    // A one-sided remote range drops the local date it contradicts
    if let (Some(start), Some(end)) = (project.start_date, project.end_date) {
        if end < start {
            match (snapshot.start_date, snapshot.target_date) {
                (None, Some(_)) => project.start_date = None,
                (Some(_), None) => project.end_date = None,
                _ => {}
            }
        }
    }
    if project.remote_team_id.is_none() {
        project.remote_team_id = snapshot.team_ids.first().cloned();
    }

    project.sync.mark_synced(now);
    project.updated_at = now;
}

pub fn issue_input(
    task: &Task,
    team_id: &str,
    remote_project_id: &str,
    assignee_email: Option<String>,
) -> IssueInput {
    IssueInput {
        team_id: team_id.to_string(),
        title: task.title.clone(),
        description: task.description.clone(),
        priority: priority_to_remote(task.priority),
        project_id: Some(remote_project_id.to_string()),
        state_name: Some(task_status_to_remote(task.status()).to_string()),
        assignee_email,
        due_date: task.due_date,
    }
}

pub fn issue_patch(task: &Task, team_id: &str, assignee_email: Option<String>) -> IssuePatch {
    IssuePatch {
        team_id: Some(team_id.to_string()),
        title: Some(task.title.clone()),
        description: Some(task.description.clone()),
        priority: Some(priority_to_remote(task.priority)),
        state_name: Some(task_status_to_remote(task.status()).to_string()),
        assignee_email: Some(assignee_email),
        due_date: Some(task.due_date),
    }
}

/// Overwrite a task from its remote issue. `assignee_id` is the already
/// resolved local personnel id; `None` leaves the task unassigned.
pub fn apply_issue_snapshot(
    task: &mut Task,
    issue: &IssueSnapshot,
    remote_project_id: &str,
    assignee_id: Option<String>,
    now: DateTime<Utc>,
) {
    task.title = issue.title.clone();
    if let Some(description) = &issue.description {
        task.description = Some(description.clone());
    }
    if let Some(due) = issue.due_date {
        task.due_date = Some(due);
    }

    let status = task_status_from_state(&issue.state.name, Some(issue.state.kind.as_str()));
    let completed_at = match status {
        TaskStatus::Done => issue.completed_at.unwrap_or(now),
        _ => now,
    };
    task.set_status(status, completed_at);
    task.priority = priority_from_remote(issue.priority);
    task.assignee_id = assignee_id;

    task.linear_issue_id = Some(issue.id.clone());
    task.linear_issue_key = Some(issue.identifier.clone());
    task.remote_state_id = Some(issue.state.id.clone());
    task.remote_project_id = Some(
        issue
            .project_id
            .clone()
            .unwrap_or_else(|| remote_project_id.to_string()),
    );

    task.sync.mark_synced(now);
    task.updated_at = now;
}

/// A new local task materialized from a remote issue, already synced
pub fn task_from_issue(
    project: &Project,
    remote_project_id: &str,
    issue: &IssueSnapshot,
    assignee_id: Option<String>,
    now: DateTime<Utc>,
) -> Task {
    let mut task = Task::new(project.id.clone(), issue.title.clone());
    task.created_at = now;
    apply_issue_snapshot(&mut task, issue, remote_project_id, assignee_id, now);
    task
}
