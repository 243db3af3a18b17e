// ABOUTME: Sync orchestrator driving create, push, pull, and issue reconciliation
// ABOUTME: Remote failures are recorded on the entity as sync_failed, never propagated raw

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use tracksync_core::{Project, Task};
use tracksync_linear::{
    IssueSnapshot, ProjectSnapshot, RemoteError, RemoteResult, RemoteTracker, Team,
    TrackerProvider,
};
use tracksync_storage::SyncRepository;

use crate::error::{SyncError, SyncResult};
use crate::mapping;
use crate::report::{IssueFailure, IssueSyncReport, ProjectSyncOverview, TaskSyncCounts};

enum IssueOutcome {
    Created(String),
    Updated(String),
}

/// Coordinates the local repository and the remote tracker.
///
/// Every operation is keyed by one project or task id and is a full-state
/// overwrite, so repeating it after a timeout is safe. Callers must not run
/// two operations on the same entity at once.
pub struct SyncOrchestrator {
    repository: Arc<dyn SyncRepository>,
    provider: Arc<dyn TrackerProvider>,
}

impl SyncOrchestrator {
    pub fn new(repository: Arc<dyn SyncRepository>, provider: Arc<dyn TrackerProvider>) -> Self {
        Self {
            repository,
            provider,
        }
    }

    /// Create the project remotely under `team_id` and link it
    pub async fn create_remote_project(
        &self,
        project_id: &str,
        team_id: &str,
    ) -> SyncResult<Project> {
        let mut project = self.load_project(project_id).await?;
        if let Some(remote_id) = &project.remote_project_id {
            return Err(SyncError::AlreadyLinked(format!(
                "project {} is linked to {}",
                project.id, remote_id
            )));
        }

        info!("Creating remote project for '{}' ({})", project.name, project.id);
        let input = mapping::project_input(&project, team_id);

        let tracker = match self.provider.tracker().await {
            Ok(tracker) => tracker,
            Err(err) => return self.fail_project(project, err).await,
        };
        let snapshot = match tracker.create_project(&input).await {
            Ok(snapshot) => snapshot,
            Err(err) => return self.fail_project(project, err).await,
        };

        let now = Utc::now();
        project.remote_project_id = Some(snapshot.id.clone());
        project.remote_team_id = Some(team_id.to_string());
        project.sync_enabled = true;
        project.sync.mark_synced(now);
        project.updated_at = now;
        self.repository.save_project(&project).await?;

        info!("Linked project {} to remote project {}", project.id, snapshot.id);
        Ok(project)
    }

    /// Overwrite the remote project with every locally owned field
    pub async fn push_project_to_remote(&self, project_id: &str) -> SyncResult<Project> {
        let mut project = self.load_project(project_id).await?;
        let remote_id = linked_project_id(&project)?;

        info!("Pushing project {} to remote project {}", project.id, remote_id);
        let patch = mapping::project_patch(&project);

        let tracker = match self.provider.tracker().await {
            Ok(tracker) => tracker,
            Err(err) => return self.fail_project(project, err).await,
        };
        if let Err(err) = tracker.update_project(&remote_id, &patch).await {
            return self.fail_project(project, err).await;
        }

        let now = Utc::now();
        project.sync.mark_synced(now);
        project.updated_at = now;
        self.repository.save_project(&project).await?;

        info!("Pushed project {}", project.id);
        Ok(project)
    }

    /// Overwrite the local project linked to `remote_project_id`
    pub async fn pull_project_from_remote(&self, remote_project_id: &str) -> SyncResult<Project> {
        let mut project = self
            .repository
            .find_project_by_remote_id(remote_project_id)
            .await?
            .ok_or_else(|| {
                SyncError::NotFound(format!(
                    "no local project linked to remote project {}",
                    remote_project_id
                ))
            })?;

        info!("Pulling remote project {} into {}", remote_project_id, project.id);

        let tracker = match self.provider.tracker().await {
            Ok(tracker) => tracker,
            Err(err) => return self.fail_project(project, err).await,
        };
        let snapshot = match tracker.get_project(remote_project_id).await {
            Ok(snapshot) => snapshot,
            Err(err) => return self.fail_project(project, err).await,
        };

        let before = project.clone();
        mapping::apply_project_snapshot(&mut project, &snapshot, Utc::now());
        if let Err(err) = self.repository.save_project(&project).await {
            return self.record_project_failure(before, err.to_string()).await;
        }

        info!("Pulled project {}", project.id);
        Ok(project)
    }

    /// Reconcile local tasks with every issue of the linked remote project.
    ///
    /// One failing issue does not stop the others. Local tasks whose issue is
    /// missing from the remote list are reported as orphaned and left alone.
    pub async fn sync_project_issues(&self, project_id: &str) -> SyncResult<IssueSyncReport> {
        let mut project = self.load_project(project_id).await?;
        let remote_id = linked_project_id(&project)?;

        info!("Syncing issues of remote project {} into {}", remote_id, project.id);

        let tracker = match self.provider.tracker().await {
            Ok(tracker) => tracker,
            Err(err) => return self.fail_project(project, err).await,
        };
        let issues = match tracker.get_project_issues(&remote_id).await {
            Ok(issues) => issues,
            Err(err) => return self.fail_project(project, err).await,
        };

        let mut report = IssueSyncReport::new(&project.id);
        let mut seen = HashSet::with_capacity(issues.len());

        for issue in &issues {
            seen.insert(issue.id.as_str());
            match self.reconcile_issue(&project, &remote_id, issue).await {
                Ok(IssueOutcome::Created(task_id)) => report.created.push(task_id),
                Ok(IssueOutcome::Updated(task_id)) => report.updated.push(task_id),
                Err(err) => {
                    warn!(
                        "Failed to sync issue {} ({}): {}",
                        issue.identifier, issue.id, err
                    );
                    self.mark_issue_task_failed(issue, &err.to_string()).await;
                    report.failed.push(IssueFailure {
                        issue_id: issue.id.clone(),
                        identifier: issue.identifier.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        for task in self.repository.list_tasks_for_project(&project.id).await? {
            if let Some(issue_id) = &task.linear_issue_id {
                if !seen.contains(issue_id.as_str()) {
                    debug!(
                        "Task {} is linked to issue {} which is gone remotely",
                        task.id, issue_id
                    );
                    report.orphaned.push(task.id);
                }
            }
        }

        let now = Utc::now();
        project.sync.mark_synced(now);
        project.updated_at = now;
        self.repository.save_project(&project).await?;

        info!(
            "Synced issues for project {}: {} created, {} updated, {} failed, {} orphaned",
            project.id,
            report.created.len(),
            report.updated.len(),
            report.failed.len(),
            report.orphaned.len()
        );
        Ok(report)
    }

    /// Local project, best-effort remote snapshot, and task status counts.
    /// Writes nothing.
    pub async fn get_project_sync_status(
        &self,
        project_id: &str,
    ) -> SyncResult<ProjectSyncOverview> {
        let project = self.load_project(project_id).await?;
        let tasks = self.repository.list_tasks_for_project(&project.id).await?;

        let remote = match &project.remote_project_id {
            Some(remote_id) => match self.fetch_remote_project(remote_id).await {
                Ok(snapshot) => Some(snapshot),
                Err(err) => {
                    warn!("Could not fetch remote project {}: {}", remote_id, err);
                    None
                }
            },
            None => None,
        };

        Ok(ProjectSyncOverview {
            tasks: TaskSyncCounts::from_tasks(&tasks),
            project,
            remote,
        })
    }

    /// Create or update the task's remote issue
    pub async fn push_task_to_remote(&self, task_id: &str) -> SyncResult<Task> {
        let mut task = self.load_task(task_id).await?;
        let project = self.load_project(&task.project_id).await?;
        let remote_project_id = linked_project_id(&project)?;
        let team_id = project.remote_team_id.clone().ok_or_else(|| {
            SyncError::NotLinked(format!("project {} has no remote team", project.id))
        })?;

        let assignee_email = match &task.assignee_id {
            Some(id) => self
                .repository
                .find_personnel_by_id(id)
                .await?
                .map(|p| p.email),
            None => None,
        };

        let tracker = match self.provider.tracker().await {
            Ok(tracker) => tracker,
            Err(err) => return self.fail_task(task, err).await,
        };

        let result = match task.linear_issue_id.clone() {
            Some(issue_id) => {
                info!("Updating issue {} from task {}", issue_id, task.id);
                let patch = mapping::issue_patch(&task, &team_id, assignee_email);
                tracker.update_issue(&issue_id, &patch).await
            }
            None => {
                info!("Creating issue for task {} in {}", task.id, remote_project_id);
                let input =
                    mapping::issue_input(&task, &team_id, &remote_project_id, assignee_email);
                tracker.create_issue(&input).await
            }
        };
        let issue = match result {
            Ok(issue) => issue,
            Err(err) => return self.fail_task(task, err).await,
        };

        let now = Utc::now();
        task.linear_issue_id = Some(issue.id);
        task.linear_issue_key = Some(issue.identifier);
        task.remote_state_id = Some(issue.state.id);
        task.remote_project_id = Some(remote_project_id);
        task.sync.mark_synced(now);
        task.updated_at = now;
        self.repository.save_task(&task).await?;

        info!("Pushed task {}", task.id);
        Ok(task)
    }

    /// Overwrite the local task linked to `issue_id`
    pub async fn pull_task_from_remote(&self, issue_id: &str) -> SyncResult<Task> {
        let task = self
            .repository
            .find_task_by_remote_issue_id(issue_id)
            .await?
            .ok_or_else(|| {
                SyncError::NotFound(format!("no local task linked to issue {}", issue_id))
            })?;
        let project = self.load_project(&task.project_id).await?;
        let remote_project_id = linked_project_id(&project)?;

        let tracker = match self.provider.tracker().await {
            Ok(tracker) => tracker,
            Err(err) => return self.fail_task(task, err).await,
        };
        let issue = match tracker.get_issue(issue_id).await {
            Ok(issue) => issue,
            Err(err) => return self.fail_task(task, err).await,
        };

        let mut task = task;
        let assignee_id = self.resolve_assignee(&issue).await?;
        mapping::apply_issue_snapshot(
            &mut task,
            &issue,
            &remote_project_id,
            assignee_id,
            Utc::now(),
        );
        self.repository.save_task(&task).await?;

        info!("Pulled issue {} into task {}", issue.identifier, task.id);
        Ok(task)
    }

    /// Mark a project as queued for sync
    pub async fn queue_project_sync(&self, project_id: &str) -> SyncResult<Project> {
        let mut project = self.load_project(project_id).await?;
        project.sync.mark_pending();
        self.repository.save_project(&project).await?;
        debug!("Queued project {} for sync", project.id);
        Ok(project)
    }

    /// Mark a task as queued for sync
    pub async fn queue_task_sync(&self, task_id: &str) -> SyncResult<Task> {
        let mut task = self.load_task(task_id).await?;
        task.sync.mark_pending();
        self.repository.save_task(&task).await?;
        debug!("Queued task {} for sync", task.id);
        Ok(task)
    }

    /// Teams of the connected workspace
    pub async fn list_teams(&self) -> SyncResult<Vec<Team>> {
        let result = match self.provider.tracker().await {
            Ok(tracker) => tracker.get_teams().await,
            Err(err) => Err(err),
        };
        result.map_err(|err| SyncError::remote("teams", err.to_string()))
    }

    async fn load_project(&self, project_id: &str) -> SyncResult<Project> {
        self.repository
            .find_project_by_id(project_id)
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("project {}", project_id)))
    }

    async fn load_task(&self, task_id: &str) -> SyncResult<Task> {
        self.repository
            .find_task_by_id(task_id)
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("task {}", task_id)))
    }

    async fn fetch_remote_project(&self, remote_id: &str) -> RemoteResult<ProjectSnapshot> {
        let tracker: Arc<dyn RemoteTracker> = self.provider.tracker().await?;
        tracker.get_project(remote_id).await
    }

    async fn resolve_assignee(&self, issue: &IssueSnapshot) -> SyncResult<Option<String>> {
        let Some(email) = issue.assignee_email() else {
            return Ok(None);
        };
        let found = self.repository.find_personnel_by_email(email).await?;
        if found.is_none() {
            debug!(
                "No local personnel with email {}, leaving {} unassigned",
                email, issue.identifier
            );
        }
        Ok(found.map(|p| p.id))
    }

    async fn reconcile_issue(
        &self,
        project: &Project,
        remote_project_id: &str,
        issue: &IssueSnapshot,
    ) -> SyncResult<IssueOutcome> {
        let assignee_id = self.resolve_assignee(issue).await?;
        let now = Utc::now();

        match self.repository.find_task_by_remote_issue_id(&issue.id).await? {
            Some(mut task) => {
                task.project_id = project.id.clone();
                mapping::apply_issue_snapshot(
                    &mut task,
                    issue,
                    remote_project_id,
                    assignee_id,
                    now,
                );
                self.repository.save_task(&task).await?;
                Ok(IssueOutcome::Updated(task.id))
            }
            None => {
                let task =
                    mapping::task_from_issue(project, remote_project_id, issue, assignee_id, now);
                self.repository.save_task(&task).await?;
                Ok(IssueOutcome::Created(task.id))
            }
        }
    }

    /// Record a per-issue failure on the linked task, if there is one
    async fn mark_issue_task_failed(&self, issue: &IssueSnapshot, message: &str) {
        let task = match self.repository.find_task_by_remote_issue_id(&issue.id).await {
            Ok(Some(task)) => task,
            Ok(None) => return,
            Err(err) => {
                error!("Failed to load task for issue {}: {}", issue.id, err);
                return;
            }
        };

        let mut task = task;
        task.sync.mark_failed(message);
        if let Err(err) = self.repository.save_task(&task).await {
            error!("Failed to record sync failure on task {}: {}", task.id, err);
        }
    }

    async fn fail_project<T>(&self, project: Project, err: RemoteError) -> SyncResult<T> {
        self.record_project_failure(project, err.to_string()).await
    }

    /// Save `project` as it was before the attempt, marked `sync_failed`
    async fn record_project_failure<T>(
        &self,
        mut project: Project,
        message: String,
    ) -> SyncResult<T> {
        warn!("Remote sync of project {} failed: {}", project.id, message);
        project.sync.mark_failed(&message);
        self.repository.save_project(&project).await?;
        Err(SyncError::remote(format!("project {}", project.id), message))
    }

    async fn fail_task<T>(&self, mut task: Task, err: RemoteError) -> SyncResult<T> {
        warn!("Remote sync of task {} failed: {}", task.id, err);
        task.sync.mark_failed(err.to_string());
        self.repository.save_task(&task).await?;
        Err(SyncError::remote(format!("task {}", task.id), err.to_string()))
    }
}

fn linked_project_id(project: &Project) -> SyncResult<String> {
    project
        .remote_project_id
        .clone()
        .ok_or_else(|| SyncError::NotLinked(format!("project {}", project.id)))
}
