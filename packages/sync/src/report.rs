// ABOUTME: Serializable reports returned by sync operations
// ABOUTME: Issue reconciliation counts and project remote status

use serde::Serialize;

use tracksync_core::{Project, SyncStatus, Task};
use tracksync_linear::ProjectSnapshot;

/// Outcome of one `sync_project_issues` run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueSyncReport {
    pub project_id: String,
    /// Local ids of tasks created from remote issues
    pub created: Vec<String>,
    /// Local ids of existing tasks overwritten from remote issues
    pub updated: Vec<String>,
    pub failed: Vec<IssueFailure>,
    /// Local ids of linked tasks whose issue was absent from the remote list.
    /// They are left untouched.
    pub orphaned: Vec<String>,
}

impl IssueSyncReport {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    pub fn processed(&self) -> usize {
        self.created.len() + self.updated.len() + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueFailure {
    pub issue_id: String,
    pub identifier: String,
    pub message: String,
}

/// Task counts per sync status for one project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskSyncCounts {
    pub total: usize,
    pub synced: usize,
    pub pending: usize,
    pub failed: usize,
    pub not_synced: usize,
}

impl TaskSyncCounts {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut counts, task| {
            counts.total += 1;
            match task.sync.status() {
                SyncStatus::Synced => counts.synced += 1,
                SyncStatus::PendingSync => counts.pending += 1,
                SyncStatus::SyncFailed => counts.failed += 1,
                SyncStatus::NotSynced => counts.not_synced += 1,
            }
            counts
        })
    }
}

/// Read-only view returned by `get_project_sync_status`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSyncOverview {
    pub project: Project,
    /// Absent when the project is unlinked or the remote fetch failed
    pub remote: Option<ProjectSnapshot>,
    pub tasks: TaskSyncCounts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracksync_core::Task;

    #[test]
    fn test_counts_cover_every_status() {
        let mut synced = Task::new("p1", "a");
        synced.sync.mark_synced(chrono::Utc::now());
        let mut pending = Task::new("p1", "b");
        pending.sync.mark_pending();
        let mut failed = Task::new("p1", "c");
        failed.sync.mark_failed("boom");
        let fresh = Task::new("p1", "d");

        let counts = TaskSyncCounts::from_tasks(&[synced, pending, failed, fresh]);
        assert_eq!(
            counts,
            TaskSyncCounts {
                total: 4,
                synced: 1,
                pending: 1,
                failed: 1,
                not_synced: 1,
            }
        );
    }
}
