use async_trait::async_trait;

use crate::error::RemoteResult;
use crate::types::{
    IssueInput, IssuePatch, IssueSnapshot, ProjectInput, ProjectPatch, ProjectSnapshot, Team,
};

/// Capabilities of a remote issue tracker.
///
/// Each call returns a fully populated snapshot or a [`RemoteError`]. No
/// implementation touches local state.
///
/// [`RemoteError`]: crate::RemoteError
#[async_trait]
pub trait RemoteTracker: Send + Sync {
    async fn get_teams(&self) -> RemoteResult<Vec<Team>>;

    async fn get_project(&self, project_id: &str) -> RemoteResult<ProjectSnapshot>;

    async fn create_project(&self, input: &ProjectInput) -> RemoteResult<ProjectSnapshot>;

    async fn update_project(
        &self,
        project_id: &str,
        patch: &ProjectPatch,
    ) -> RemoteResult<ProjectSnapshot>;

    /// Every issue of the project, across all pages
    async fn get_project_issues(&self, project_id: &str) -> RemoteResult<Vec<IssueSnapshot>>;

    async fn create_issue(&self, input: &IssueInput) -> RemoteResult<IssueSnapshot>;

    async fn update_issue(&self, issue_id: &str, patch: &IssuePatch)
        -> RemoteResult<IssueSnapshot>;

    async fn get_issue(&self, issue_id: &str) -> RemoteResult<IssueSnapshot>;
}
