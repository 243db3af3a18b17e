// ABOUTME: Remote tracker capability interface and its Linear GraphQL implementation
// ABOUTME: Decodes remote payloads into typed, versioned snapshots at the boundary

pub mod client;
pub mod error;
pub mod provider;
mod queries;
pub mod tracker;
pub mod types;
mod wire;

pub use client::{ClientConfig, LinearClient, DEFAULT_API_URL, ISSUE_PAGE_SIZE};
pub use error::{RemoteError, RemoteResult};
pub use provider::{StaticTracker, TrackerProvider, WorkspaceTrackerProvider};
pub use tracker::RemoteTracker;
pub use types::{
    IssueInput, IssuePatch, IssueSnapshot, ProjectInput, ProjectPatch, ProjectSnapshot,
    RemoteUser, Team, WorkflowState, SNAPSHOT_SCHEMA_VERSION,
};
