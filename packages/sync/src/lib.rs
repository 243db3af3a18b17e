// ABOUTME: Sync orchestrator keeping local projects and tasks consistent with Linear
// ABOUTME: Owns every write to sync status fields

pub mod error;
pub mod mapping;
pub mod orchestrator;
pub mod report;

pub use error::{SyncError, SyncResult};
pub use orchestrator::SyncOrchestrator;
pub use report::{IssueFailure, IssueSyncReport, ProjectSyncOverview, TaskSyncCounts};
