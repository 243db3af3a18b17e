// ABOUTME: Fixed translation tables between local and remote tracker vocabularies
// ABOUTME: Outbound is exact; inbound is case-insensitive and never fails

//! Status and priority translation.
//!
//! Outbound functions map every local value to exactly one remote value.
//! Inbound functions accept free text from the remote tracker, match it
//! case-insensitively, and fall back to a safe local default for anything
//! unrecognized. Fallbacks are logged under the `translation_default`
//! target; they are a loss of information, not an error.

use tracing::debug;

use crate::types::{Priority, ProjectStatus, TaskStatus};

/// Remote priority used when the remote value is absent or unknown
pub const DEFAULT_REMOTE_PRIORITY: u8 = 3;

/// Local project status used for unknown remote project states
pub const DEFAULT_PROJECT_STATUS: ProjectStatus = ProjectStatus::Planning;

/// Local task status used for unknown remote issue states
pub const DEFAULT_TASK_STATUS: TaskStatus = TaskStatus::Backlog;

const TRANSLATION_TARGET: &str = "translation_default";

pub fn project_status_to_remote(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Planning => "planned",
        ProjectStatus::Active => "started",
        ProjectStatus::OnHold => "paused",
        ProjectStatus::Completed => "completed",
        ProjectStatus::Cancelled => "canceled",
    }
}

pub fn project_status_from_remote(state: &str) -> ProjectStatus {
    match normalize(state).as_str() {
        "planned" => ProjectStatus::Planning,
        // Older workspaces report unscheduled projects as backlog
        "backlog" => ProjectStatus::Planning,
        "started" => ProjectStatus::Active,
        "paused" => ProjectStatus::OnHold,
        "completed" => ProjectStatus::Completed,
        "canceled" | "cancelled" => ProjectStatus::Cancelled,
        _ => {
            debug!(
                target: TRANSLATION_TARGET,
                "Unknown remote project state '{}', using {}",
                state,
                DEFAULT_PROJECT_STATUS.as_str()
            );
            DEFAULT_PROJECT_STATUS
        }
    }
}

pub fn task_status_to_remote(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Backlog => "backlog",
        TaskStatus::Todo => "todo",
        TaskStatus::InProgress => "in progress",
        TaskStatus::InReview => "in review",
        TaskStatus::Done => "done",
        TaskStatus::Cancelled => "canceled",
    }
}

pub fn task_status_from_remote(state: &str) -> TaskStatus {
    match lookup_task_state_name(state) {
        Some(status) => status,
        None => {
            debug!(
                target: TRANSLATION_TARGET,
                "Unknown remote issue state '{}', using {}",
                state,
                DEFAULT_TASK_STATUS.as_str()
            );
            DEFAULT_TASK_STATUS
        }
    }
}

/// Translate a remote workflow state, consulting its category when the
/// display name is not one of the standard names.
///
/// Workspaces rename states freely ("Shipped", "QA"), but the category
/// (`backlog`, `unstarted`, `started`, `completed`, `canceled`, `triage`)
/// is fixed by the tracker.
pub fn task_status_from_state(name: &str, kind: Option<&str>) -> TaskStatus {
    if let Some(status) = lookup_task_state_name(name) {
        return status;
    }
    let by_kind = kind.and_then(|k| match normalize(k).as_str() {
        "backlog" | "triage" => Some(TaskStatus::Backlog),
        "unstarted" => Some(TaskStatus::Todo),
        "started" => Some(TaskStatus::InProgress),
        "completed" => Some(TaskStatus::Done),
        "canceled" | "cancelled" => Some(TaskStatus::Cancelled),
        _ => None,
    });
    match by_kind {
        Some(status) => status,
        None => {
            debug!(
                target: TRANSLATION_TARGET,
                "Unknown remote issue state '{}' (type {:?}), using {}",
                name,
                kind,
                DEFAULT_TASK_STATUS.as_str()
            );
            DEFAULT_TASK_STATUS
        }
    }
}

fn lookup_task_state_name(state: &str) -> Option<TaskStatus> {
    match normalize(state).as_str() {
        "backlog" => Some(TaskStatus::Backlog),
        "todo" => Some(TaskStatus::Todo),
        "in progress" => Some(TaskStatus::InProgress),
        "in review" => Some(TaskStatus::InReview),
        "done" => Some(TaskStatus::Done),
        "canceled" | "cancelled" => Some(TaskStatus::Cancelled),
        _ => None,
    }
}

pub fn priority_to_remote(priority: Priority) -> u8 {
    match priority {
        Priority::None => 0,
        Priority::Urgent => 1,
        Priority::High => 2,
        Priority::Medium => 3,
        Priority::Low => 4,
    }
}

pub fn priority_from_remote(priority: Option<i64>) -> Priority {
    match priority {
        Some(0) => Priority::None,
        Some(1) => Priority::Urgent,
        Some(2) => Priority::High,
        Some(3) => Priority::Medium,
        Some(4) => Priority::Low,
        other => {
            debug!(
                target: TRANSLATION_TARGET,
                "Unknown remote priority {:?}, using {}",
                other,
                DEFAULT_REMOTE_PRIORITY
            );
            Priority::Medium
        }
    }
}

/// Remote progress is a fraction in 0.0..=1.0
pub fn progress_from_remote(progress: f64) -> u8 {
    if !progress.is_finite() {
        return 0;
    }
    (progress.clamp(0.0, 1.0) * 100.0).round() as u8
}

fn normalize(value: &str) -> String {
    value
        .trim()
        .replace(['_', '-'], " ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_status_round_trip() {
        for status in ProjectStatus::ALL {
            assert_eq!(
                project_status_from_remote(project_status_to_remote(status)),
                status
            );
        }
    }

    #[test]
    fn test_task_status_round_trip() {
        for status in TaskStatus::ALL {
            assert_eq!(task_status_from_remote(task_status_to_remote(status)), status);
        }
    }

    #[test]
    fn test_priority_round_trip() {
        for priority in Priority::ALL {
            let remote = priority_to_remote(priority);
            assert_eq!(priority_from_remote(Some(i64::from(remote))), priority);
        }
    }

    #[test]
    fn test_unknown_values_use_safe_defaults() {
        assert_eq!(project_status_from_remote("frobnicated"), ProjectStatus::Planning);
        assert_eq!(task_status_from_remote("Waiting on legal"), TaskStatus::Backlog);
        assert_eq!(priority_from_remote(Some(99)), Priority::Medium);
        assert_eq!(priority_from_remote(Some(-1)), Priority::Medium);
        assert_eq!(priority_from_remote(None), Priority::Medium);
    }

    #[test]
    fn test_inbound_is_case_insensitive() {
        assert_eq!(project_status_from_remote("STARTED"), ProjectStatus::Active);
        assert_eq!(project_status_from_remote("  Paused "), ProjectStatus::OnHold);
        assert_eq!(task_status_from_remote("In Progress"), TaskStatus::InProgress);
        assert_eq!(task_status_from_remote("IN REVIEW"), TaskStatus::InReview);
        assert_eq!(task_status_from_remote("Done"), TaskStatus::Done);
        assert_eq!(task_status_from_remote("Cancelled"), TaskStatus::Cancelled);
    }

    #[test]
    fn test_state_kind_fallback() {
        assert_eq!(task_status_from_state("Shipped", Some("completed")), TaskStatus::Done);
        assert_eq!(task_status_from_state("QA", Some("started")), TaskStatus::InProgress);
        assert_eq!(task_status_from_state("Ready", Some("unstarted")), TaskStatus::Todo);
        assert_eq!(task_status_from_state("Triage", Some("triage")), TaskStatus::Backlog);
        assert_eq!(task_status_from_state("Mystery", Some("weird")), TaskStatus::Backlog);
        // The name wins over the category when it is a standard name
        assert_eq!(task_status_from_state("In Review", Some("started")), TaskStatus::InReview);
    }

    #[test]
    fn test_progress_conversion() {
        assert_eq!(progress_from_remote(0.0), 0);
        assert_eq!(progress_from_remote(0.456), 46);
        assert_eq!(progress_from_remote(1.7), 100);
        assert_eq!(progress_from_remote(f64::NAN), 0);
    }
}
