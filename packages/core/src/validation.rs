use thiserror::Error;

use crate::constants::{MAX_PROJECT_NAME_LEN, MAX_TASK_TITLE_LEN};
use crate::types::{Project, Task};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Project name cannot be empty")]
    EmptyName,
    #[error("Project name exceeds {0} characters")]
    NameTooLong(usize),
    #[error("Task title cannot be empty")]
    EmptyTitle,
    #[error("Task title exceeds {0} characters")]
    TitleTooLong(usize),
    #[error("Progress must be between 0 and 100, got {0}")]
    ProgressOutOfRange(u8),
    #[error("End date {end} is before start date {start}")]
    DateRange { start: String, end: String },
    #[error("Task has no parent project")]
    MissingProject,
}

/// Truncate to at most `max_chars` characters, respecting char boundaries
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 3 {
        return s.chars().take(max_chars).collect();
    }
    let mut out: String = s.chars().take(max_chars - 3).collect();
    out.push_str("...");
    out
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    let name = project.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > MAX_PROJECT_NAME_LEN {
        return Err(ValidationError::NameTooLong(MAX_PROJECT_NAME_LEN));
    }
    if project.progress > 100 {
        return Err(ValidationError::ProgressOutOfRange(project.progress));
    }
    if let (Some(start), Some(end)) = (project.start_date, project.end_date) {
        if end < start {
            return Err(ValidationError::DateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_task(task: &Task) -> Result<(), ValidationError> {
    let title = task.title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if title.chars().count() > MAX_TASK_TITLE_LEN {
        return Err(ValidationError::TitleTooLong(MAX_TASK_TITLE_LEN));
    }
    if task.project_id.trim().is_empty() {
        return Err(ValidationError::MissingProject);
    }
    Ok(())
}
