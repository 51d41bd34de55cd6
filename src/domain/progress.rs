//! Rules that keep `Project.progress` consistent with its status and tasks.
//!
//! Two rules feed the same column and are deliberately asymmetric:
//! a "Terminé" status forces 100 and completes every task, while completing
//! every task only moves the percentage and never touches the status.

use crate::models::project::ProjectStatus;

/// Percentage of completed tasks, half rounded up. `None` for a project with
/// no tasks, which leaves the stored value alone.
pub fn progress_from_tasks(completed: i64, total: i64) -> Option<i32> {
    if total <= 0 {
        return None;
    }
    let completed = completed.clamp(0, total);
    Some(((200 * completed + total) / (2 * total)) as i32)
}

/// Progress stored on creation.
pub fn initial_progress(status: ProjectStatus, supplied: Option<i32>) -> i32 {
    if status.is_finished() {
        100
    } else {
        supplied.unwrap_or(0)
    }
}

/// Progress written by a partial update, if any.
pub fn patched_progress(status: Option<ProjectStatus>, supplied: Option<i32>) -> Option<i32> {
    match status {
        Some(s) if s.is_finished() => Some(100),
        _ => supplied,
    }
}

/// Whether an update must mark every task of the project completed.
pub fn completes_all_tasks(status: Option<ProjectStatus>) -> bool {
    status.is_some_and(ProjectStatus::is_finished)
}
