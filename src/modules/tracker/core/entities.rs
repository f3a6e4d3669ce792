// Domain entities as the tracker API serves them.
//
// Invariants
// - Server derived fields (task_count, task_stats, note_count, image_count) are snapshots valid
//   at fetch time only. Nothing in this crate mutates them; a change means a re-fetch.
// - Field names match the API's JSON exactly.

use crate::modules::tracker::core::vocabulary::{Priority, ProjectStatus, TaskStatus};
use crate::shared::core::primitives::{AssignmentId, ImageId, NoteId, ProjectId, TaskId, UserId};
use crate::shared::core::timestamps;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "#3498db".to_string()
}

/// Per-status task counts for one project or one filtered slice of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    #[serde(default)]
    pub starting: usize,
    #[serde(default)]
    pub in_progress: usize,
    #[serde(default)]
    pub ongoing: usize,
    #[serde(default)]
    pub done: usize,
}

impl TaskStats {
    pub fn from_statuses<'a>(statuses: impl IntoIterator<Item = &'a TaskStatus>) -> Self {
        let mut stats = TaskStats::default();
        for status in statuses {
            stats.record(status);
        }
        stats
    }

    /// Counts one task. Statuses outside the vocabulary are not counted in any bucket.
    pub fn record(&mut self, status: &TaskStatus) {
        match status {
            TaskStatus::Starting => self.starting += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Ongoing => self.ongoing += 1,
            TaskStatus::Done => self.done += 1,
            TaskStatus::Other(_) => {}
        }
    }

    pub fn count(&self, status: &TaskStatus) -> usize {
        match status {
            TaskStatus::Starting => self.starting,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Ongoing => self.ongoing,
            TaskStatus::Done => self.done,
            TaskStatus::Other(_) => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.starting + self.in_progress + self.ongoing + self.done
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    pub created_by: UserId,
    #[serde(default, with = "timestamps::optional")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub task_count: usize,
    #[serde(default)]
    pub task_stats: Option<TaskStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    // Legacy single assignee. Read-only; assignments are authoritative.
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub assignee_name: Option<String>,
    #[serde(default)]
    pub assignee_color: Option<String>,
    pub created_by: UserId,
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(with = "timestamps::required")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamps::optional")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamps::optional")]
    pub estimated_completion: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamps::optional")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub note_count: usize,
    #[serde(default)]
    pub image_count: usize,
}

/// Join row between a task and a user, as listed under `/tasks/{id}/assignments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    #[serde(default)]
    pub task_id: Option<TaskId>,
    pub user_id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default = "default_color")]
    pub user_color: String,
    #[serde(default)]
    pub assigned_by: Option<UserId>,
}

/// The resolved shape of an assignee carried alongside a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub user_id: UserId,
    pub username: String,
    pub color: String,
}

impl From<&Assignment> for Assignee {
    fn from(assignment: &Assignment) -> Self {
        Self {
            user_id: assignment.user_id,
            username: assignment.username.clone(),
            color: assignment.user_color.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub task_id: TaskId,
    pub user_id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default = "default_color")]
    pub user_color: String,
    pub content: String,
    #[serde(with = "timestamps::required")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub task_id: TaskId,
    pub user_id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default = "default_color")]
    pub user_color: String,
    pub original_filename: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    pub url: String,
    #[serde(with = "timestamps::required")]
    pub created_at: DateTime<Utc>,
}

/// Dashboard aggregate. Wholly server derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_projects: usize,
    pub total_tasks: usize,
    #[serde(default)]
    pub total_users: usize,
    #[serde(default)]
    pub by_status: BTreeMap<String, usize>,
    #[serde(default)]
    pub recent_activity: Vec<Task>,
}
