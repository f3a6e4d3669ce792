// View models for the per-project task list and the task detail.
//
// Boundaries
// - Plain serializable data, computed from fetched entities and an injected `now`.
//   No formatting for a particular renderer beyond the labels the tracker always shows.

use crate::modules::tracker::core::aggregation::TaskWithAssignees;
use crate::modules::tracker::core::entities::{Assignee, Assignment, Image, Note, Project, Task, TaskStats, User};
use crate::modules::tracker::core::time::{TaskTiming, relative_time, task_timing};
use crate::modules::tracker::core::vocabulary::{Priority, TaskStatus};
use crate::shared::core::primitives::TaskId;
use crate::shared::core::timestamps;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who a task shows as assigned to. Assignments win over the legacy single assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssigneeDisplay {
    Assigned { assignees: Vec<Assignee> },
    Legacy { name: String, color: Option<String> },
    Unassigned,
}

impl AssigneeDisplay {
    pub fn for_task(task: &TaskWithAssignees) -> Self {
        if !task.assignees.is_empty() {
            return AssigneeDisplay::Assigned {
                assignees: task.assignees.clone(),
            };
        }
        match &task.task.assignee_name {
            Some(name) => AssigneeDisplay::Legacy {
                name: name.clone(),
                color: task.task.assignee_color.clone(),
            },
            None => AssigneeDisplay::Unassigned,
        }
    }

    pub fn label(&self) -> String {
        match self {
            AssigneeDisplay::Assigned { assignees } => assignees
                .iter()
                .map(|assignee| assignee.username.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            AssigneeDisplay::Legacy { name, .. } => name.clone(),
            AssigneeDisplay::Unassigned => "Unassigned".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub status_label: String,
    pub priority: Priority,
    pub priority_badge: String,
    pub assignees: AssigneeDisplay,
    pub note_count: usize,
    pub image_count: usize,
    pub started: Option<String>,
    #[serde(with = "timestamps::optional")]
    pub estimated_completion: Option<DateTime<Utc>>,
    pub completed: Option<String>,
    pub timing: TaskTiming,
}

pub fn task_row(entry: &TaskWithAssignees, now: DateTime<Utc>) -> TaskRow {
    let task = &entry.task;
    TaskRow {
        id: task.id,
        title: task.title.clone(),
        status: task.status.clone(),
        status_label: task.status.label().to_string(),
        priority: task.priority.clone(),
        priority_badge: task.priority.badge(),
        assignees: AssigneeDisplay::for_task(entry),
        note_count: task.note_count,
        image_count: task.image_count,
        started: task.started_at.map(|at| relative_time(at, now)),
        estimated_completion: task.estimated_completion,
        completed: task.completed_at.map(|at| relative_time(at, now)),
        timing: task_timing(task.estimated_completion, &task.status, now),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskListView {
    pub project: Project,
    pub project_status_label: String,
    /// All four buckets, computed from the fetched tasks.
    pub stats: TaskStats,
    pub tasks: Vec<TaskRow>,
    pub empty_message: Option<String>,
}

pub fn task_list_view(project: Project, tasks: &[TaskWithAssignees], now: DateTime<Utc>) -> TaskListView {
    let stats = TaskStats::from_statuses(tasks.iter().map(|entry| &entry.task.status));
    let rows: Vec<TaskRow> = tasks.iter().map(|entry| task_row(entry, now)).collect();
    TaskListView {
        project_status_label: project.status.label().to_string(),
        project,
        stats,
        empty_message: rows
            .is_empty()
            .then(|| "No tasks yet. Create one to get started!".to_string()),
        tasks: rows,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteRow {
    #[serde(flatten)]
    pub note: Note,
    pub posted: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRow {
    #[serde(flatten)]
    pub image: Image,
    pub uploaded: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDetail {
    pub task: Task,
    pub status_label: String,
    pub priority_badge: String,
    pub created: String,
    pub started: Option<String>,
    pub completed: Option<String>,
    pub timing: TaskTiming,
    pub assignments: Vec<Assignment>,
    /// Users not yet assigned to the task, offered by the "add assignee" picker.
    pub assignable_users: Vec<User>,
    pub notes: Vec<NoteRow>,
    pub images: Vec<ImageRow>,
}

pub struct TaskDetailParts {
    pub task: Task,
    pub notes: Vec<Note>,
    pub images: Vec<Image>,
    pub assignments: Vec<Assignment>,
}

pub fn task_detail(parts: TaskDetailParts, users: &[User], now: DateTime<Utc>) -> TaskDetail {
    let TaskDetailParts {
        task,
        notes,
        images,
        assignments,
    } = parts;
    let assignable_users = users
        .iter()
        .filter(|user| !assignments.iter().any(|assignment| assignment.user_id == user.id))
        .cloned()
        .collect();
    TaskDetail {
        status_label: task.status.label().to_string(),
        priority_badge: task.priority.badge(),
        created: relative_time(task.created_at, now),
        started: task.started_at.map(|at| relative_time(at, now)),
        completed: task.completed_at.map(|at| relative_time(at, now)),
        timing: task_timing(task.estimated_completion, &task.status, now),
        assignable_users,
        notes: notes
            .into_iter()
            .map(|note| NoteRow {
                posted: relative_time(note.created_at, now),
                note,
            })
            .collect(),
        images: images
            .into_iter()
            .map(|image| ImageRow {
                uploaded: relative_time(image.created_at, now),
                image,
            })
            .collect(),
        assignments,
        task,
    }
}
