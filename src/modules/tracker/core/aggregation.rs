// Aggregation and filtering over project -> task -> assignee trees.
//
// Purpose
// - Dashboard grouping by project status with compact per-project counts.
// - The "my work" filter and the per-user statistics recomputed under it.
//
// Invariants
// - A task is "mine" only when I appear in its assignee set. An empty set is never mine, not
//   even for the task's creator.
// - Under the filter, statistics are recomputed from the user's tasks. The server's unfiltered
//   task_stats are never reused for a filtered card.
// - Everything here is a pure function of its inputs; running it twice yields the same output.

use crate::modules::tracker::core::entities::{Assignee, Project, Task, TaskStats};
use crate::modules::tracker::core::vocabulary::ProjectStatus;
use crate::shared::core::primitives::{ProjectId, UserId};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Please select a user first")]
    NoCurrentUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskWithAssignees {
    #[serde(flatten)]
    pub task: Task,
    pub assignees: Vec<Assignee>,
}

impl TaskWithAssignees {
    pub fn is_assigned_to(&self, user_id: UserId) -> bool {
        self.assignees.iter().any(|assignee| assignee.user_id == user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectWithTasks {
    pub project: Project,
    pub tasks: Vec<TaskWithAssignees>,
}

impl ProjectWithTasks {
    pub fn tasks_assigned_to(&self, user_id: UserId) -> impl Iterator<Item = &TaskWithAssignees> {
        self.tasks.iter().filter(move |task| task.is_assigned_to(user_id))
    }

    pub fn has_work_for(&self, user_id: UserId) -> bool {
        self.tasks_assigned_to(user_id).next().is_some()
    }

    pub fn stats_for(&self, user_id: UserId) -> TaskStats {
        TaskStats::from_statuses(self.tasks_assigned_to(user_id).map(|task| &task.task.status))
    }
}

// Dashboard

/// Done, in progress and ongoing counts. Starting is not part of the compact summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompactSummary {
    pub done: usize,
    pub in_progress: usize,
    pub ongoing: usize,
}

impl From<TaskStats> for CompactSummary {
    fn from(stats: TaskStats) -> Self {
        Self {
            done: stats.done,
            in_progress: stats.in_progress,
            ongoing: stats.ongoing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardCard {
    pub project_id: ProjectId,
    pub name: String,
    pub status: ProjectStatus,
    pub task_count: usize,
    pub summary: Option<CompactSummary>,
}

impl From<&Project> for DashboardCard {
    fn from(project: &Project) -> Self {
        Self {
            project_id: project.id,
            name: project.name.clone(),
            status: project.status.clone(),
            task_count: project.task_count,
            summary: project.task_stats.map(CompactSummary::from),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardColumns {
    pub active: Vec<DashboardCard>,
    pub on_hold: Vec<DashboardCard>,
    pub completed: Vec<DashboardCard>,
    pub total_tasks: usize,
}

impl DashboardColumns {
    pub fn active_projects(&self) -> usize {
        self.active.len()
    }

    pub fn on_hold_projects(&self) -> usize {
        self.on_hold.len()
    }

    pub fn completed_projects(&self) -> usize {
        self.completed.len()
    }
}

pub fn group_dashboard(projects: &[Project]) -> DashboardColumns {
    let mut columns = DashboardColumns {
        total_tasks: projects.iter().map(|project| project.task_count).sum(),
        ..DashboardColumns::default()
    };
    for project in projects {
        let column = match project.status {
            ProjectStatus::Active => &mut columns.active,
            ProjectStatus::OnHold => &mut columns.on_hold,
            ProjectStatus::Completed => &mut columns.completed,
            ProjectStatus::Other(_) => continue,
        };
        column.push(DashboardCard::from(project));
    }
    columns
}

// My work

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFilter {
    All,
    AssignedTo(UserId),
}

impl ProjectFilter {
    /// Resolves the listing filter. Asking for "my work" without a selected user is refused.
    pub fn for_view(my_work: bool, current_user_id: Option<UserId>) -> Result<Self, FilterError> {
        match (my_work, current_user_id) {
            (false, _) => Ok(ProjectFilter::All),
            (true, Some(user_id)) => Ok(ProjectFilter::AssignedTo(user_id)),
            (true, None) => Err(FilterError::NoCurrentUser),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            ProjectFilter::All => None,
            ProjectFilter::AssignedTo(user_id) => Some(*user_id),
        }
    }
}

pub fn my_work(projects: &[ProjectWithTasks], user_id: UserId) -> Vec<&ProjectWithTasks> {
    projects
        .iter()
        .filter(|project| project.has_work_for(user_id))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectCard {
    pub project_id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub status_label: String,
    pub task_count: usize,
    pub task_stats: TaskStats,
    pub assigned_only: bool,
}

impl ProjectCard {
    fn unfiltered(entry: &ProjectWithTasks) -> Self {
        Self::build(entry, entry.project.task_count, entry.project.task_stats.unwrap_or_default(), false)
    }

    fn assigned_to(entry: &ProjectWithTasks, user_id: UserId) -> Self {
        let stats = entry.stats_for(user_id);
        let task_count = entry.tasks_assigned_to(user_id).count();
        Self::build(entry, task_count, stats, true)
    }

    fn build(entry: &ProjectWithTasks, task_count: usize, task_stats: TaskStats, assigned_only: bool) -> Self {
        let project = &entry.project;
        Self {
            project_id: project.id,
            name: project.name.clone(),
            description: project.description.clone().filter(|d| !d.is_empty()),
            status: project.status.clone(),
            status_label: project.status.label().to_string(),
            task_count,
            task_stats,
            assigned_only,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectListing {
    pub filter_user_id: Option<UserId>,
    pub cards: Vec<ProjectCard>,
    pub empty_message: Option<String>,
}

pub fn project_listing(projects: &[ProjectWithTasks], filter: ProjectFilter) -> ProjectListing {
    let cards: Vec<ProjectCard> = match filter {
        ProjectFilter::All => projects.iter().map(ProjectCard::unfiltered).collect(),
        ProjectFilter::AssignedTo(user_id) => my_work(projects, user_id)
            .into_iter()
            .map(|entry| ProjectCard::assigned_to(entry, user_id))
            .collect(),
    };
    let empty_message = cards.is_empty().then(|| match filter {
        ProjectFilter::All => "No projects yet. Create one to get started!".to_string(),
        ProjectFilter::AssignedTo(_) => "No projects with tasks assigned to you".to_string(),
    });
    ProjectListing {
        filter_user_id: filter.user_id(),
        cards,
        empty_message,
    }
}
