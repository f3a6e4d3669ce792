// Loads every project together with its tasks and their assignees.
//
// The load fans out: one task listing per project, then one assignment listing per task. All
// fetches are read-only and run concurrently; the result is joined before any aggregation.
//
// Failure policy
// - Listing projects or any project's tasks fails the whole load.
// - A failed assignment listing degrades to an empty assignee set for that task.

use crate::modules::tracker::adapters::outbound::api_gateway::{ApiError, ApiGateway};
use crate::modules::tracker::core::aggregation::{ProjectWithTasks, TaskWithAssignees};
use crate::modules::tracker::core::entities::{Assignee, Project, Task};
use futures::future::{join_all, try_join_all};
use std::sync::Arc;

pub struct LoadProjectsWithTasksHandler {
    gateway: Arc<dyn ApiGateway>,
}

impl LoadProjectsWithTasksHandler {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn handle(&self) -> Result<Vec<ProjectWithTasks>, ApiError> {
        let projects = self.gateway.list_projects().await?;
        let loaded = try_join_all(projects.into_iter().map(|project| self.load_project(project))).await?;
        tracing::debug!(projects = loaded.len(), "loaded projects with tasks");
        Ok(loaded)
    }

    async fn load_project(&self, project: Project) -> Result<ProjectWithTasks, ApiError> {
        let tasks = self.gateway.list_tasks(project.id).await?;
        Ok(ProjectWithTasks {
            tasks: attach_assignees(self.gateway.as_ref(), tasks).await,
            project,
        })
    }
}

/// Resolves the assignee set of each task concurrently, preserving task order.
pub async fn attach_assignees(gateway: &dyn ApiGateway, tasks: Vec<Task>) -> Vec<TaskWithAssignees> {
    join_all(tasks.into_iter().map(|task| async move {
        let assignees = match gateway.list_assignments(task.id).await {
            Ok(assignments) => assignments.iter().map(Assignee::from).collect(),
            Err(error) => {
                tracing::warn!(task_id = task.id, %error, "assignments unavailable, showing task unassigned");
                Vec::new()
            }
        };
        TaskWithAssignees { task, assignees }
    }))
    .await
}
