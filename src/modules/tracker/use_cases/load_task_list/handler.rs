// Loads the task list of one project: the project, its tasks and each task's assignees.

use crate::modules::tracker::adapters::outbound::api_gateway::{ApiError, ApiGateway};
use crate::modules::tracker::core::views::{TaskListView, task_list_view};
use crate::modules::tracker::use_cases::load_projects_with_tasks::handler::attach_assignees;
use crate::shared::core::clock::Clock;
use crate::shared::core::primitives::ProjectId;
use std::sync::Arc;

pub struct LoadTaskListHandler {
    gateway: Arc<dyn ApiGateway>,
    clock: Arc<dyn Clock>,
}

impl LoadTaskListHandler {
    pub fn new(gateway: Arc<dyn ApiGateway>, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }

    pub async fn handle(&self, project_id: ProjectId) -> Result<TaskListView, ApiError> {
        let (project, tasks) = tokio::try_join!(
            self.gateway.get_project(project_id),
            self.gateway.list_tasks(project_id)
        )?;
        let tasks = attach_assignees(self.gateway.as_ref(), tasks).await;
        Ok(task_list_view(project, &tasks, self.clock.now()))
    }
}
