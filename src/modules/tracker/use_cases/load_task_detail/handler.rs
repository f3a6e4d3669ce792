// Loads one task with its notes, images and assignments, fetched concurrently.

use crate::modules::tracker::adapters::outbound::api_gateway::{ApiError, ApiGateway};
use crate::modules::tracker::core::entities::User;
use crate::modules::tracker::core::views::{TaskDetail, TaskDetailParts, task_detail};
use crate::shared::core::clock::Clock;
use crate::shared::core::primitives::TaskId;
use std::sync::Arc;

pub struct LoadTaskDetailHandler {
    gateway: Arc<dyn ApiGateway>,
    clock: Arc<dyn Clock>,
}

impl LoadTaskDetailHandler {
    pub fn new(gateway: Arc<dyn ApiGateway>, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }

    /// `users` is the known user list; those without an assignment are offered as assignable.
    pub async fn handle(&self, task_id: TaskId, users: &[User]) -> Result<TaskDetail, ApiError> {
        let (task, notes, images, assignments) = tokio::try_join!(
            self.gateway.get_task(task_id),
            self.gateway.list_notes(task_id),
            self.gateway.list_images(task_id),
            self.gateway.list_assignments(task_id),
        )?;
        Ok(task_detail(
            TaskDetailParts {
                task,
                notes,
                images,
                assignments,
            },
            users,
            self.clock.now(),
        ))
    }
}
