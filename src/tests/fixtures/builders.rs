// Builders for tracker entities, seeded from the JSON documents next to this file.

use crate::modules::tracker::core::entities::{Assignee, Project, Task, TaskStats, User};
use crate::modules::tracker::core::vocabulary::{Priority, ProjectStatus, TaskStatus};
use crate::shared::core::primitives::{ProjectId, TaskId, UserId};
use chrono::{DateTime, Utc};
use std::fs;

fn read_json<T: serde::de::DeserializeOwned>(name: &str) -> T {
    let json_str = fs::read_to_string(format!("./src/tests/fixtures/json/{name}")).unwrap();
    serde_json::from_str(&json_str).unwrap()
}

pub struct TaskBuilder {
    inner: Task,
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl TaskBuilder {
    pub fn new() -> Self {
        Self {
            inner: read_json("task.json"),
        }
    }

    pub fn id(mut self, v: TaskId) -> Self {
        self.inner.id = v;
        self
    }

    pub fn project_id(mut self, v: ProjectId) -> Self {
        self.inner.project_id = v;
        self
    }

    pub fn title(mut self, v: impl Into<String>) -> Self {
        self.inner.title = v.into();
        self
    }

    pub fn status(mut self, v: TaskStatus) -> Self {
        self.inner.status = v;
        self
    }

    pub fn priority(mut self, v: Priority) -> Self {
        self.inner.priority = v;
        self
    }

    pub fn created_by(mut self, v: UserId) -> Self {
        self.inner.created_by = v;
        self
    }

    pub fn legacy_assignee(mut self, name: impl Into<String>) -> Self {
        self.inner.assignee_name = Some(name.into());
        self.inner.assignee_color = Some("#f39c12".to_string());
        self
    }

    pub fn created_at(mut self, v: DateTime<Utc>) -> Self {
        self.inner.created_at = v;
        self
    }

    pub fn estimated_completion(mut self, v: Option<DateTime<Utc>>) -> Self {
        self.inner.estimated_completion = v;
        self
    }

    pub fn build(self) -> Task {
        self.inner
    }
}

pub struct ProjectBuilder {
    inner: Project,
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            inner: read_json("project.json"),
        }
    }

    pub fn id(mut self, v: ProjectId) -> Self {
        self.inner.id = v;
        self
    }

    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.inner.name = v.into();
        self
    }

    pub fn status(mut self, v: ProjectStatus) -> Self {
        self.inner.status = v;
        self
    }

    pub fn task_count(mut self, v: usize) -> Self {
        self.inner.task_count = v;
        self
    }

    pub fn task_stats(mut self, v: TaskStats) -> Self {
        self.inner.task_stats = Some(v);
        self
    }

    pub fn build(self) -> Project {
        self.inner
    }
}

pub fn assignee(user_id: UserId) -> Assignee {
    Assignee {
        user_id,
        username: format!("user-{user_id}"),
        color: "#3498db".to_string(),
    }
}

/// The three users of `users.json`: ada (1), grace (3), linus (7).
pub fn users() -> Vec<User> {
    read_json("users.json")
}
