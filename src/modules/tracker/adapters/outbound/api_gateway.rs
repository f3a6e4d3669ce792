// ApiGateway is the port through which the client reaches the tracker API.
//
// Purpose
// - One operation per resource verb, including nested listings under a parent.
//
// Responsibilities
// - Request payloads mirror the API's JSON field names exactly.
// - Non-success responses surface as `ApiError::RequestFailed` carrying the server's `error`
//   message, or a status derived fallback when the body has none.
// - Deletes return no payload. Image upload is one multipart request per file.
//
// Testing guidance
// - `InMemoryApiGateway` emulates the server's derived fields for session and loader tests.
// - `HttpApiGateway` is exercised against a mock HTTP server.

use crate::modules::tracker::core::entities::{Assignment, Image, Note, Project, Stats, Task, User};
use crate::modules::tracker::core::vocabulary::{Priority, ProjectStatus, TaskStatus};
use crate::shared::core::primitives::{AssignmentId, ImageId, ProjectId, TaskId, UserId};
use crate::shared::core::timestamps;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    RequestFailed(String),

    #[error("request could not be sent: {0}")]
    Transport(String),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Failure for a non-success status when the server supplied no usable message.
    pub fn from_status(reason: &str) -> Self {
        ApiError::RequestFailed(format!("API call failed: {reason}"))
    }
}

/// Shape of an error body. The `error` field is optional, and so is the body itself.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub created_by: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectUpdate {
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    // Legacy single assignee; always sent as null.
    pub assigned_to: Option<UserId>,
    pub created_by: UserId,
    #[serde(with = "timestamps::optional")]
    pub estimated_completion: Option<DateTime<Utc>>,
}

/// Partial task update. Each variant serializes to exactly one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TaskUpdate {
    Status {
        status: TaskStatus,
    },
    EstimatedCompletion {
        #[serde(with = "timestamps::optional")]
        estimated_completion: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAssignment {
    pub user_id: UserId,
    pub assigned_by: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNote {
    pub content: String,
    pub user_id: UserId,
}

/// One file of a multipart image upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ApiGateway: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
    async fn create_user(&self, user: &NewUser) -> Result<User, ApiError>;
    /// Returns the server's confirmation message, if it sent one.
    async fn delete_user(&self, user_id: UserId) -> Result<Option<String>, ApiError>;

    async fn list_projects(&self) -> Result<Vec<Project>, ApiError>;
    async fn get_project(&self, project_id: ProjectId) -> Result<Project, ApiError>;
    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError>;
    async fn update_project(&self, project_id: ProjectId, update: &ProjectUpdate) -> Result<Project, ApiError>;
    async fn delete_project(&self, project_id: ProjectId) -> Result<(), ApiError>;
    async fn list_tasks(&self, project_id: ProjectId) -> Result<Vec<Task>, ApiError>;

    async fn create_task(&self, project_id: ProjectId, task: &NewTask) -> Result<Task, ApiError>;
    async fn get_task(&self, task_id: TaskId) -> Result<Task, ApiError>;
    async fn update_task(&self, task_id: TaskId, update: &TaskUpdate) -> Result<Task, ApiError>;
    async fn delete_task(&self, task_id: TaskId) -> Result<(), ApiError>;

    async fn list_notes(&self, task_id: TaskId) -> Result<Vec<Note>, ApiError>;
    async fn create_note(&self, task_id: TaskId, note: &NewNote) -> Result<Note, ApiError>;

    async fn list_images(&self, task_id: TaskId) -> Result<Vec<Image>, ApiError>;
    async fn upload_image(&self, task_id: TaskId, user_id: UserId, file: &ImageUpload) -> Result<Image, ApiError>;
    async fn delete_image(&self, image_id: ImageId) -> Result<(), ApiError>;

    async fn list_assignments(&self, task_id: TaskId) -> Result<Vec<Assignment>, ApiError>;
    async fn create_assignment(&self, task_id: TaskId, assignment: &NewAssignment) -> Result<(), ApiError>;
    async fn delete_assignment(&self, assignment_id: AssignmentId) -> Result<(), ApiError>;

    async fn stats(&self) -> Result<Stats, ApiError>;
}
