// HTTP adapter for the tracker API.
//
// Responsibilities
// - JSON in and out for every resource; multipart (`file`, `user_id`) for image uploads.
// - Error mapping: a non-success status yields the body's `error` field when present,
//   otherwise "API call failed: <reason phrase>". Connection problems are `Transport`,
//   undecodable success bodies are `Decode`.
//
// Boundaries
// - No retries and no caching. Callers decide what to re-fetch.

use crate::modules::tracker::adapters::outbound::api_gateway::{
    ApiError, ApiGateway, ErrorBody, ImageUpload, MessageBody, NewAssignment, NewNote, NewProject, NewTask,
    NewUser, ProjectUpdate, TaskUpdate,
};
use crate::modules::tracker::core::entities::{Assignment, Image, Note, Project, Stats, Task, User};
use crate::shared::core::primitives::{AssignmentId, ImageId, ProjectId, TaskId, UserId};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct HttpApiGateway {
    client: Client,
    base_url: String,
}

impl HttpApiGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = request.build().map_err(|e| ApiError::Transport(e.to_string()))?;
        tracing::debug!(method = %request.method(), url = %request.url(), "api request");
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let reason = status.canonical_reason().unwrap_or(status.as_str()).to_string();
        let body: ErrorBody = response.json().await.unwrap_or_default();
        let error = match body.error {
            Some(message) if !message.is_empty() => ApiError::RequestFailed(message),
            _ => ApiError::from_status(&reason),
        };
        tracing::warn!(status = status.as_u16(), error = %error, "api request failed");
        Err(error)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn discard(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }
}

#[async_trait]
impl ApiGateway for HttpApiGateway {
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.fetch(self.client.get(self.url("/users"))).await
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        self.fetch(self.client.post(self.url("/users")).json(user)).await
    }

    async fn delete_user(&self, user_id: UserId) -> Result<Option<String>, ApiError> {
        let response = self
            .send(self.client.delete(self.url(&format!("/users/{user_id}"))))
            .await?;
        let body: MessageBody = response.json().await.unwrap_or_default();
        Ok(body.message)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.fetch(self.client.get(self.url("/projects"))).await
    }

    async fn get_project(&self, project_id: ProjectId) -> Result<Project, ApiError> {
        self.fetch(self.client.get(self.url(&format!("/projects/{project_id}"))))
            .await
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError> {
        self.fetch(self.client.post(self.url("/projects")).json(project))
            .await
    }

    async fn update_project(&self, project_id: ProjectId, update: &ProjectUpdate) -> Result<Project, ApiError> {
        self.fetch(
            self.client
                .put(self.url(&format!("/projects/{project_id}")))
                .json(update),
        )
        .await
    }

    async fn delete_project(&self, project_id: ProjectId) -> Result<(), ApiError> {
        self.discard(self.client.delete(self.url(&format!("/projects/{project_id}"))))
            .await
    }

    async fn list_tasks(&self, project_id: ProjectId) -> Result<Vec<Task>, ApiError> {
        self.fetch(self.client.get(self.url(&format!("/projects/{project_id}/tasks"))))
            .await
    }

    async fn create_task(&self, project_id: ProjectId, task: &NewTask) -> Result<Task, ApiError> {
        self.fetch(
            self.client
                .post(self.url(&format!("/projects/{project_id}/tasks")))
                .json(task),
        )
        .await
    }

    async fn get_task(&self, task_id: TaskId) -> Result<Task, ApiError> {
        self.fetch(self.client.get(self.url(&format!("/tasks/{task_id}"))))
            .await
    }

    async fn update_task(&self, task_id: TaskId, update: &TaskUpdate) -> Result<Task, ApiError> {
        self.fetch(self.client.put(self.url(&format!("/tasks/{task_id}"))).json(update))
            .await
    }

    async fn delete_task(&self, task_id: TaskId) -> Result<(), ApiError> {
        self.discard(self.client.delete(self.url(&format!("/tasks/{task_id}"))))
            .await
    }

    async fn list_notes(&self, task_id: TaskId) -> Result<Vec<Note>, ApiError> {
        self.fetch(self.client.get(self.url(&format!("/tasks/{task_id}/notes"))))
            .await
    }

    async fn create_note(&self, task_id: TaskId, note: &NewNote) -> Result<Note, ApiError> {
        self.fetch(
            self.client
                .post(self.url(&format!("/tasks/{task_id}/notes")))
                .json(note),
        )
        .await
    }

    async fn list_images(&self, task_id: TaskId) -> Result<Vec<Image>, ApiError> {
        self.fetch(self.client.get(self.url(&format!("/tasks/{task_id}/images"))))
            .await
    }

    async fn upload_image(&self, task_id: TaskId, user_id: UserId, file: &ImageUpload) -> Result<Image, ApiError> {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| ApiError::Transport(format!("invalid content type {content_type}: {e}")))?;
        }
        let form = Form::new().part("file", part).text("user_id", user_id.to_string());
        tracing::debug!(task_id, file_name = %file.file_name, size = file.bytes.len(), "uploading image");
        self.fetch(
            self.client
                .post(self.url(&format!("/tasks/{task_id}/images")))
                .multipart(form),
        )
        .await
    }

    async fn delete_image(&self, image_id: ImageId) -> Result<(), ApiError> {
        self.discard(self.client.delete(self.url(&format!("/images/{image_id}"))))
            .await
    }

    async fn list_assignments(&self, task_id: TaskId) -> Result<Vec<Assignment>, ApiError> {
        self.fetch(self.client.get(self.url(&format!("/tasks/{task_id}/assignments"))))
            .await
    }

    async fn create_assignment(&self, task_id: TaskId, assignment: &NewAssignment) -> Result<(), ApiError> {
        self.discard(
            self.client
                .post(self.url(&format!("/tasks/{task_id}/assignments")))
                .json(assignment),
        )
        .await
    }

    async fn delete_assignment(&self, assignment_id: AssignmentId) -> Result<(), ApiError> {
        self.discard(self.client.delete(self.url(&format!("/assignments/{assignment_id}"))))
            .await
    }

    async fn stats(&self) -> Result<Stats, ApiError> {
        self.fetch(self.client.get(self.url("/stats"))).await
    }
}
