// In-memory tracker server.
//
// Purpose
// - Stands in for the HTTP API in session, loader and scenario tests, including the fields the
//   real server derives: task_count, task_stats, note/image counts, creator and author names,
//   started_at / completed_at lifecycle stamps, and the /stats aggregate.
//
// Test controls
// - `set_offline(true)` makes every call fail with `Transport`.
// - `fail_uploads_named(name)` rejects uploads of that file name.
// - `fail_requests_to(request)` answers that exact "METHOD /path" with a server error.
// - `requests()` lists every call as "METHOD /path", in order.
// - `set_latency(d)` delays every call by `d` (use with paused tokio time).

use crate::modules::tracker::adapters::outbound::api_gateway::{
    ApiError, ApiGateway, ImageUpload, NewAssignment, NewNote, NewProject, NewTask, NewUser, ProjectUpdate,
    TaskUpdate,
};
use crate::modules::tracker::core::entities::{Assignment, Image, Note, Project, Stats, Task, TaskStats, User};
use crate::modules::tracker::core::vocabulary::TaskStatus;
use crate::shared::core::clock::Clock;
use crate::shared::core::primitives::{AssignmentId, ImageId, ProjectId, TaskId, UserId};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const ALLOWED_EXTENSIONS: [(&str, &str); 6] = [
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
];

#[derive(Default)]
struct Tables {
    last_id: i64,
    users: Vec<User>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    notes: Vec<Note>,
    images: Vec<Image>,
    assignments: Vec<Assignment>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn user(&self, user_id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == user_id)
    }

    fn author(&self, user_id: UserId) -> (String, String) {
        match self.user(user_id) {
            Some(user) => (user.display_name.clone(), user.color.clone()),
            None => ("Unknown".to_string(), "#3498db".to_string()),
        }
    }

    fn project_view(&self, project: &Project) -> Project {
        let tasks: Vec<&Task> = self.tasks.iter().filter(|task| task.project_id == project.id).collect();
        Project {
            task_count: tasks.len(),
            task_stats: Some(TaskStats::from_statuses(tasks.iter().map(|task| &task.status))),
            ..project.clone()
        }
    }

    fn task_view(&self, task: &Task) -> Task {
        let assignee = task.assigned_to.and_then(|user_id| self.user(user_id));
        Task {
            assignee_name: assignee.map(|user| user.display_name.clone()),
            assignee_color: assignee.map(|user| user.color.clone()),
            creator_name: Some(
                self.user(task.created_by)
                    .map(|user| user.display_name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
            ),
            note_count: self.notes.iter().filter(|note| note.task_id == task.id).count(),
            image_count: self.images.iter().filter(|image| image.task_id == task.id).count(),
            ..task.clone()
        }
    }

    fn find_project(&self, project_id: ProjectId) -> Result<&Project, ApiError> {
        self.projects
            .iter()
            .find(|project| project.id == project_id)
            .ok_or_else(not_found)
    }

    fn find_task_mut(&mut self, task_id: TaskId) -> Result<&mut Task, ApiError> {
        self.tasks.iter_mut().find(|task| task.id == task_id).ok_or_else(not_found)
    }

    fn ensure_task(&self, task_id: TaskId) -> Result<(), ApiError> {
        if self.tasks.iter().any(|task| task.id == task_id) {
            Ok(())
        } else {
            Err(not_found())
        }
    }

    fn drop_task_children(&mut self, task_ids: &HashSet<TaskId>) {
        self.notes.retain(|note| !task_ids.contains(&note.task_id));
        self.images.retain(|image| !task_ids.contains(&image.task_id));
        self.assignments
            .retain(|assignment| !assignment.task_id.is_some_and(|task_id| task_ids.contains(&task_id)));
    }
}

fn not_found() -> ApiError {
    ApiError::from_status("Not Found")
}

fn missing(field: &str) -> ApiError {
    ApiError::RequestFailed(format!("{field} is required"))
}

pub struct InMemoryApiGateway {
    clock: Arc<dyn Clock>,
    tables: Mutex<Tables>,
    offline: Mutex<bool>,
    latency: Mutex<Option<Duration>>,
    failing_uploads: Mutex<HashSet<String>>,
    failing_requests: Mutex<HashSet<String>>,
    requests: Mutex<Vec<String>>,
}

impl InMemoryApiGateway {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            tables: Mutex::new(Tables::default()),
            offline: Mutex::new(false),
            latency: Mutex::new(None),
            failing_uploads: Mutex::new(HashSet::new()),
            failing_requests: Mutex::new(HashSet::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn set_offline(&self, offline: bool) {
        *self.offline.lock().await = offline;
    }

    pub async fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().await = latency;
    }

    pub async fn fail_uploads_named(&self, file_name: &str) {
        self.failing_uploads.lock().await.insert(file_name.to_string());
    }

    pub async fn fail_requests_to(&self, request: &str) {
        self.failing_requests.lock().await.insert(request.to_string());
    }

    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    pub async fn clear_requests(&self) {
        self.requests.lock().await.clear();
    }

    /// Number of recorded calls matching "METHOD /path" exactly.
    pub async fn count_requests(&self, request: &str) -> usize {
        self.requests.lock().await.iter().filter(|r| r.as_str() == request).count()
    }

    async fn receive(&self, request: String) -> Result<(), ApiError> {
        tracing::debug!(%request, "in-memory api call");
        let failing = self.failing_requests.lock().await.contains(&request);
        self.requests.lock().await.push(request);
        let latency = *self.latency.lock().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if *self.offline.lock().await {
            return Err(ApiError::Transport("server unreachable".to_string()));
        }
        if failing {
            return Err(ApiError::from_status("Internal Server Error"));
        }
        Ok(())
    }
}

#[async_trait]
impl ApiGateway for InMemoryApiGateway {
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.receive("GET /users".into()).await?;
        Ok(self.tables.lock().await.users.clone())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        self.receive("POST /users".into()).await?;
        if user.username.trim().is_empty() {
            return Err(missing("username"));
        }
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|existing| existing.username == user.username) {
            return Err(ApiError::RequestFailed("Username already exists".to_string()));
        }
        let created = User {
            id: tables.next_id(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            color: user.color.clone(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn delete_user(&self, user_id: UserId) -> Result<Option<String>, ApiError> {
        self.receive(format!("DELETE /users/{user_id}")).await?;
        let mut tables = self.tables.lock().await;
        tables.user(user_id).ok_or_else(not_found)?;
        tables.users.retain(|user| user.id != user_id);

        // Ownership moves to the oldest remaining user; assignments of the user disappear.
        let heir = tables.users.first().map(|user| user.id).unwrap_or(user_id);
        let mut projects = 0;
        for project in tables.projects.iter_mut().filter(|p| p.created_by == user_id) {
            project.created_by = heir;
            projects += 1;
        }
        let mut tasks = 0;
        for task in tables.tasks.iter_mut() {
            if task.created_by == user_id {
                task.created_by = heir;
                tasks += 1;
            }
            if task.assigned_to == Some(user_id) {
                task.assigned_to = None;
            }
        }
        tables.assignments.retain(|assignment| assignment.user_id != user_id);
        Ok(Some(format!(
            "User deleted. {projects} projects and {tasks} tasks reassigned."
        )))
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.receive("GET /projects".into()).await?;
        let tables = self.tables.lock().await;
        Ok(tables.projects.iter().map(|project| tables.project_view(project)).collect())
    }

    async fn get_project(&self, project_id: ProjectId) -> Result<Project, ApiError> {
        self.receive(format!("GET /projects/{project_id}")).await?;
        let tables = self.tables.lock().await;
        let project = tables.find_project(project_id)?;
        Ok(tables.project_view(project))
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError> {
        self.receive("POST /projects".into()).await?;
        if project.name.trim().is_empty() {
            return Err(missing("name"));
        }
        let now = self.clock.now();
        let mut tables = self.tables.lock().await;
        let created = Project {
            id: tables.next_id(),
            name: project.name.clone(),
            description: Some(project.description.clone()),
            status: project.status.clone(),
            created_by: project.created_by,
            created_at: Some(now),
            task_count: 0,
            task_stats: None,
        };
        tables.projects.push(created.clone());
        Ok(tables.project_view(&created))
    }

    async fn update_project(&self, project_id: ProjectId, update: &ProjectUpdate) -> Result<Project, ApiError> {
        self.receive(format!("PUT /projects/{project_id}")).await?;
        let mut tables = self.tables.lock().await;
        let project = tables
            .projects
            .iter_mut()
            .find(|project| project.id == project_id)
            .ok_or_else(not_found)?;
        project.status = update.status.clone();
        let updated = project.clone();
        Ok(tables.project_view(&updated))
    }

    async fn delete_project(&self, project_id: ProjectId) -> Result<(), ApiError> {
        self.receive(format!("DELETE /projects/{project_id}")).await?;
        let mut tables = self.tables.lock().await;
        tables.find_project(project_id)?;
        let task_ids: HashSet<TaskId> = tables
            .tasks
            .iter()
            .filter(|task| task.project_id == project_id)
            .map(|task| task.id)
            .collect();
        tables.drop_task_children(&task_ids);
        tables.tasks.retain(|task| task.project_id != project_id);
        tables.projects.retain(|project| project.id != project_id);
        Ok(())
    }

    async fn list_tasks(&self, project_id: ProjectId) -> Result<Vec<Task>, ApiError> {
        self.receive(format!("GET /projects/{project_id}/tasks")).await?;
        let tables = self.tables.lock().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|task| task.project_id == project_id)
            .map(|task| tables.task_view(task))
            .collect())
    }

    async fn create_task(&self, project_id: ProjectId, task: &NewTask) -> Result<Task, ApiError> {
        self.receive(format!("POST /projects/{project_id}/tasks")).await?;
        if task.title.trim().is_empty() {
            return Err(missing("title"));
        }
        let now = self.clock.now();
        let mut tables = self.tables.lock().await;
        tables.find_project(project_id)?;
        let started_at = matches!(task.status, TaskStatus::InProgress | TaskStatus::Ongoing).then_some(now);
        let created = Task {
            id: tables.next_id(),
            project_id,
            title: task.title.clone(),
            description: Some(task.description.clone()),
            status: task.status.clone(),
            priority: task.priority.clone(),
            assigned_to: task.assigned_to,
            assignee_name: None,
            assignee_color: None,
            created_by: task.created_by,
            creator_name: None,
            created_at: now,
            started_at,
            estimated_completion: task.estimated_completion,
            completed_at: None,
            note_count: 0,
            image_count: 0,
        };
        tables.tasks.push(created.clone());
        Ok(tables.task_view(&created))
    }

    async fn get_task(&self, task_id: TaskId) -> Result<Task, ApiError> {
        self.receive(format!("GET /tasks/{task_id}")).await?;
        let tables = self.tables.lock().await;
        let task = tables.tasks.iter().find(|task| task.id == task_id).ok_or_else(not_found)?;
        Ok(tables.task_view(task))
    }

    async fn update_task(&self, task_id: TaskId, update: &TaskUpdate) -> Result<Task, ApiError> {
        self.receive(format!("PUT /tasks/{task_id}")).await?;
        let now = self.clock.now();
        let mut tables = self.tables.lock().await;
        let task = tables.find_task_mut(task_id)?;
        match update {
            TaskUpdate::Status { status } => {
                let old = std::mem::replace(&mut task.status, status.clone());
                let started = matches!(status, TaskStatus::InProgress | TaskStatus::Ongoing);
                if old == TaskStatus::Starting && started && task.started_at.is_none() {
                    task.started_at = Some(now);
                }
                match (old.is_done(), status.is_done()) {
                    (false, true) => task.completed_at = Some(now),
                    (true, false) => task.completed_at = None,
                    _ => {}
                }
            }
            TaskUpdate::EstimatedCompletion { estimated_completion } => {
                task.estimated_completion = *estimated_completion;
            }
        }
        let updated = task.clone();
        Ok(tables.task_view(&updated))
    }

    async fn delete_task(&self, task_id: TaskId) -> Result<(), ApiError> {
        self.receive(format!("DELETE /tasks/{task_id}")).await?;
        let mut tables = self.tables.lock().await;
        tables.ensure_task(task_id)?;
        tables.drop_task_children(&HashSet::from([task_id]));
        tables.tasks.retain(|task| task.id != task_id);
        Ok(())
    }

    async fn list_notes(&self, task_id: TaskId) -> Result<Vec<Note>, ApiError> {
        self.receive(format!("GET /tasks/{task_id}/notes")).await?;
        let tables = self.tables.lock().await;
        // Newest first.
        Ok(tables.notes.iter().rev().filter(|note| note.task_id == task_id).cloned().collect())
    }

    async fn create_note(&self, task_id: TaskId, note: &NewNote) -> Result<Note, ApiError> {
        self.receive(format!("POST /tasks/{task_id}/notes")).await?;
        let now = self.clock.now();
        let mut tables = self.tables.lock().await;
        tables.ensure_task(task_id)?;
        let (username, user_color) = tables.author(note.user_id);
        let created = Note {
            id: tables.next_id(),
            task_id,
            user_id: note.user_id,
            username,
            user_color,
            content: note.content.clone(),
            created_at: now,
        };
        tables.notes.push(created.clone());
        Ok(created)
    }

    async fn list_images(&self, task_id: TaskId) -> Result<Vec<Image>, ApiError> {
        self.receive(format!("GET /tasks/{task_id}/images")).await?;
        let tables = self.tables.lock().await;
        tables.ensure_task(task_id)?;
        Ok(tables.images.iter().rev().filter(|image| image.task_id == task_id).cloned().collect())
    }

    async fn upload_image(&self, task_id: TaskId, user_id: UserId, file: &ImageUpload) -> Result<Image, ApiError> {
        self.receive(format!("POST /tasks/{task_id}/images")).await?;
        if self.failing_uploads.lock().await.contains(&file.file_name) {
            return Err(ApiError::RequestFailed("Upload rejected".to_string()));
        }
        if file.file_name.is_empty() {
            return Err(ApiError::RequestFailed("No file selected".to_string()));
        }
        let extension = file
            .file_name
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_lowercase())
            .unwrap_or_default();
        let mime_type = ALLOWED_EXTENSIONS
            .iter()
            .find(|(allowed, _)| *allowed == extension)
            .map(|(_, mime)| mime.to_string())
            .ok_or_else(|| ApiError::RequestFailed("Invalid file type".to_string()))?;

        let now = self.clock.now();
        let mut tables = self.tables.lock().await;
        tables.ensure_task(task_id)?;
        let (username, user_color) = tables.author(user_id);
        let id = tables.next_id();
        let created = Image {
            id,
            task_id,
            user_id,
            username,
            user_color,
            original_filename: file.file_name.clone(),
            mime_type: Some(mime_type),
            file_size: Some(file.bytes.len() as u64),
            url: format!("/api/images/{id}/download"),
            created_at: now,
        };
        tables.images.push(created.clone());
        Ok(created)
    }

    async fn delete_image(&self, image_id: ImageId) -> Result<(), ApiError> {
        self.receive(format!("DELETE /images/{image_id}")).await?;
        let mut tables = self.tables.lock().await;
        let before = tables.images.len();
        tables.images.retain(|image| image.id != image_id);
        if tables.images.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn list_assignments(&self, task_id: TaskId) -> Result<Vec<Assignment>, ApiError> {
        self.receive(format!("GET /tasks/{task_id}/assignments")).await?;
        let tables = self.tables.lock().await;
        Ok(tables
            .assignments
            .iter()
            .filter(|assignment| assignment.task_id == Some(task_id))
            .cloned()
            .collect())
    }

    async fn create_assignment(&self, task_id: TaskId, assignment: &NewAssignment) -> Result<(), ApiError> {
        self.receive(format!("POST /tasks/{task_id}/assignments")).await?;
        let mut tables = self.tables.lock().await;
        tables.ensure_task(task_id)?;
        let user = tables.user(assignment.user_id).cloned().ok_or_else(not_found)?;
        let duplicate = tables
            .assignments
            .iter()
            .any(|existing| existing.task_id == Some(task_id) && existing.user_id == user.id);
        if duplicate {
            return Err(ApiError::RequestFailed("User already assigned to this task".to_string()));
        }
        let id = tables.next_id();
        tables.assignments.push(Assignment {
            id,
            task_id: Some(task_id),
            user_id: user.id,
            username: user.display_name,
            user_color: user.color,
            assigned_by: Some(assignment.assigned_by),
        });
        Ok(())
    }

    async fn delete_assignment(&self, assignment_id: AssignmentId) -> Result<(), ApiError> {
        self.receive(format!("DELETE /assignments/{assignment_id}")).await?;
        let mut tables = self.tables.lock().await;
        let before = tables.assignments.len();
        tables.assignments.retain(|assignment| assignment.id != assignment_id);
        if tables.assignments.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn stats(&self) -> Result<Stats, ApiError> {
        self.receive("GET /stats".into()).await?;
        let tables = self.tables.lock().await;
        let mut by_status = BTreeMap::new();
        for task in &tables.tasks {
            *by_status.entry(task.status.as_str().to_string()).or_insert(0) += 1;
        }
        Ok(Stats {
            total_projects: tables.projects.len(),
            total_tasks: tables.tasks.len(),
            total_users: tables.users.len(),
            by_status,
            recent_activity: tables.tasks.iter().rev().take(5).map(|task| tables.task_view(task)).collect(),
        })
    }
}
