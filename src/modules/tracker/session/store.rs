// Session is the view-state store of one client.
//
// Purpose
// - Single writer of the current user, the current project and the active view.
// - Owns the caches shown to the user: users, dashboard, project listing, task list, task detail.
//
// Responsibilities
// - One entry point per transition. Navigation loads the data for the new view.
// - Every mutation is followed by a re-fetch of the collections the active view shows. Cached
//   entities are replaced, never patched.
// - Outcomes are published as notifications; failures are also returned to the caller.
// - Destructive operations ask for confirmation before any request is issued.
//
// Invariants
// - A response is applied only if the view it was requested for is still current.
// - A failed request leaves the caches as they were.
// - The state lock is never held across a request.

use crate::modules::tracker::adapters::outbound::api_gateway::{
    ApiGateway, ImageUpload, NewAssignment, NewNote, NewProject, NewTask, NewUser, ProjectUpdate, TaskUpdate,
};
use crate::modules::tracker::core::aggregation::{FilterError, ProjectListing, project_listing};
use crate::modules::tracker::core::entities::{Project, Task, User};
use crate::modules::tracker::core::view_state::{Navigation, RefreshTarget, View, ViewState, ViewTicket};
use crate::modules::tracker::core::views::{TaskDetail, TaskListView};
use crate::modules::tracker::core::vocabulary::{Priority, ProjectStatus, TaskStatus};
use crate::modules::tracker::session::errors::SessionError;
use crate::modules::tracker::use_cases::load_dashboard::handler::{DashboardView, LoadDashboardHandler};
use crate::modules::tracker::use_cases::load_projects_with_tasks::handler::LoadProjectsWithTasksHandler;
use crate::modules::tracker::use_cases::load_task_detail::handler::LoadTaskDetailHandler;
use crate::modules::tracker::use_cases::load_task_list::handler::LoadTaskListHandler;
use crate::modules::tracker::use_cases::upload_images::handler::{FileOutcome, UploadImagesHandler, UploadReport};
use crate::shared::core::clock::Clock;
use crate::shared::core::primitives::{AssignmentId, ImageId, ProjectId, TaskId, UserId};
use crate::shared::infrastructure::confirmation::Confirm;
use crate::shared::infrastructure::notifications::{Notification, NotificationSink};
use crate::shared::infrastructure::session_storage::{PersistedSession, SessionStorage};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

const SELECT_USER_FIRST: &str = "Please select a user first";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub estimated_completion: Option<DateTime<Utc>>,
    /// Users to assign once the task exists.
    pub assignees: Vec<UserId>,
}

impl TaskDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: Priority::default(),
            estimated_completion: None,
            assignees: Vec::new(),
        }
    }
}

/// Everything a renderer needs, copied out of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub view: View,
    pub current_user_id: Option<UserId>,
    pub current_project_id: Option<ProjectId>,
    pub users: Vec<User>,
    pub dashboard: Option<DashboardView>,
    pub listing: Option<ProjectListing>,
    pub task_list: Option<TaskListView>,
    pub task_detail: Option<TaskDetail>,
}

struct SessionState {
    view: ViewState,
    users: Vec<User>,
    projects: Vec<Project>,
    dashboard: Option<DashboardView>,
    listing: Option<ProjectListing>,
    task_list: Option<TaskListView>,
    task_detail: Option<TaskDetail>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            view: ViewState::new(None),
            users: Vec::new(),
            projects: Vec::new(),
            dashboard: None,
            listing: None,
            task_list: None,
            task_detail: None,
        }
    }
}

pub struct Session {
    gateway: Arc<dyn ApiGateway>,
    notifications: Arc<dyn NotificationSink>,
    storage: Arc<dyn SessionStorage>,
    clock: Arc<dyn Clock>,
    confirm: Arc<dyn Confirm>,
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new(
        gateway: Arc<dyn ApiGateway>,
        notifications: Arc<dyn NotificationSink>,
        storage: Arc<dyn SessionStorage>,
        clock: Arc<dyn Clock>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            gateway,
            notifications,
            storage,
            clock,
            confirm,
            state: RwLock::new(SessionState::new()),
        }
    }

    // Reads

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            view: state.view.view(),
            current_user_id: state.view.current_user_id(),
            current_project_id: state.view.current_project_id(),
            users: state.users.clone(),
            dashboard: state.dashboard.clone(),
            listing: state.listing.clone(),
            task_list: state.task_list.clone(),
            task_detail: state.task_detail.clone(),
        }
    }

    pub async fn view(&self) -> View {
        self.state.read().await.view.view()
    }

    pub async fn current_user_id(&self) -> Option<UserId> {
        self.state.read().await.view.current_user_id()
    }

    pub async fn current_project_id(&self) -> Option<ProjectId> {
        self.state.read().await.view.current_project_id()
    }

    pub async fn users(&self) -> Vec<User> {
        self.state.read().await.users.clone()
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.state.read().await.projects.clone()
    }

    pub async fn dashboard(&self) -> Option<DashboardView> {
        self.state.read().await.dashboard.clone()
    }

    pub async fn listing(&self) -> Option<ProjectListing> {
        self.state.read().await.listing.clone()
    }

    pub async fn task_list(&self) -> Option<TaskListView> {
        self.state.read().await.task_list.clone()
    }

    pub async fn task_detail(&self) -> Option<TaskDetail> {
        self.state.read().await.task_detail.clone()
    }

    // Start-up and users

    /// Restores the persisted user, loads users and shows the dashboard.
    pub async fn restore(&self) -> Result<(), SessionError> {
        match self.storage.load().await {
            Ok(persisted) => {
                self.state.write().await.view.select_user(persisted.current_user_id);
            }
            Err(error) => tracing::warn!(%error, "persisted session unavailable, starting without a user"),
        }
        if let Err(error) = self.load_users().await {
            tracing::warn!(%error, "failed to load users");
        }
        self.show_dashboard().await
    }

    /// Reloads users. A selected user that no longer exists is cleared.
    pub async fn load_users(&self) -> Result<Vec<User>, SessionError> {
        let users = self.gateway.list_users().await?;
        let vanished = {
            let mut state = self.state.write().await;
            state.users = users.clone();
            state
                .view
                .current_user_id()
                .filter(|user_id| !users.iter().any(|user| user.id == *user_id))
        };
        if let Some(user_id) = vanished {
            tracing::info!(user_id, "selected user no longer exists, clearing selection");
            if let Err(error) = self.select_user(None).await {
                tracing::warn!(%error, "failed to clear the selected user");
            }
        }
        Ok(users)
    }

    /// Changes the current user and persists the choice.
    pub async fn select_user(&self, user_id: Option<UserId>) -> Result<(), SessionError> {
        self.storage
            .save(&PersistedSession {
                current_user_id: user_id,
            })
            .await?;
        let reload = {
            let mut state = self.state.write().await;
            let reload = state.view.select_user(user_id);
            tracing::info!(?user_id, "current user selected");
            reload
        };
        if let Some(ticket) = reload {
            self.load_view(ticket).await?;
        }
        Ok(())
    }

    pub async fn create_user(&self, username: &str, display_name: &str, color: &str) -> Result<User, SessionError> {
        let request = NewUser {
            username: username.to_string(),
            display_name: display_name.to_string(),
            color: color.to_string(),
        };
        let user = match self.gateway.create_user(&request).await {
            Ok(user) => user,
            Err(error) => return Err(self.failed("Failed to create user", error.into()).await),
        };
        self.reload_users().await;
        self.notify(Notification::success("User created successfully!")).await;
        Ok(user)
    }

    pub async fn delete_user(&self, user_id: UserId) -> Result<DeleteOutcome, SessionError> {
        if !self.confirm.confirm(
            "Are you sure you want to delete this user? Their tasks and projects will be reassigned to another user.",
        ) {
            return Ok(DeleteOutcome::Declined);
        }
        let message = match self.gateway.delete_user(user_id).await {
            Ok(message) => message,
            Err(error) => {
                let error = SessionError::from(error);
                return Err(self.failed(&error.to_string(), error).await);
            }
        };
        self.reload_users().await;
        self.reload_active_view().await;
        self.notify(Notification::success(
            message.unwrap_or_else(|| "User deleted successfully".to_string()),
        ))
        .await;
        Ok(DeleteOutcome::Deleted)
    }

    // Navigation

    pub async fn show_dashboard(&self) -> Result<(), SessionError> {
        self.navigate(Navigation::Dashboard).await
    }

    /// The unfiltered project listing. Resets the "my work" filter.
    pub async fn show_projects(&self) -> Result<(), SessionError> {
        self.navigate(Navigation::Projects).await
    }

    pub async fn show_my_work(&self) -> Result<(), SessionError> {
        self.navigate(Navigation::MyWork).await
    }

    pub async fn set_my_work(&self, enabled: bool) -> Result<(), SessionError> {
        self.navigate(Navigation::SetMyWork(enabled)).await
    }

    pub async fn select_project(&self, project_id: ProjectId) -> Result<(), SessionError> {
        self.navigate(Navigation::SelectProject(project_id)).await
    }

    pub async fn back_to_projects(&self) -> Result<(), SessionError> {
        self.navigate(Navigation::BackToProjects).await
    }

    async fn navigate(&self, navigation: Navigation) -> Result<(), SessionError> {
        let ticket = {
            let mut state = self.state.write().await;
            let ticket = state.view.navigate(navigation);
            if ticket.is_ok() {
                state.task_detail = None;
            }
            ticket
        };
        match ticket {
            Ok(ticket) => self.load_view(ticket).await,
            Err(error) => Err(self.failed(SELECT_USER_FIRST, error.into()).await),
        }
    }

    /// Re-fetches what the active view shows, as the periodic refresh does. The project listing
    /// is not refreshed on a timer. Returns what was refreshed.
    pub async fn refresh_active_view(&self) -> Result<Option<RefreshTarget>, SessionError> {
        let (target, ticket) = {
            let state = self.state.read().await;
            (state.view.refresh_target(), state.view.ticket())
        };
        if target.is_some() {
            self.fetch_view(ticket).await?;
        }
        Ok(target)
    }

    /// Loads the data of `ticket`'s view and applies it if that view is still current.
    async fn load_view(&self, ticket: ViewTicket) -> Result<(), SessionError> {
        match self.fetch_view(ticket).await {
            Ok(()) => Ok(()),
            Err(error) if matches!(ticket.view, View::Projects { .. }) => {
                Err(self.failed("Failed to load projects", error).await)
            }
            Err(error) => {
                tracing::warn!(view = ?ticket.view, %error, "failed to load view");
                Err(error)
            }
        }
    }

    async fn fetch_view(&self, ticket: ViewTicket) -> Result<(), SessionError> {
        match ticket.view {
            View::Dashboard => {
                let loaded = LoadDashboardHandler::new(self.gateway.clone()).handle().await?;
                self.apply(ticket, |state| {
                    state.projects = loaded.projects;
                    state.dashboard = Some(loaded.view);
                })
                .await;
            }
            View::Projects { .. } => {
                let filter = self.state.read().await.view.project_filter()?;
                let tree = LoadProjectsWithTasksHandler::new(self.gateway.clone()).handle().await?;
                let listing = project_listing(&tree, filter);
                self.apply(ticket, |state| {
                    state.projects = tree.into_iter().map(|entry| entry.project).collect();
                    state.listing = Some(listing);
                })
                .await;
            }
            View::Tasks { project_id } => {
                let view = LoadTaskListHandler::new(self.gateway.clone(), self.clock.clone())
                    .handle(project_id)
                    .await?;
                self.apply(ticket, |state| state.task_list = Some(view)).await;
            }
        }
        Ok(())
    }

    async fn apply(&self, ticket: ViewTicket, update: impl FnOnce(&mut SessionState)) -> bool {
        let mut state = self.state.write().await;
        if !state.view.is_current(&ticket) {
            tracing::debug!(
                requested = ticket.generation,
                current = state.view.generation(),
                "discarding stale response"
            );
            return false;
        }
        update(&mut *state);
        tracing::info!(view = ?ticket.view, "view updated");
        true
    }

    // Projects

    pub async fn create_project(
        &self,
        name: &str,
        description: &str,
        status: ProjectStatus,
    ) -> Result<Project, SessionError> {
        let created_by = self.require_user(SELECT_USER_FIRST).await?;
        let request = NewProject {
            name: name.to_string(),
            description: description.to_string(),
            status,
            created_by,
        };
        let project = match self.gateway.create_project(&request).await {
            Ok(project) => project,
            Err(error) => return Err(self.failed("Failed to create project", error.into()).await),
        };
        self.reload_active_view().await;
        self.notify(Notification::success("Project created successfully!")).await;
        Ok(project)
    }

    /// Changes the status of the current project, then re-reads it.
    pub async fn change_project_status(&self, status: ProjectStatus) -> Result<Project, SessionError> {
        let project_id = self.require_project().await?;
        let result = match self.gateway.update_project(project_id, &ProjectUpdate { status }).await {
            Ok(_) => self.gateway.get_project(project_id).await,
            Err(error) => Err(error),
        };
        let project = match result {
            Ok(project) => project,
            Err(error) => return Err(self.failed("Failed to update project status", error.into()).await),
        };
        self.reload_active_view().await;
        self.notify(Notification::success("Project status updated!")).await;
        Ok(project)
    }

    pub async fn delete_project(&self, project_id: ProjectId) -> Result<DeleteOutcome, SessionError> {
        if !self
            .confirm
            .confirm("Are you sure you want to delete this project and all of its tasks?")
        {
            return Ok(DeleteOutcome::Declined);
        }
        if let Err(error) = self.gateway.delete_project(project_id).await {
            return Err(self.failed("Failed to delete project", error.into()).await);
        }
        if self.current_project_id().await == Some(project_id) {
            if let Err(error) = self.back_to_projects().await {
                tracing::warn!(%error, "failed to reload projects after deletion");
            }
        } else {
            self.reload_active_view().await;
        }
        self.notify(Notification::success("Project deleted")).await;
        Ok(DeleteOutcome::Deleted)
    }

    // Tasks

    /// Creates a task in the current project, then assigns the drafted users one by one.
    /// A failed assignment is logged and does not fail the creation.
    pub async fn create_task(&self, draft: TaskDraft) -> Result<Task, SessionError> {
        let created_by = self.require_user(SELECT_USER_FIRST).await?;
        let project_id = self.require_project().await?;
        let request = NewTask {
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            assigned_to: None,
            created_by,
            estimated_completion: draft.estimated_completion,
        };
        let task = match self.gateway.create_task(project_id, &request).await {
            Ok(task) => task,
            Err(error) => return Err(self.failed("Failed to create task", error.into()).await),
        };
        for user_id in draft.assignees {
            let assignment = NewAssignment {
                user_id,
                assigned_by: created_by,
            };
            if let Err(error) = self.gateway.create_assignment(task.id, &assignment).await {
                tracing::warn!(task_id = task.id, user_id, %error, "failed to assign user to new task");
            }
        }
        self.reload_active_view().await;
        self.notify(Notification::success("Task created successfully!")).await;
        Ok(task)
    }

    pub async fn change_task_status(&self, task_id: TaskId, status: TaskStatus) -> Result<Task, SessionError> {
        let task = match self.gateway.update_task(task_id, &TaskUpdate::Status { status }).await {
            Ok(task) => task,
            Err(error) => return Err(self.failed("Failed to update task", error.into()).await),
        };
        self.close_task().await;
        self.reload_active_view().await;
        self.notify(Notification::success("Task status updated!")).await;
        Ok(task)
    }

    /// Sets or clears the estimated completion of a task.
    pub async fn update_task_estimate(
        &self,
        task_id: TaskId,
        estimated_completion: Option<DateTime<Utc>>,
    ) -> Result<Task, SessionError> {
        let update = TaskUpdate::EstimatedCompletion {
            estimated_completion,
        };
        let task = match self.gateway.update_task(task_id, &update).await {
            Ok(task) => task,
            Err(error) => return Err(self.failed("Failed to update estimation", error.into()).await),
        };
        self.reload_task_detail(task_id).await;
        self.reload_active_view().await;
        self.notify(Notification::success("Estimation updated!")).await;
        Ok(task)
    }

    pub async fn delete_task(&self, task_id: TaskId) -> Result<DeleteOutcome, SessionError> {
        if !self.confirm.confirm("Are you sure you want to delete this task?") {
            return Ok(DeleteOutcome::Declined);
        }
        if let Err(error) = self.gateway.delete_task(task_id).await {
            return Err(self.failed("Failed to delete task", error.into()).await);
        }
        self.close_task().await;
        self.reload_active_view().await;
        self.notify(Notification::success("Task deleted")).await;
        Ok(DeleteOutcome::Deleted)
    }

    // Task detail

    pub async fn open_task(&self, task_id: TaskId) -> Result<TaskDetail, SessionError> {
        match self.fetch_task_detail(task_id).await {
            Ok(detail) => Ok(detail),
            Err(error) => Err(self.failed("Failed to load task details", error).await),
        }
    }

    pub async fn close_task(&self) {
        self.state.write().await.task_detail = None;
    }

    pub async fn assign_user(&self, task_id: TaskId, user_id: UserId) -> Result<(), SessionError> {
        let assigned_by = self
            .require_user("Please select yourself as current user first")
            .await?;
        let assignment = NewAssignment { user_id, assigned_by };
        if let Err(error) = self.gateway.create_assignment(task_id, &assignment).await {
            let error = SessionError::from(error);
            return Err(self.failed(&error.to_string(), error).await);
        }
        self.reload_task_detail(task_id).await;
        self.reload_active_view().await;
        self.notify(Notification::success("User assigned!")).await;
        Ok(())
    }

    pub async fn unassign(&self, task_id: TaskId, assignment_id: AssignmentId) -> Result<DeleteOutcome, SessionError> {
        if !self.confirm.confirm("Remove this person from the task?") {
            return Ok(DeleteOutcome::Declined);
        }
        if let Err(error) = self.gateway.delete_assignment(assignment_id).await {
            return Err(self.failed("Failed to remove user", error.into()).await);
        }
        self.reload_task_detail(task_id).await;
        self.reload_active_view().await;
        self.notify(Notification::success("User removed from task")).await;
        Ok(DeleteOutcome::Deleted)
    }

    pub async fn add_note(&self, task_id: TaskId, content: &str) -> Result<(), SessionError> {
        let content = content.trim();
        if content.is_empty() {
            let message = "Please enter a note";
            return Err(self
                .failed(message, SessionError::PreconditionFailed(message.to_string()))
                .await);
        }
        let user_id = self.require_user(SELECT_USER_FIRST).await?;
        let note = NewNote {
            content: content.to_string(),
            user_id,
        };
        if let Err(error) = self.gateway.create_note(task_id, &note).await {
            return Err(self.failed("Failed to add note", error.into()).await);
        }
        self.reload_task_detail(task_id).await;
        self.reload_active_view().await;
        self.notify(Notification::success("Note added!")).await;
        Ok(())
    }

    /// Uploads each file on its own. Any failed file makes the result a
    /// `PartialUploadFailure`; the task detail is refreshed either way.
    pub async fn upload_images(&self, task_id: TaskId, files: &[ImageUpload]) -> Result<UploadReport, SessionError> {
        let user_id = self.require_user(SELECT_USER_FIRST).await?;
        if files.is_empty() {
            return Ok(UploadReport::default());
        }
        let report = UploadImagesHandler::new(self.gateway.clone())
            .handle(task_id, user_id, files)
            .await;
        for outcome in &report.outcomes {
            let notification = match outcome {
                FileOutcome::Uploaded { file_name, .. } => Notification::success(format!("Uploaded {file_name}")),
                FileOutcome::Failed { file_name, .. } => Notification::error(format!("Failed to upload {file_name}")),
            };
            self.notify(notification).await;
        }
        self.reload_task_detail(task_id).await;
        self.reload_active_view().await;
        if report.is_complete() {
            Ok(report)
        } else {
            Err(SessionError::PartialUploadFailure(report))
        }
    }

    pub async fn delete_image(&self, task_id: TaskId, image_id: ImageId) -> Result<DeleteOutcome, SessionError> {
        if !self.confirm.confirm("Delete this image?") {
            return Ok(DeleteOutcome::Declined);
        }
        if let Err(error) = self.gateway.delete_image(image_id).await {
            return Err(self.failed("Failed to delete image", error.into()).await);
        }
        self.notify(Notification::success("Image deleted")).await;
        self.reload_task_detail(task_id).await;
        self.reload_active_view().await;
        Ok(DeleteOutcome::Deleted)
    }

    // Helpers

    async fn fetch_task_detail(&self, task_id: TaskId) -> Result<TaskDetail, SessionError> {
        let (ticket, users) = {
            let state = self.state.read().await;
            (state.view.ticket(), state.users.clone())
        };
        let detail = LoadTaskDetailHandler::new(self.gateway.clone(), self.clock.clone())
            .handle(task_id, &users)
            .await?;
        let shown = detail.clone();
        self.apply(ticket, |state| state.task_detail = Some(shown)).await;
        Ok(detail)
    }

    /// Re-fetches the open task detail, if it shows `task_id`.
    async fn reload_task_detail(&self, task_id: TaskId) {
        let open = self
            .state
            .read()
            .await
            .task_detail
            .as_ref()
            .is_some_and(|detail| detail.task.id == task_id);
        if !open {
            return;
        }
        if let Err(error) = self.fetch_task_detail(task_id).await {
            tracing::warn!(task_id, %error, "failed to refresh task detail");
        }
    }

    /// Re-fetches whatever the active view shows, including an unrefreshed project listing.
    /// Failures keep the previous data.
    async fn reload_active_view(&self) {
        let ticket = self.state.read().await.view.ticket();
        if let Err(error) = self.fetch_view(ticket).await {
            tracing::warn!(view = ?ticket.view, %error, "failed to refresh view after a change");
        }
    }

    async fn reload_users(&self) {
        if let Err(error) = self.load_users().await {
            tracing::warn!(%error, "failed to reload users");
        }
    }

    async fn require_user(&self, message: &str) -> Result<UserId, SessionError> {
        match self.current_user_id().await {
            Some(user_id) => Ok(user_id),
            None => Err(self.failed(message, FilterError::NoCurrentUser.into()).await),
        }
    }

    async fn require_project(&self) -> Result<ProjectId, SessionError> {
        match self.current_project_id().await {
            Some(project_id) => Ok(project_id),
            None => {
                let message = "Please select a project first";
                Err(self
                    .failed(message, SessionError::PreconditionFailed(message.to_string()))
                    .await)
            }
        }
    }

    async fn notify(&self, notification: Notification) {
        self.notifications.notify(notification).await;
    }

    /// Publishes `message` as an error notification and hands back `error` for the caller.
    async fn failed(&self, message: &str, error: SessionError) -> SessionError {
        tracing::debug!(%error, message, "session operation failed");
        self.notify(Notification::error(message)).await;
        error
    }
}
