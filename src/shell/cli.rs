// Command line surface of the client.
//
// Every command drives one session operation and renders what the session then shows as JSON.
// Destructive commands go through the session's confirmation port.

use crate::modules::tracker::adapters::outbound::api_gateway::ImageUpload;
use crate::modules::tracker::core::vocabulary::{Priority, ProjectStatus, TaskStatus};
use crate::modules::tracker::session::refresh::RefreshScheduler;
use crate::modules::tracker::session::store::{Session, TaskDraft};
use crate::shared::core::primitives::{AssignmentId, ImageId, ProjectId, TaskId, UserId};
use crate::shared::core::timestamps::parse_timestamp;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "taskmaster")]
#[command(about = "Client for the TaskMaster project and task tracker")]
#[command(version)]
pub struct Cli {
    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List users
    Users,

    /// Create a user
    UserAdd {
        username: String,
        /// Name shown in the UI, defaults to the username
        #[arg(short, long)]
        display_name: Option<String>,
        #[arg(short, long, default_value = "#3498db")]
        color: String,
    },

    /// Delete a user, reassigning their projects and tasks
    UserDelete { id: UserId },

    /// Select the current user, or clear the selection when no id is given
    SelectUser { id: Option<UserId> },

    /// Show projects grouped by status, with overall stats
    Dashboard,

    /// List projects
    Projects {
        /// Only projects with tasks assigned to the current user
        #[arg(short, long)]
        mine: bool,
    },

    /// Show the tasks of a project
    Tasks { project: ProjectId },

    /// Show one task with its notes, images and assignments
    Task { id: TaskId },

    /// Create a project owned by the current user
    ProjectAdd {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "active", value_parser = project_status)]
        status: ProjectStatus,
    },

    /// Change the status of a project
    ProjectStatus {
        project: ProjectId,
        #[arg(value_parser = project_status)]
        status: ProjectStatus,
    },

    /// Delete a project and all of its tasks
    ProjectDelete { id: ProjectId },

    /// Create a task in a project
    TaskAdd {
        project: ProjectId,
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "starting", value_parser = task_status)]
        status: TaskStatus,
        #[arg(short, long, default_value = "medium", value_parser = priority)]
        priority: Priority,
        /// Estimated completion, RFC 3339 or naive ISO 8601 (UTC)
        #[arg(long, value_parser = timestamp)]
        due: Option<DateTime<Utc>>,
        /// User to assign, repeatable
        #[arg(short, long = "assign")]
        assignees: Vec<UserId>,
    },

    /// Change the status of a task
    TaskStatus {
        id: TaskId,
        #[arg(value_parser = task_status)]
        status: TaskStatus,
    },

    /// Set the estimated completion of a task, or clear it when no date is given
    TaskEstimate {
        id: TaskId,
        #[arg(value_parser = timestamp)]
        due: Option<DateTime<Utc>>,
    },

    /// Delete a task
    TaskDelete { id: TaskId },

    /// Assign a user to a task
    Assign { task: TaskId, user: UserId },

    /// Remove an assignment from a task
    Unassign { task: TaskId, assignment: AssignmentId },

    /// Add a note to a task
    Note { task: TaskId, content: String },

    /// Upload images to a task, one request per file
    Upload {
        task: TaskId,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Delete an image of a task
    ImageDelete { task: TaskId, image: ImageId },

    /// Keep the dashboard, or the tasks of a project, up to date and print every change
    Watch {
        #[arg(short, long)]
        project: Option<ProjectId>,
    },
}

fn known<T>(value: T, is_known: bool, raw: &str) -> Result<T, String> {
    if is_known {
        Ok(value)
    } else {
        Err(format!("unknown value {raw:?}"))
    }
}

fn task_status(raw: &str) -> Result<TaskStatus, String> {
    let status = TaskStatus::from(raw);
    let is_known = status.is_known();
    known(status, is_known, raw)
}

fn project_status(raw: &str) -> Result<ProjectStatus, String> {
    let status = ProjectStatus::from(raw);
    let is_known = status.is_known();
    known(status, is_known, raw)
}

fn priority(raw: &str) -> Result<Priority, String> {
    let priority = Priority::from(raw);
    let is_known = priority.is_known();
    known(priority, is_known, raw)
}

fn timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| format!("invalid timestamp {raw:?}"))
}

fn content_type_for(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    let mime = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => return None,
    };
    Some(mime.to_string())
}

async fn read_upload(path: &Path) -> Result<ImageUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?
        .to_string();
    Ok(ImageUpload {
        file_name,
        content_type: content_type_for(path),
        bytes,
    })
}

/// Runs a one-shot command and returns what it renders.
pub async fn execute(session: &Session, command: Command) -> Result<Value> {
    let rendered = match command {
        Command::Users => json!(session.load_users().await?),
        Command::UserAdd {
            username,
            display_name,
            color,
        } => {
            let display_name = display_name.unwrap_or_else(|| username.clone());
            json!(session.create_user(&username, &display_name, &color).await?)
        }
        Command::UserDelete { id } => json!({ "outcome": session.delete_user(id).await? }),
        Command::SelectUser { id } => {
            session.select_user(id).await?;
            json!({ "current_user_id": session.current_user_id().await })
        }
        Command::Dashboard => {
            session.show_dashboard().await?;
            json!(session.dashboard().await)
        }
        Command::Projects { mine } => {
            if mine {
                session.show_my_work().await?;
            } else {
                session.show_projects().await?;
            }
            json!(session.listing().await)
        }
        Command::Tasks { project } => {
            session.select_project(project).await?;
            json!(session.task_list().await)
        }
        Command::Task { id } => json!(session.open_task(id).await?),
        Command::ProjectAdd {
            name,
            description,
            status,
        } => json!(session.create_project(&name, &description, status).await?),
        Command::ProjectStatus { project, status } => {
            session.select_project(project).await?;
            json!(session.change_project_status(status).await?)
        }
        Command::ProjectDelete { id } => json!({ "outcome": session.delete_project(id).await? }),
        Command::TaskAdd {
            project,
            title,
            description,
            status,
            priority,
            due,
            assignees,
        } => {
            session.select_project(project).await?;
            let draft = TaskDraft {
                title,
                description,
                status,
                priority,
                estimated_completion: due,
                assignees,
            };
            session.create_task(draft).await?;
            json!(session.task_list().await)
        }
        Command::TaskStatus { id, status } => json!(session.change_task_status(id, status).await?),
        Command::TaskEstimate { id, due } => json!(session.update_task_estimate(id, due).await?),
        Command::TaskDelete { id } => json!({ "outcome": session.delete_task(id).await? }),
        Command::Assign { task, user } => {
            session.open_task(task).await?;
            session.assign_user(task, user).await?;
            json!(session.task_detail().await)
        }
        Command::Unassign { task, assignment } => {
            session.open_task(task).await?;
            session.unassign(task, assignment).await?;
            json!(session.task_detail().await)
        }
        Command::Note { task, content } => {
            session.open_task(task).await?;
            session.add_note(task, &content).await?;
            json!(session.task_detail().await)
        }
        Command::Upload { task, files } => {
            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                uploads.push(read_upload(path).await?);
            }
            session.open_task(task).await?;
            json!(session.upload_images(task, &uploads).await?)
        }
        Command::ImageDelete { task, image } => {
            session.open_task(task).await?;
            session.delete_image(task, image).await?;
            json!(session.task_detail().await)
        }
        Command::Watch { .. } => anyhow::bail!("watch runs until interrupted, use `watch` directly"),
    };
    Ok(rendered)
}

/// Shows the dashboard, or the tasks of `project`, and keeps it refreshed. Every snapshot that
/// differs from the previous one is handed to `render`.
pub async fn watch(
    session: Arc<Session>,
    project: Option<ProjectId>,
    period: Duration,
    mut render: impl FnMut(&Value),
) -> Result<()> {
    match project {
        Some(project_id) => session.select_project(project_id).await?,
        None => session.show_dashboard().await?,
    }
    let _scheduler = RefreshScheduler::spawn(session.clone(), period);
    let mut last = Value::Null;
    let mut poll = tokio::time::interval(Duration::from_secs(1));
    loop {
        poll.tick().await;
        let snapshot = json!(session.snapshot().await);
        if snapshot != last {
            render(&snapshot);
            last = snapshot;
        }
    }
}
