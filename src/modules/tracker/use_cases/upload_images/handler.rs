// Uploads a batch of images to one task, one request per file.
//
// Invariants
// - Files are independent: a failure never stops the remaining uploads.
// - The report lists every file, in the order given, with its own outcome.

use crate::modules::tracker::adapters::outbound::api_gateway::{ApiGateway, ImageUpload};
use crate::shared::core::primitives::{ImageId, TaskId, UserId};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    Uploaded { file_name: String, image_id: ImageId },
    Failed { file_name: String, error: String },
}

impl FileOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            FileOutcome::Uploaded { file_name, .. } | FileOutcome::Failed { file_name, .. } => file_name,
        }
    }

    pub fn is_uploaded(&self) -> bool {
        matches!(self, FileOutcome::Uploaded { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub outcomes: Vec<FileOutcome>,
}

impl UploadReport {
    pub fn uploaded(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_uploaded())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_uploaded())
    }

    pub fn is_complete(&self) -> bool {
        self.failed().next().is_none()
    }
}

impl fmt::Display for UploadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed: Vec<&str> = self.failed().map(FileOutcome::file_name).collect();
        write!(
            f,
            "{} of {} uploads failed: {}",
            failed.len(),
            self.outcomes.len(),
            failed.join(", ")
        )
    }
}

pub struct UploadImagesHandler {
    gateway: Arc<dyn ApiGateway>,
}

impl UploadImagesHandler {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn handle(&self, task_id: TaskId, user_id: UserId, files: &[ImageUpload]) -> UploadReport {
        let mut report = UploadReport::default();
        for file in files {
            let outcome = match self.gateway.upload_image(task_id, user_id, file).await {
                Ok(image) => FileOutcome::Uploaded {
                    file_name: file.file_name.clone(),
                    image_id: image.id,
                },
                Err(error) => {
                    tracing::warn!(task_id, file_name = %file.file_name, %error, "image upload failed");
                    FileOutcome::Failed {
                        file_name: file.file_name.clone(),
                        error: error.to_string(),
                    }
                }
            };
            report.outcomes.push(outcome);
        }
        report
    }
}
