// JSON file implementation of the SessionStorage port.
//
// Responsibilities
// - Read the persisted session from a small JSON document; a missing file is an empty session.
// - Write through a sibling temporary file and rename, so a crash never leaves half a document.

use crate::shared::infrastructure::session_storage::{PersistedSession, SessionStorage, StorageError};
use std::path::{Path, PathBuf};

pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load(&self) -> Result<PersistedSession, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PersistedSession::default());
            }
            Err(error) => return Err(StorageError::Io(error.to_string())),
        };
        serde_json::from_str(&raw).map_err(|error| StorageError::Corrupt(error.to_string()))
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| StorageError::Io(error.to_string()))?;
        }
        let body = serde_json::to_string_pretty(session)
            .map_err(|error| StorageError::Corrupt(error.to_string()))?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, body)
            .await
            .map_err(|error| StorageError::Io(error.to_string()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|error| StorageError::Io(error.to_string()))?;
        tracing::debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }
}
