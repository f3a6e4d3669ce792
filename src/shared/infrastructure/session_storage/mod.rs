// Session storage port.
//
// Purpose
// - Persist the small slice of session state that must survive a restart: the selected user.
//
// Boundaries
// - Current project and view mode are deliberately not persisted.

pub mod file;
pub mod in_memory;

use crate::shared::core::primitives::UserId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage io error: {0}")]
    Io(String),

    #[error("session storage is corrupt: {0}")]
    Corrupt(String),

    #[error("session storage offline")]
    Offline,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default)]
    pub current_user_id: Option<UserId>,
}

#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn load(&self) -> Result<PersistedSession, StorageError>;
    async fn save(&self, session: &PersistedSession) -> Result<(), StorageError>;
}
