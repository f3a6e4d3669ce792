use crate::shared::infrastructure::session_storage::{PersistedSession, SessionStorage, StorageError};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemorySessionStorage {
    inner: RwLock<PersistedSession>,
    is_offline: bool,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            inner: RwLock::new(session),
            is_offline: false,
        }
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }
}

#[async_trait::async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn load(&self) -> Result<PersistedSession, StorageError> {
        if self.is_offline {
            return Err(StorageError::Offline);
        }
        Ok(*self.inner.read().await)
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        if self.is_offline {
            return Err(StorageError::Offline);
        }
        *self.inner.write().await = *session;
        Ok(())
    }
}
