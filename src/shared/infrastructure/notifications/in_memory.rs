use crate::shared::infrastructure::notifications::{Notification, NotificationLevel, NotificationSink};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct InMemoryNotifications {
    pub rows: Mutex<Vec<Notification>>,
}

impl InMemoryNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Notification> {
        self.rows.lock().await.clone()
    }

    pub async fn messages(&self, level: NotificationLevel) -> Vec<String> {
        self.rows
            .lock()
            .await
            .iter()
            .filter(|row| row.level == level)
            .map(|row| row.message.clone())
            .collect()
    }

    pub async fn clear(&self) {
        self.rows.lock().await.clear();
    }
}

#[async_trait::async_trait]
impl NotificationSink for InMemoryNotifications {
    async fn notify(&self, notification: Notification) {
        self.rows.lock().await.push(notification);
    }
}
