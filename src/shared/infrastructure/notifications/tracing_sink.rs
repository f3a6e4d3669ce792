// Notification adapter that writes every notification as a log record.

use crate::shared::infrastructure::notifications::{Notification, NotificationLevel, NotificationSink};

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifications;

#[async_trait::async_trait]
impl NotificationSink for TracingNotifications {
    async fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => tracing::error!(target: "notification", "{}", notification.message),
            NotificationLevel::Success | NotificationLevel::Info => {
                tracing::info!(target: "notification", "{}", notification.message)
            }
        }
    }
}
