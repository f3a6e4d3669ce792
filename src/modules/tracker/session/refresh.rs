// Periodic refresh of the active view.
//
// The first refresh happens one full period after start. A failed refresh is logged and the
// session keeps the data it already shows. Refreshes never overlap: the next tick is awaited only
// after the previous refresh finished.

use crate::modules::tracker::session::store::Session;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(30);

pub struct RefreshScheduler {
    handle: JoinHandle<()>,
}

impl RefreshScheduler {
    pub fn spawn(session: Arc<Session>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match session.refresh_active_view().await {
                    Ok(Some(target)) => tracing::debug!(?target, "refreshed active view"),
                    Ok(None) => tracing::trace!("active view is not refreshed periodically"),
                    Err(error) => tracing::warn!(%error, "periodic refresh failed, keeping previous data"),
                }
            }
        });
        tracing::info!(period_secs = period.as_secs(), "refresh scheduler started");
        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
