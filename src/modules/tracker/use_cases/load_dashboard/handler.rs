// Loads the dashboard: projects grouped by status, plus the server statistics.
//
// Projects and stats are fetched concurrently. Stats are decoration; when they fail the dashboard
// is still shown, without them.

use crate::modules::tracker::adapters::outbound::api_gateway::{ApiError, ApiGateway};
use crate::modules::tracker::core::aggregation::{DashboardColumns, group_dashboard};
use crate::modules::tracker::core::entities::{Project, Stats};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub columns: DashboardColumns,
    pub stats: Option<Stats>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDashboard {
    pub projects: Vec<Project>,
    pub view: DashboardView,
}

pub struct LoadDashboardHandler {
    gateway: Arc<dyn ApiGateway>,
}

impl LoadDashboardHandler {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn handle(&self) -> Result<LoadedDashboard, ApiError> {
        let (projects, stats) = tokio::join!(self.gateway.list_projects(), self.gateway.stats());
        let projects = projects?;
        let stats = stats
            .inspect_err(|error| tracing::warn!(%error, "stats unavailable, dashboard shown without them"))
            .ok();
        Ok(LoadedDashboard {
            view: DashboardView {
                columns: group_dashboard(&projects),
                stats,
            },
            projects,
        })
    }
}
