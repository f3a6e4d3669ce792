// ViewState is the navigation state machine of a session.
//
// States
// - Dashboard
// - Projects { my_work }      the my-work flag is orthogonal to the listing
// - Tasks { project_id }
//
// Transitions are explicit navigations. Selecting a project always lands on Tasks; going back
// always lands on the unfiltered Projects listing.
//
// Invariants
// - Every navigation advances the generation, and so does switching users under "my work".
//   A response is applied only if it was requested under the generation that is still
//   current (stale-response guard).
// - my_work = true is only reachable with a selected user.
//
// Boundaries
// - No input or output. The session wraps this type and performs the fetches.

use crate::modules::tracker::core::aggregation::{FilterError, ProjectFilter};
use crate::shared::core::primitives::{ProjectId, UserId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Dashboard,
    Projects { my_work: bool },
    Tasks { project_id: ProjectId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Dashboard,
    Projects,
    MyWork,
    SetMyWork(bool),
    SelectProject(ProjectId),
    BackToProjects,
}

/// Proof of the view a request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewTicket {
    pub generation: u64,
    pub view: View,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTarget {
    Dashboard,
    ProjectTasks(ProjectId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    view: View,
    current_user_id: Option<UserId>,
    current_project_id: Option<ProjectId>,
    generation: u64,
}

impl ViewState {
    pub fn new(current_user_id: Option<UserId>) -> Self {
        Self {
            view: View::Dashboard,
            current_user_id,
            current_project_id: None,
            generation: 0,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn current_user_id(&self) -> Option<UserId> {
        self.current_user_id
    }

    pub fn current_project_id(&self) -> Option<ProjectId> {
        self.current_project_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ticket(&self) -> ViewTicket {
        ViewTicket {
            generation: self.generation,
            view: self.view,
        }
    }

    pub fn is_current(&self, ticket: &ViewTicket) -> bool {
        ticket.generation == self.generation && ticket.view == self.view
    }

    pub fn navigate(&mut self, navigation: Navigation) -> Result<ViewTicket, FilterError> {
        let next = match navigation {
            Navigation::Dashboard => View::Dashboard,
            Navigation::Projects | Navigation::BackToProjects | Navigation::SetMyWork(false) => {
                View::Projects { my_work: false }
            }
            Navigation::MyWork | Navigation::SetMyWork(true) => {
                self.current_user_id.ok_or(FilterError::NoCurrentUser)?;
                View::Projects { my_work: true }
            }
            Navigation::SelectProject(project_id) => View::Tasks { project_id },
        };
        Ok(self.enter(next))
    }

    /// Changes the selected user. Clearing the user while "my work" is shown drops the filter;
    /// switching to another user re-enters "my work" so loads for the previous user go stale.
    /// Returns a new ticket when the view has to be reloaded.
    pub fn select_user(&mut self, user_id: Option<UserId>) -> Option<ViewTicket> {
        let changed = self.current_user_id != user_id;
        self.current_user_id = user_id;
        match (user_id, self.view) {
            (None, View::Projects { my_work: true }) => Some(self.enter(View::Projects { my_work: false })),
            (Some(_), View::Projects { my_work: true }) if changed => Some(self.enter(View::Projects { my_work: true })),
            _ => None,
        }
    }

    pub fn project_filter(&self) -> Result<ProjectFilter, FilterError> {
        match self.view {
            View::Projects { my_work } => ProjectFilter::for_view(my_work, self.current_user_id),
            _ => Ok(ProjectFilter::All),
        }
    }

    /// What the periodic refresh should reload for the active view, if anything.
    pub fn refresh_target(&self) -> Option<RefreshTarget> {
        match self.view {
            View::Dashboard => Some(RefreshTarget::Dashboard),
            View::Tasks { project_id } => Some(RefreshTarget::ProjectTasks(project_id)),
            View::Projects { .. } => None,
        }
    }

    fn enter(&mut self, view: View) -> ViewTicket {
        self.view = view;
        self.current_project_id = match view {
            View::Tasks { project_id } => Some(project_id),
            _ => None,
        };
        self.generation += 1;
        self.ticket()
    }
}
