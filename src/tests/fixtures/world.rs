// A seeded in-memory tracker for loader, session and scenario tests.

use crate::modules::tracker::adapters::outbound::api_gateway::{
    ApiGateway, NewAssignment, NewProject, NewTask, NewUser,
};
use crate::modules::tracker::adapters::outbound::api_gateway_in_memory::InMemoryApiGateway;
use crate::modules::tracker::core::entities::{Project, Task, User};
use crate::modules::tracker::core::vocabulary::{Priority, ProjectStatus, TaskStatus};
use crate::modules::tracker::session::store::Session;
use crate::shared::core::clock::FixedClock;
use crate::shared::infrastructure::confirmation::FixedAnswer;
use crate::shared::infrastructure::notifications::in_memory::InMemoryNotifications;
use crate::shared::infrastructure::session_storage::PersistedSession;
use crate::shared::infrastructure::session_storage::in_memory::InMemorySessionStorage;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
}

pub struct SessionHarness {
    pub session: Arc<Session>,
    pub notifications: Arc<InMemoryNotifications>,
    pub storage: Arc<InMemorySessionStorage>,
}

pub struct World {
    pub clock: Arc<FixedClock>,
    pub gateway: Arc<InMemoryApiGateway>,
}

#[allow(dead_code)]
impl World {
    pub fn new() -> Self {
        let clock = Arc::new(FixedClock(fixed_now()));
        let gateway = Arc::new(InMemoryApiGateway::new(clock.clone()));
        Self { clock, gateway }
    }

    /// A session over this world that answers every confirmation with `answer`.
    pub fn session_with(&self, answer: bool, persisted: PersistedSession) -> SessionHarness {
        let notifications = Arc::new(InMemoryNotifications::new());
        let storage = Arc::new(InMemorySessionStorage::with_session(persisted));
        let session = Arc::new(Session::new(
            self.gateway.clone(),
            notifications.clone(),
            storage.clone(),
            self.clock.clone(),
            Arc::new(FixedAnswer(answer)),
        ));
        SessionHarness {
            session,
            notifications,
            storage,
        }
    }

    pub fn session(&self) -> SessionHarness {
        self.session_with(true, PersistedSession::default())
    }

    pub async fn user(&self, username: &str) -> User {
        self.gateway
            .create_user(&NewUser {
                username: username.to_string(),
                display_name: username.to_string(),
                color: "#3498db".to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn project(&self, name: &str, status: ProjectStatus, created_by: &User) -> Project {
        self.gateway
            .create_project(&NewProject {
                name: name.to_string(),
                description: String::new(),
                status,
                created_by: created_by.id,
            })
            .await
            .unwrap()
    }

    pub async fn task(&self, project: &Project, title: &str, status: TaskStatus, created_by: &User) -> Task {
        self.gateway
            .create_task(
                project.id,
                &NewTask {
                    title: title.to_string(),
                    description: String::new(),
                    status,
                    priority: Priority::Medium,
                    assigned_to: None,
                    created_by: created_by.id,
                    estimated_completion: None,
                },
            )
            .await
            .unwrap()
    }

    pub async fn assign(&self, task: &Task, users: &[&User]) {
        for user in users {
            self.gateway
                .create_assignment(
                    task.id,
                    &NewAssignment {
                        user_id: user.id,
                        assigned_by: task.created_by,
                    },
                )
                .await
                .unwrap();
        }
    }
}
