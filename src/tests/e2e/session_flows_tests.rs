use crate::modules::tracker::adapters::outbound::api_gateway::ApiGateway;
use crate::modules::tracker::core::view_state::View;
use crate::modules::tracker::core::views::AssigneeDisplay;
use crate::modules::tracker::core::vocabulary::{ProjectStatus, TaskStatus};
use crate::modules::tracker::session::errors::SessionError;
use crate::modules::tracker::session::store::{DeleteOutcome, TaskDraft};
use crate::shared::infrastructure::notifications::NotificationLevel;
use crate::shared::infrastructure::session_storage::{PersistedSession, SessionStorage};
use crate::tests::fixtures::world::World;
use chrono::Duration;

#[tokio::test]
async fn restores_the_persisted_user_and_lands_on_the_dashboard() {
    let world = World::new();
    let ada = world.user("ada").await;
    world.project("Launch", ProjectStatus::Active, &ada).await;
    let harness = world.session_with(
        true,
        PersistedSession {
            current_user_id: Some(ada.id),
        },
    );

    harness.session.restore().await.unwrap();

    let snapshot = harness.session.snapshot().await;
    assert_eq!(snapshot.view, View::Dashboard);
    assert_eq!(snapshot.current_user_id, Some(ada.id));
    assert_eq!(snapshot.users, vec![ada]);
    let dashboard = snapshot.dashboard.unwrap();
    assert_eq!(dashboard.columns.active_projects(), 1);
    assert!(dashboard.stats.is_some());
}

#[tokio::test]
async fn clears_a_persisted_user_that_no_longer_exists() {
    let world = World::new();
    world.user("ada").await;
    let harness = world.session_with(
        true,
        PersistedSession {
            current_user_id: Some(999),
        },
    );

    harness.session.restore().await.unwrap();

    assert_eq!(harness.session.current_user_id().await, None);
    assert_eq!(harness.storage.load().await.unwrap().current_user_id, None);
}

#[tokio::test]
async fn refuses_my_work_without_a_current_user() {
    let world = World::new();
    let harness = world.session();

    let result = harness.session.show_my_work().await;

    assert_eq!(
        result,
        Err(SessionError::PreconditionFailed("Please select a user first".into()))
    );
    assert_eq!(harness.session.view().await, View::Dashboard);
    assert_eq!(
        harness.notifications.messages(NotificationLevel::Error).await,
        vec!["Please select a user first"]
    );
    assert!(world.gateway.requests().await.is_empty());
}

#[tokio::test]
async fn follows_the_current_user_while_my_work_is_shown() {
    let world = World::new();
    let ada = world.user("ada").await;
    let grace = world.user("grace").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let audit = world.project("Audit", ProjectStatus::OnHold, &ada).await;
    let draft = world.task(&launch, "draft", TaskStatus::Ongoing, &ada).await;
    let review = world.task(&audit, "review", TaskStatus::Done, &ada).await;
    world.assign(&draft, &[&ada]).await;
    world.assign(&review, &[&grace]).await;
    let harness = world.session();

    harness.session.select_user(Some(ada.id)).await.unwrap();
    harness.session.show_my_work().await.unwrap();
    let listing = harness.session.listing().await.unwrap();
    assert_eq!(listing.filter_user_id, Some(ada.id));
    assert_eq!(listing.cards.len(), 1);
    assert_eq!(listing.cards[0].project_id, launch.id);
    assert!(listing.cards[0].assigned_only);

    harness.session.select_user(Some(grace.id)).await.unwrap();
    let listing = harness.session.listing().await.unwrap();
    assert_eq!(listing.filter_user_id, Some(grace.id));
    assert_eq!(listing.cards.len(), 1);
    assert_eq!(listing.cards[0].project_id, audit.id);
    assert_eq!(listing.cards[0].task_stats.done, 1);

    harness.session.select_user(None).await.unwrap();
    assert_eq!(harness.session.view().await, View::Projects { my_work: false });
    assert_eq!(harness.session.listing().await.unwrap().cards.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn discards_a_response_for_a_view_that_was_left() {
    let world = World::new();
    let ada = world.user("ada").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    world.task(&launch, "first", TaskStatus::Starting, &ada).await;
    let harness = world.session();
    world.gateway.set_latency(Some(std::time::Duration::from_secs(5))).await;

    let slow = tokio::spawn({
        let session = harness.session.clone();
        async move { session.show_projects().await }
    });
    while world.gateway.count_requests("GET /projects").await == 0 {
        tokio::task::yield_now().await;
    }
    world.gateway.set_latency(None).await;
    harness.session.show_dashboard().await.unwrap();

    slow.await.unwrap().unwrap();

    assert_eq!(harness.session.view().await, View::Dashboard);
    assert!(harness.session.dashboard().await.is_some());
    assert_eq!(harness.session.listing().await, None);
}

#[tokio::test(start_paused = true)]
async fn discards_my_work_loaded_for_the_previous_user() {
    let world = World::new();
    let ada = world.user("ada").await;
    let grace = world.user("grace").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let audit = world.project("Audit", ProjectStatus::Active, &ada).await;
    let draft = world.task(&launch, "draft", TaskStatus::Ongoing, &ada).await;
    let review = world.task(&audit, "review", TaskStatus::Starting, &ada).await;
    world.assign(&draft, &[&ada]).await;
    world.assign(&review, &[&grace]).await;
    let harness = world.session();
    harness.session.select_user(Some(ada.id)).await.unwrap();
    world.gateway.set_latency(Some(std::time::Duration::from_secs(5))).await;

    let slow = tokio::spawn({
        let session = harness.session.clone();
        async move { session.show_my_work().await }
    });
    while world.gateway.count_requests("GET /projects").await == 0 {
        tokio::task::yield_now().await;
    }
    world.gateway.set_latency(None).await;
    harness.session.select_user(Some(grace.id)).await.unwrap();

    slow.await.unwrap().unwrap();

    assert_eq!(harness.session.current_user_id().await, Some(grace.id));
    assert_eq!(harness.session.view().await, View::Projects { my_work: true });
    let listing = harness.session.listing().await.unwrap();
    assert_eq!(listing.filter_user_id, Some(grace.id));
    let names: Vec<&str> = listing.cards.iter().map(|card| card.name.as_str()).collect();
    assert_eq!(names, vec!["Audit"]);
}

#[tokio::test]
async fn keeps_the_task_when_deletion_is_declined() {
    let world = World::new();
    let ada = world.user("ada").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let task = world.task(&launch, "first", TaskStatus::Starting, &ada).await;
    let harness = world.session_with(false, PersistedSession::default());

    let outcome = harness.session.delete_task(task.id).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Declined);
    assert_eq!(world.gateway.count_requests(&format!("DELETE /tasks/{}", task.id)).await, 0);
    assert!(world.gateway.get_task(task.id).await.is_ok());
    assert!(harness.notifications.all().await.is_empty());
}

#[tokio::test]
async fn returns_to_projects_when_the_open_project_is_deleted() {
    let world = World::new();
    let ada = world.user("ada").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    world.project("Audit", ProjectStatus::Active, &ada).await;
    let harness = world.session();
    harness.session.select_project(launch.id).await.unwrap();

    let outcome = harness.session.delete_project(launch.id).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(harness.session.view().await, View::Projects { my_work: false });
    assert_eq!(harness.session.current_project_id().await, None);
    let listing = harness.session.listing().await.unwrap();
    assert_eq!(listing.cards.len(), 1);
    assert_eq!(listing.cards[0].name, "Audit");
    assert_eq!(
        harness.notifications.messages(NotificationLevel::Success).await,
        vec!["Project deleted"]
    );
}

#[tokio::test]
async fn creates_a_task_and_assigns_the_drafted_users() {
    let world = World::new();
    let ada = world.user("ada").await;
    let grace = world.user("grace").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let harness = world.session();
    harness.session.select_user(Some(ada.id)).await.unwrap();
    harness.session.select_project(launch.id).await.unwrap();

    let mut draft = TaskDraft::titled("Write release notes");
    draft.assignees = vec![ada.id, grace.id, 999];
    let task = harness.session.create_task(draft).await.unwrap();

    assert_eq!(task.created_by, ada.id);
    assert_eq!(task.assigned_to, None);
    let list = harness.session.task_list().await.unwrap();
    assert_eq!(list.tasks.len(), 1);
    assert_eq!(list.tasks[0].assignees.label(), "ada, grace");
    assert_eq!(list.stats.starting, 1);
    assert_eq!(
        harness.notifications.messages(NotificationLevel::Success).await,
        vec!["Task created successfully!"]
    );
}

#[tokio::test]
async fn asks_for_a_project_before_creating_a_task() {
    let world = World::new();
    let ada = world.user("ada").await;
    let harness = world.session();
    harness.session.select_user(Some(ada.id)).await.unwrap();

    let result = harness.session.create_task(TaskDraft::titled("orphan")).await;

    assert_eq!(
        result,
        Err(SessionError::PreconditionFailed("Please select a project first".into()))
    );
    let requests = world.gateway.requests().await;
    assert!(!requests.iter().any(|request| request.starts_with("POST")));
}

#[tokio::test]
async fn leaves_the_task_list_untouched_when_an_update_fails() {
    let world = World::new();
    let ada = world.user("ada").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let task = world.task(&launch, "first", TaskStatus::Starting, &ada).await;
    let harness = world.session();
    harness.session.select_project(launch.id).await.unwrap();
    let before = harness.session.task_list().await;
    world.gateway.fail_requests_to(&format!("PUT /tasks/{}", task.id)).await;

    let result = harness.session.change_task_status(task.id, TaskStatus::Done).await;

    assert_eq!(
        result,
        Err(SessionError::RequestFailed("API call failed: Internal Server Error".into()))
    );
    assert_eq!(harness.session.task_list().await, before);
    assert_eq!(
        harness.notifications.messages(NotificationLevel::Error).await,
        vec!["Failed to update task"]
    );
}

#[tokio::test]
async fn moves_a_task_through_its_lifecycle() {
    let world = World::new();
    let ada = world.user("ada").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let task = world.task(&launch, "first", TaskStatus::Starting, &ada).await;
    let harness = world.session();
    harness.session.select_project(launch.id).await.unwrap();

    let started = harness
        .session
        .change_task_status(task.id, TaskStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(started.started_at, Some(world.clock.0));

    let done = harness.session.change_task_status(task.id, TaskStatus::Done).await.unwrap();
    assert_eq!(done.completed_at, Some(world.clock.0));

    let list = harness.session.task_list().await.unwrap();
    assert_eq!(list.stats.done, 1);
    assert_eq!(list.tasks[0].status_label, "✅ Done");
    assert_eq!(list.tasks[0].completed.as_deref(), Some("Just now"));

    let reopened = harness.session.change_task_status(task.id, TaskStatus::Ongoing).await.unwrap();
    assert_eq!(reopened.completed_at, None);
}

#[tokio::test]
async fn reflects_a_new_estimate_in_the_open_detail() {
    let world = World::new();
    let ada = world.user("ada").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let task = world.task(&launch, "first", TaskStatus::Ongoing, &ada).await;
    let harness = world.session();
    harness.session.select_project(launch.id).await.unwrap();
    harness.session.open_task(task.id).await.unwrap();

    let deadline = world.clock.0 + Duration::hours(5);
    harness.session.update_task_estimate(task.id, Some(deadline)).await.unwrap();

    let detail = harness.session.task_detail().await.unwrap();
    assert_eq!(detail.task.estimated_completion, Some(deadline));
    let remaining = detail.timing.remaining.unwrap();
    assert_eq!(remaining.describe(), "5 hours remaining");
    assert!(!detail.timing.overdue);
}

#[tokio::test]
async fn assigns_and_removes_people_from_the_open_detail() {
    let world = World::new();
    let ada = world.user("ada").await;
    let grace = world.user("grace").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let task = world.task(&launch, "first", TaskStatus::Starting, &ada).await;
    let harness = world.session();
    harness.session.select_user(Some(ada.id)).await.unwrap();
    harness.session.load_users().await.unwrap();
    harness.session.open_task(task.id).await.unwrap();

    harness.session.assign_user(task.id, grace.id).await.unwrap();
    let detail = harness.session.task_detail().await.unwrap();
    assert_eq!(detail.assignments.len(), 1);
    assert_eq!(detail.assignable_users, vec![ada.clone()]);

    let again = harness.session.assign_user(task.id, grace.id).await;
    assert_eq!(
        again,
        Err(SessionError::RequestFailed("User already assigned to this task".into()))
    );

    let assignment_id = detail.assignments[0].id;
    let outcome = harness.session.unassign(task.id, assignment_id).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
    let detail = harness.session.task_detail().await.unwrap();
    assert!(detail.assignments.is_empty());
    assert_eq!(detail.assignable_users.len(), 2);
    assert_eq!(
        harness.notifications.messages(NotificationLevel::Error).await,
        vec!["User already assigned to this task"]
    );
}

#[tokio::test]
async fn requires_a_current_user_to_assign() {
    let world = World::new();
    let ada = world.user("ada").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let task = world.task(&launch, "first", TaskStatus::Starting, &ada).await;
    let harness = world.session();

    let result = harness.session.assign_user(task.id, ada.id).await;

    assert!(matches!(result, Err(SessionError::PreconditionFailed(_))));
    assert_eq!(
        harness.notifications.messages(NotificationLevel::Error).await,
        vec!["Please select yourself as current user first"]
    );
}

#[tokio::test]
async fn rejects_an_empty_note_before_any_request() {
    let world = World::new();
    let ada = world.user("ada").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let task = world.task(&launch, "first", TaskStatus::Starting, &ada).await;
    let harness = world.session();
    harness.session.select_user(Some(ada.id)).await.unwrap();
    world.gateway.clear_requests().await;

    let result = harness.session.add_note(task.id, "   ").await;

    assert_eq!(result, Err(SessionError::PreconditionFailed("Please enter a note".into())));
    assert!(world.gateway.requests().await.is_empty());
}

#[tokio::test]
async fn shows_a_new_note_first_in_the_open_detail() {
    let world = World::new();
    let ada = world.user("ada").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let task = world.task(&launch, "first", TaskStatus::Starting, &ada).await;
    let harness = world.session();
    harness.session.select_user(Some(ada.id)).await.unwrap();
    harness.session.open_task(task.id).await.unwrap();

    harness.session.add_note(task.id, "kick-off done").await.unwrap();
    harness.session.add_note(task.id, "  waiting on review ").await.unwrap();

    let detail = harness.session.task_detail().await.unwrap();
    let contents: Vec<&str> = detail.notes.iter().map(|row| row.note.content.as_str()).collect();
    assert_eq!(contents, vec!["waiting on review", "kick-off done"]);
    assert_eq!(detail.notes[0].posted, "Just now");
    assert_eq!(detail.task.note_count, 2);
}

#[tokio::test]
async fn counts_a_new_note_in_the_task_list() {
    let world = World::new();
    let ada = world.user("ada").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let task = world.task(&launch, "first", TaskStatus::Starting, &ada).await;
    let harness = world.session();
    harness.session.select_user(Some(ada.id)).await.unwrap();
    harness.session.select_project(launch.id).await.unwrap();
    harness.session.open_task(task.id).await.unwrap();

    harness.session.add_note(task.id, "hello").await.unwrap();

    assert_eq!(harness.session.task_detail().await.unwrap().task.note_count, 1);
    let list = harness.session.task_list().await.unwrap();
    assert_eq!(list.tasks[0].note_count, 1);
}

#[tokio::test]
async fn reports_the_server_message_when_a_user_is_deleted() {
    let world = World::new();
    let ada = world.user("ada").await;
    let grace = world.user("grace").await;
    let launch = world.project("Launch", ProjectStatus::Active, &grace).await;
    world.task(&launch, "first", TaskStatus::Starting, &grace).await;
    let harness = world.session();
    harness.session.select_user(Some(grace.id)).await.unwrap();

    let outcome = harness.session.delete_user(grace.id).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(harness.session.users().await, vec![ada.clone()]);
    assert_eq!(harness.session.current_user_id().await, None);
    assert_eq!(world.gateway.get_project(launch.id).await.unwrap().created_by, ada.id);
    assert_eq!(
        harness.notifications.messages(NotificationLevel::Success).await,
        vec!["User deleted. 1 projects and 1 tasks reassigned."]
    );
}

#[tokio::test]
async fn surfaces_a_duplicate_username() {
    let world = World::new();
    world.user("ada").await;
    let harness = world.session();

    let result = harness.session.create_user("ada", "Ada", "#e74c3c").await;

    assert_eq!(result, Err(SessionError::RequestFailed("Username already exists".into())));
    assert_eq!(
        harness.notifications.messages(NotificationLevel::Error).await,
        vec!["Failed to create user"]
    );
}

#[tokio::test]
async fn updates_the_status_of_the_open_project() {
    let world = World::new();
    let ada = world.user("ada").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let harness = world.session();
    harness.session.select_project(launch.id).await.unwrap();

    let project = harness
        .session
        .change_project_status(ProjectStatus::Completed)
        .await
        .unwrap();

    assert_eq!(project.status, ProjectStatus::Completed);
    let list = harness.session.task_list().await.unwrap();
    assert_eq!(list.project.status, ProjectStatus::Completed);
    assert_eq!(list.project_status_label, "✅ Completed");
}

#[tokio::test]
async fn shows_unassigned_tasks_with_an_upper_case_priority() {
    let world = World::new();
    let ada = world.user("ada").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    world.task(&launch, "first", TaskStatus::Starting, &ada).await;
    let harness = world.session();

    harness.session.select_project(launch.id).await.unwrap();

    let list = harness.session.task_list().await.unwrap();
    assert_eq!(list.tasks[0].assignees, AssigneeDisplay::Unassigned);
    assert_eq!(list.tasks[0].priority_badge, "MEDIUM");
}
