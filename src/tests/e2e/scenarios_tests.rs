use crate::modules::tracker::adapters::outbound::api_gateway::{ApiGateway, ImageUpload};
use crate::modules::tracker::core::aggregation::{ProjectFilter, project_listing};
use crate::modules::tracker::core::entities::TaskStats;
use crate::modules::tracker::core::time::{TimeUnit, is_overdue, time_remaining};
use crate::modules::tracker::core::views::AssigneeDisplay;
use crate::modules::tracker::core::vocabulary::{ProjectStatus, TaskStatus};
use crate::modules::tracker::session::errors::SessionError;
use crate::modules::tracker::use_cases::load_projects_with_tasks::handler::LoadProjectsWithTasksHandler;
use crate::shared::infrastructure::notifications::NotificationLevel;
use crate::tests::fixtures::world::World;
use chrono::Duration;

fn png(name: &str) -> ImageUpload {
    ImageUpload {
        file_name: name.to_string(),
        content_type: Some("image/png".to_string()),
        bytes: vec![137, 80, 78, 71, 13, 10, 26, 10],
    }
}

#[tokio::test]
async fn my_work_counts_only_the_tasks_of_the_current_user() {
    let world = World::new();
    let seven = world.user("seven").await;
    let three = world.user("three").await;
    let project_a = world.project("Project A", ProjectStatus::Active, &seven).await;
    let done = world.task(&project_a, "shipped", TaskStatus::Done, &seven).await;
    let busy = world.task(&project_a, "building", TaskStatus::InProgress, &three).await;
    world.assign(&done, &[&seven]).await;
    world.assign(&busy, &[&three]).await;
    let harness = world.session();
    harness.session.select_user(Some(seven.id)).await.unwrap();

    harness.session.show_my_work().await.unwrap();

    let listing = harness.session.listing().await.unwrap();
    assert_eq!(listing.cards.len(), 1);
    assert_eq!(listing.cards[0].project_id, project_a.id);
    assert_eq!(
        listing.cards[0].task_stats,
        TaskStats {
            starting: 0,
            in_progress: 0,
            ongoing: 0,
            done: 1,
        }
    );
    assert_eq!(listing.cards[0].task_count, 1);
}

#[tokio::test]
async fn my_work_is_idempotent_and_skips_empty_projects() {
    let world = World::new();
    let ada = world.user("ada").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    world.project("Empty", ProjectStatus::Active, &ada).await;
    let task = world.task(&launch, "first", TaskStatus::Ongoing, &ada).await;
    world.assign(&task, &[&ada]).await;

    let tree = LoadProjectsWithTasksHandler::new(world.gateway.clone())
        .handle()
        .await
        .unwrap();
    let first = project_listing(&tree, ProjectFilter::AssignedTo(ada.id));
    let second = project_listing(&tree, ProjectFilter::AssignedTo(ada.id));

    assert_eq!(first, second);
    assert_eq!(first.cards.len(), 1);
    assert_eq!(first.cards[0].name, "Launch");
    assert_eq!(project_listing(&tree, ProjectFilter::All).cards.len(), 2);
}

#[tokio::test]
async fn an_ongoing_task_fifty_hours_late_is_two_days_overdue() {
    let world = World::new();
    let ada = world.user("ada").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let task = world.task(&launch, "late", TaskStatus::Ongoing, &ada).await;
    let deadline = world.clock.0 - Duration::hours(50);
    let harness = world.session();
    harness.session.select_project(launch.id).await.unwrap();

    harness.session.update_task_estimate(task.id, Some(deadline)).await.unwrap();

    assert!(is_overdue(Some(deadline), &TaskStatus::Ongoing, world.clock.0));
    let remaining = time_remaining(deadline, world.clock.0);
    assert!(remaining.overdue);
    assert_eq!((remaining.unit, remaining.value), (TimeUnit::Days, 2));

    let list = harness.session.task_list().await.unwrap();
    let row = &list.tasks[0];
    assert!(row.timing.overdue);
    assert_eq!(row.timing.remaining, Some(remaining));
    assert_eq!(remaining.describe(), "Overdue by 2 days");
}

#[tokio::test]
async fn removing_the_only_assignee_leaves_the_task_unassigned() {
    let world = World::new();
    let ada = world.user("ada").await;
    let linus = world.user("linus").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let task = world.task(&launch, "first", TaskStatus::Starting, &ada).await;
    world.assign(&task, &[&linus]).await;
    let harness = world.session();
    harness.session.select_user(Some(ada.id)).await.unwrap();
    harness.session.select_project(launch.id).await.unwrap();
    assert_eq!(
        harness.session.task_list().await.unwrap().tasks[0].assignees.label(),
        "linus"
    );

    harness.session.delete_user(linus.id).await.unwrap();

    let list = harness.session.task_list().await.unwrap();
    assert_eq!(list.tasks.len(), 1);
    assert_eq!(list.tasks[0].assignees, AssigneeDisplay::Unassigned);
    assert_eq!(list.tasks[0].assignees.label(), "Unassigned");

    harness.session.show_my_work().await.unwrap();
    let listing = harness.session.listing().await.unwrap();
    assert!(listing.cards.is_empty());
    assert_eq!(
        listing.empty_message.as_deref(),
        Some("No projects with tasks assigned to you")
    );
}

#[tokio::test]
async fn a_failed_upload_does_not_stop_the_others() {
    let world = World::new();
    let ada = world.user("ada").await;
    let launch = world.project("Launch", ProjectStatus::Active, &ada).await;
    let task = world.task(&launch, "screens", TaskStatus::InProgress, &ada).await;
    world.gateway.fail_uploads_named("two.png").await;
    let harness = world.session();
    harness.session.select_user(Some(ada.id)).await.unwrap();
    harness.session.open_task(task.id).await.unwrap();

    let result = harness
        .session
        .upload_images(task.id, &[png("one.png"), png("two.png"), png("three.png")])
        .await;

    let report = match result {
        Err(SessionError::PartialUploadFailure(report)) => report,
        other => panic!("expected a partial upload failure, got {other:?}"),
    };
    assert_eq!(report.uploaded().count(), 2);
    assert_eq!(report.failed().count(), 1);
    assert_eq!(
        harness.notifications.messages(NotificationLevel::Success).await,
        vec!["Uploaded one.png", "Uploaded three.png"]
    );
    assert_eq!(
        harness.notifications.messages(NotificationLevel::Error).await,
        vec!["Failed to upload two.png"]
    );

    let detail = harness.session.task_detail().await.unwrap();
    let names: Vec<&str> = detail
        .images
        .iter()
        .map(|row| row.image.original_filename.as_str())
        .collect();
    assert_eq!(names, vec!["three.png", "one.png"]);
    assert_eq!(world.gateway.list_images(task.id).await.unwrap().len(), 2);
}
