//! Record services over a freshly created database.

use chrono::{Days, Timelike};
use postbot_common::chrono_utils;
use postbot_common::config::Config;
use postbot_database::services::{post, request, user};
use postbot_database::Database;
use tempfile::TempDir;

struct TestDb {
    database: Database,
    _dir: TempDir,
}

async fn setup_test_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let database = Database::open_path(dir.path().join("services.db"), &Config::default());
    database.update_tables().await.unwrap();

    TestDb { database, _dir: dir }
}

// ============================================================================
// Users and requests
// ============================================================================

#[tokio::test]
async fn test_create_or_find_user_is_idempotent() {
    let test_db = setup_test_db().await;
    let service = user::Service::new(test_db.database.connect().await.unwrap());

    let created = service
        .create_or_find_user(7, "member".to_owned(), "Alan".to_owned(), "alan".to_owned())
        .await
        .unwrap();
    let found = service
        .create_or_find_user(7, "banned".to_owned(), "Other".to_owned(), "other".to_owned())
        .await
        .unwrap();

    assert_eq!(created, found);
    assert_eq!(found.status, "member");

    let updated = service.set_status(7, "admin".to_owned()).await.unwrap();
    assert_eq!(updated.status, "admin");
    assert_eq!(updated.user_id, 7);
    assert_eq!(service.get_user_by_id(7).await.unwrap(), Some(updated));

    assert!(matches!(
        service.set_status(8, "admin".to_owned()).await,
        Err(user::Error::NotFound(8))
    ));

    test_db.database.close().await.unwrap();
}

#[tokio::test]
async fn test_request_lifecycle() {
    let test_db = setup_test_db().await;
    let db = test_db.database.connect().await.unwrap();
    let users = user::Service::new(db.clone());
    let requests = request::Service::new(db);

    users
        .create_or_find_user(1, "member".to_owned(), "Edsger".to_owned(), "edsger".to_owned())
        .await
        .unwrap();

    let first = requests.open_request(1).await.unwrap();
    let second = requests.open_request(1).await.unwrap();
    assert!(first.is_open());
    assert_eq!(requests.list_open_requests(1).await.unwrap(), vec![first.clone(), second.clone()]);

    let closed = requests.close_request(first.request_id, Some("done".to_owned())).await.unwrap();
    assert!(!closed.is_open());
    assert!(closed.closed_at.unwrap() >= closed.opened_at);
    assert_eq!(closed.request_status.as_deref(), Some("done"));

    assert_eq!(requests.list_open_requests(1).await.unwrap(), vec![second]);
    assert_eq!(users.list_requests(1).await.unwrap().len(), 2);
    assert_eq!(requests.get_request(first.request_id).await.unwrap(), Some(closed));

    assert!(matches!(
        requests.close_request(first.request_id, None).await,
        Err(request::Error::AlreadyClosed(id)) if id == first.request_id
    ));
    assert!(matches!(
        requests.close_request(9999, None).await,
        Err(request::Error::NotFound(9999))
    ));

    test_db.database.close().await.unwrap();
}

#[tokio::test]
async fn test_open_request_for_unknown_user_fails() {
    let test_db = setup_test_db().await;
    let requests = request::Service::new(test_db.database.connect().await.unwrap());

    assert!(matches!(
        requests.open_request(404).await,
        Err(request::Error::DatabaseError(_))
    ));

    test_db.database.close().await.unwrap();
}

// ============================================================================
// Posts and schedules
// ============================================================================

#[tokio::test]
async fn test_schedule_entry_validation() {
    let test_db = setup_test_db().await;
    let posts = post::Service::new(test_db.database.connect().await.unwrap());

    let created = posts.create_post(-100500, 12).await.unwrap();
    assert_eq!(created.times_sent, 0);

    assert!(matches!(
        posts.add_schedule_entry(created.post_id, 0, 24, 0).await,
        Err(post::Error::DatabaseError(_))
    ));
    assert!(matches!(
        posts.add_schedule_entry(created.post_id + 1, 0, 12, 0).await,
        Err(post::Error::PostNotFound(_))
    ));

    let friday = posts.add_schedule_entry(created.post_id, 4, 18, 0).await.unwrap();
    let monday = posts.add_schedule_entry(created.post_id, 0, 9, 30).await.unwrap();
    assert_eq!(posts.list_schedule(created.post_id).await.unwrap(), vec![monday, friday]);

    test_db.database.close().await.unwrap();
}

#[tokio::test]
async fn test_due_entries_fire_once_per_slot() {
    let test_db = setup_test_db().await;
    let posts = post::Service::new(test_db.database.connect().await.unwrap());

    let created = posts.create_post(-100500, 12).await.unwrap();
    let entry = posts.add_schedule_entry(created.post_id, 2, 12, 0).await.unwrap();

    // Freshly scheduled entries wait for their next slot.
    assert!(posts.due_entries(chrono_utils::now()).await.unwrap().is_empty());

    let later = chrono_utils::now().checked_add_days(Days::new(8)).unwrap();
    let due = posts.due_entries(later).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].0.entry_id, entry.entry_id);
    assert_eq!(due[0].1, created);

    let invoked = posts.mark_invoked(entry.entry_id, later).await.unwrap();
    assert_eq!(invoked.last_invoked, chrono_utils::to_timestamp(later));
    assert_eq!(
        chrono_utils::from_timestamp(invoked.last_invoked),
        later.with_nanosecond(0),
    );
    assert!(posts.due_entries(later).await.unwrap().is_empty());

    let sent = posts.get_post(created.post_id).await.unwrap().unwrap();
    assert_eq!(sent.times_sent, 1);

    assert!(matches!(
        posts.mark_invoked(entry.entry_id + 1, later).await,
        Err(post::Error::EntryNotFound(_))
    ));

    test_db.database.close().await.unwrap();
}

#[tokio::test]
async fn test_delete_post_removes_schedule() {
    let test_db = setup_test_db().await;
    let posts = post::Service::new(test_db.database.connect().await.unwrap());

    let created = posts.create_post(-100500, 12).await.unwrap();
    posts.add_schedule_entry(created.post_id, 1, 8, 0).await.unwrap();
    posts.add_schedule_entry(created.post_id, 3, 8, 0).await.unwrap();

    posts.delete_post(created.post_id).await.unwrap();

    assert_eq!(posts.get_post(created.post_id).await.unwrap(), None);
    assert!(posts.list_schedule(created.post_id).await.unwrap().is_empty());
    assert!(matches!(
        posts.delete_post(created.post_id).await,
        Err(post::Error::PostNotFound(_))
    ));

    test_db.database.close().await.unwrap();
}
