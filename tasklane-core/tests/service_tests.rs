//! Service-level behavior tests over the in-memory store.
//!
//! These exercise the consistency contract end to end: task writes and
//! assignment log rows move together, failed commits leave no partial
//! state, and reads are stable.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use tasklane_core::auth::jwt::TokenSigner;
use tasklane_core::error::ServiceError;
use tasklane_core::models::task::{Priority, TaskStatus};
use tasklane_core::models::user::{NewUser, User};
use tasklane_core::service::assignments::AssignmentService;
use tasklane_core::service::dto::{
    Credentials, RegisterRequest, TaskCreateRequest, TaskQuery, TaskUpdateRequest,
};
use tasklane_core::service::identity::IdentityService;
use tasklane_core::service::tasks::TaskService;
use tasklane_core::store::memory::MemoryStore;
use tasklane_core::store::{Committer, IdentityStore, StagedWrite, UnitOfWork};

const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

fn services(store: Arc<MemoryStore>) -> (TaskService, AssignmentService, IdentityService) {
    (
        TaskService::new(store.clone()),
        AssignmentService::new(store.clone()),
        IdentityService::new(store, TokenSigner::new(TEST_SECRET, 60)),
    )
}

/// Seeds a user directly through the store, skipping the (slow) Argon2id
/// hash that `register` would run.
async fn seed_user(store: &MemoryStore, username: &str, email: &str) -> User {
    let mut unit = UnitOfWork::new();
    unit.stage(StagedWrite::InsertUser(NewUser {
        public_id: Uuid::new_v4(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$seeded".to_string(),
    }));
    store.commit(unit).await.unwrap();
    store.find_user_by_email(email).await.unwrap().unwrap()
}

fn create_request(title: &str, user_id: Option<Uuid>) -> TaskCreateRequest {
    TaskCreateRequest {
        title: title.to_string(),
        description: None,
        status: TaskStatus::Pending,
        priority: Priority::Medium,
        deadline: Utc::now() + Duration::days(7),
        user_id,
    }
}

#[tokio::test]
async fn test_create_with_user_records_exactly_one_assignment() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, assignments, _) = services(store.clone());
    let alice = seed_user(&store, "alice", "alice@test.com").await;

    let record = tasks
        .create(create_request("Buy groceries", Some(alice.public_id)))
        .await
        .unwrap();

    assert_eq!(record.title, "Buy groceries");
    assert_eq!(record.status, TaskStatus::Pending);
    assert_eq!(record.user_id, Some(alice.public_id));
    assert_eq!(record.username.as_deref(), Some("alice"));
    assert_eq!(record.assignments.len(), 1);
    assert_eq!(record.assignments[0].user_id, Some(alice.public_id));
    assert_eq!(record.assignments[0].task_id, record.id);

    let history = assignments.list_by_task(record.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, record.assignments[0].id);
}

#[tokio::test]
async fn test_create_without_user_records_no_assignment() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, assignments, _) = services(store);

    let record = tasks.create(create_request("Solo task", None)).await.unwrap();

    assert_eq!(record.user_id, None);
    assert!(record.assignments.is_empty());
    assert!(assignments.list_by_task(record.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_with_unknown_user_fails_and_persists_nothing() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, assignments, _) = services(store);

    let err = tasks
        .create(create_request("Orphan", Some(Uuid::new_v4())))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    assert!(tasks.list_all().await.unwrap().is_empty());
    assert!(assignments.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_by_id_is_a_stable_read() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, _, _) = services(store);

    let created = tasks.create(create_request("Stable", None)).await.unwrap();
    let first = tasks.get_by_id(created.id).await.unwrap();
    let second = tasks.get_by_id(created.id).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.title, second.title);
    assert_eq!(first.updated_at, second.updated_at);
}

#[tokio::test]
async fn test_get_by_id_unknown_task_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, _, _) = services(store);

    let err = tasks.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_reassignments_append_history_and_latest_wins() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, assignments, _) = services(store.clone());
    let alice = seed_user(&store, "alice", "alice@test.com").await;
    let bob = seed_user(&store, "bob", "bob@test.com").await;

    let record = tasks
        .create(create_request("Hand-off", Some(alice.public_id)))
        .await
        .unwrap();

    let record = tasks
        .assign_user(record.id, Some(bob.public_id))
        .await
        .unwrap();
    let record = tasks
        .assign_user(record.id, Some(alice.public_id))
        .await
        .unwrap();

    // current assignee reflects the latest change, history keeps all three
    assert_eq!(record.user_id, Some(alice.public_id));
    let history = assignments.list_by_task(record.id).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].user_id, Some(alice.public_id));
    assert_eq!(history[1].user_id, Some(bob.public_id));
    assert_eq!(history[2].user_id, Some(alice.public_id));
}

#[tokio::test]
async fn test_unassign_clears_assignee_but_keeps_history() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, assignments, _) = services(store.clone());
    let alice = seed_user(&store, "alice", "alice@test.com").await;

    let record = tasks
        .create(create_request("Let go", Some(alice.public_id)))
        .await
        .unwrap();
    let record = tasks.assign_user(record.id, None).await.unwrap();

    assert_eq!(record.user_id, None);
    assert_eq!(assignments.list_by_task(record.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_assigning_unknown_user_changes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, _, _) = services(store.clone());
    let alice = seed_user(&store, "alice", "alice@test.com").await;

    let record = tasks
        .create(create_request("Keep", Some(alice.public_id)))
        .await
        .unwrap();

    let err = tasks
        .assign_user(record.id, Some(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let unchanged = tasks.get_by_id(record.id).await.unwrap();
    assert_eq!(unchanged.user_id, Some(alice.public_id));
    assert_eq!(unchanged.assignments.len(), 1);
}

#[tokio::test]
async fn test_failed_commit_leaves_no_partial_state() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, assignments, _) = services(store.clone());
    let alice = seed_user(&store, "alice", "alice@test.com").await;
    let bob = seed_user(&store, "bob", "bob@test.com").await;

    let record = tasks
        .create(create_request("Fragile", Some(alice.public_id)))
        .await
        .unwrap();

    // the reassignment stages an update and a log row; both must vanish
    store.fail_next_commit();
    let err = tasks
        .assign_user(record.id, Some(bob.public_id))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Persistence(_)));

    let unchanged = tasks.get_by_id(record.id).await.unwrap();
    assert_eq!(unchanged.user_id, Some(alice.public_id));
    assert_eq!(assignments.list_by_task(record.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_applies_only_present_fields() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, _, _) = services(store);

    let created = tasks.create(create_request("Draft", None)).await.unwrap();

    let updated = tasks
        .update(
            created.id,
            TaskUpdateRequest {
                title: Some("Final".to_string()),
                description: Some("polished".to_string()),
                deadline: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Final");
    assert_eq!(updated.description.as_deref(), Some("polished"));
    // absent fields stay as they were
    assert_eq!(updated.deadline, created.deadline);
    assert_eq!(updated.status, created.status);
    assert_eq!(updated.priority, created.priority);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn test_status_and_priority_changes_do_not_touch_the_log() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, assignments, _) = services(store.clone());
    let alice = seed_user(&store, "alice", "alice@test.com").await;

    let record = tasks
        .create(create_request("Work it", Some(alice.public_id)))
        .await
        .unwrap();

    let record = tasks
        .update_status(record.id, TaskStatus::Completed)
        .await
        .unwrap();
    assert_eq!(record.status, TaskStatus::Completed);

    let record = tasks
        .update_priority(record.id, Priority::Low)
        .await
        .unwrap();
    assert_eq!(record.priority, Priority::Low);

    assert_eq!(assignments.list_by_task(record.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_removes_task_and_its_history() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, assignments, _) = services(store.clone());
    let alice = seed_user(&store, "alice", "alice@test.com").await;

    let record = tasks
        .create(create_request("Gone soon", Some(alice.public_id)))
        .await
        .unwrap();

    tasks.delete(record.id).await.unwrap();

    let err = tasks.get_by_id(record.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert!(assignments.list_by_task(record.id).await.unwrap().is_empty());
    assert!(assignments.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_filters_and_orders_by_deadline() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, _, _) = services(store);

    let mut near = create_request("Ship release", None);
    near.deadline = Utc::now() + Duration::days(1);
    let mut far = create_request("Ship docs", None);
    far.deadline = Utc::now() + Duration::days(10);
    let other = create_request("Water plants", None);

    tasks.create(near).await.unwrap();
    tasks.create(far).await.unwrap();
    tasks.create(other).await.unwrap();

    let page = tasks
        .search(TaskQuery {
            search: Some("ship".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total_items, 2);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.items[0].title, "Ship docs");
    assert_eq!(page.items[1].title, "Ship release");
}

#[tokio::test]
async fn test_pagination_partitions_the_result_set() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, _, _) = services(store);

    for i in 0..7 {
        let mut request = create_request(&format!("Task {}", i), None);
        request.deadline = Utc::now() + Duration::days(i);
        tasks.create(request).await.unwrap();
    }

    let mut seen = Vec::new();
    for page_number in 1..=3 {
        let page = tasks
            .search(TaskQuery {
                page_number: Some(page_number),
                page_size: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total_items, 7);
        assert_eq!(page.total_pages, 3);
        seen.extend(page.items.into_iter().map(|t| t.id));
    }

    // every task exactly once across the pages
    assert_eq!(seen.len(), 7);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 7);
}

#[tokio::test]
async fn test_zero_page_size_is_a_validation_error() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, _, _) = services(store);

    let err = tasks
        .search(TaskQuery {
            page_size: Some(0),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_assignment_lookup_by_id() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, assignments, _) = services(store.clone());
    let alice = seed_user(&store, "alice", "alice@test.com").await;

    let record = tasks
        .create(create_request("Tracked", Some(alice.public_id)))
        .await
        .unwrap();
    let entry = &record.assignments[0];

    let found = assignments.get_by_id(entry.id).await.unwrap();
    assert_eq!(found.task_id, record.id);
    assert_eq!(found.task_title, "Tracked");
    assert_eq!(found.username.as_deref(), Some("alice"));

    let err = assignments.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_history_for_unknown_task_is_empty() {
    let store = Arc::new(MemoryStore::new());
    let (_, assignments, _) = services(store);

    let history = assignments.list_by_task(Uuid::new_v4()).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_register_then_login_roundtrip() {
    let store = Arc::new(MemoryStore::new());
    let (_, _, identity) = services(store);

    let user = identity
        .register(RegisterRequest {
            username: "carol".to_string(),
            credentials: Credentials {
                email: "carol@test.com".to_string(),
                password: "secret123".to_string(),
            },
        })
        .await
        .unwrap();
    assert_eq!(user.username, "carol");

    let session = identity
        .login(Credentials {
            email: "  CAROL@test.com ".to_string(),
            password: "secret123".to_string(),
        })
        .await
        .unwrap();

    assert!(session.bearer_token.starts_with("Bearer "));
    assert_eq!(session.username, "carol");
    assert!(session.expires_in > 0);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let store = Arc::new(MemoryStore::new());
    let (_, _, identity) = services(store);

    let request = RegisterRequest {
        username: "dave".to_string(),
        credentials: Credentials {
            email: "dave@test.com".to_string(),
            password: "secret123".to_string(),
        },
    };
    identity.register(request.clone()).await.unwrap();

    let mut shouty = request;
    shouty.credentials.email = " DAVE@TEST.COM ".to_string();
    let err = identity.register(shouty).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn test_login_failures_all_look_the_same() {
    let store = Arc::new(MemoryStore::new());
    let (_, _, identity) = services(store);

    identity
        .register(RegisterRequest {
            username: "erin".to_string(),
            credentials: Credentials {
                email: "erin@test.com".to_string(),
                password: "secret123".to_string(),
            },
        })
        .await
        .unwrap();

    let cases = [
        ("erin@test.com", "wrong password"),
        ("nobody@test.com", "secret123"),
        ("erin@test.com", ""),
        ("", "secret123"),
    ];
    for (email, password) in cases {
        let err = identity
            .login(Credentials {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
            .unwrap_err();
        match err {
            ServiceError::Unauthorized(message) => {
                assert_eq!(message, "Incorrect email or password")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_user_with_tasks_lists_only_their_current_tasks() {
    let store = Arc::new(MemoryStore::new());
    let (tasks, _, _) = services(store.clone());
    let alice = seed_user(&store, "alice", "alice@test.com").await;
    let bob = seed_user(&store, "bob", "bob@test.com").await;

    let mut near = create_request("Alice near", Some(alice.public_id));
    near.deadline = Utc::now() + Duration::days(1);
    let mut far = create_request("Alice far", Some(alice.public_id));
    far.deadline = Utc::now() + Duration::days(10);
    tasks.create(near).await.unwrap();
    tasks.create(far).await.unwrap();
    let handed_off = tasks
        .create(create_request("Handed off", Some(alice.public_id)))
        .await
        .unwrap();
    tasks
        .assign_user(handed_off.id, Some(bob.public_id))
        .await
        .unwrap();
    tasks.create(create_request("Unassigned", None)).await.unwrap();

    let record = tasks.user_with_tasks(alice.public_id).await.unwrap();
    assert_eq!(record.username, "alice");
    // current assignments only, deadline-descending
    assert_eq!(record.tasks.len(), 2);
    assert_eq!(record.tasks[0].title, "Alice far");
    assert_eq!(record.tasks[1].title, "Alice near");

    let record = tasks.user_with_tasks(bob.public_id).await.unwrap();
    assert_eq!(record.tasks.len(), 1);
    assert_eq!(record.tasks[0].title, "Handed off");

    let err = tasks.user_with_tasks(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_user_reads() {
    let store = Arc::new(MemoryStore::new());
    let (_, _, identity) = services(store.clone());
    seed_user(&store, "alice", "alice@test.com").await;
    seed_user(&store, "bob", "bob@test.com").await;

    let users = identity.list_all().await.unwrap();
    assert_eq!(users.len(), 2);

    let alice = identity.get_by_id(users[0].id).await.unwrap();
    assert_eq!(alice.username, "alice");

    let err = identity.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}
