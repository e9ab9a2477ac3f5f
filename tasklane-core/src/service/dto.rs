/// Service-boundary records and requests
///
/// Everything crossing the service boundary speaks public ids; surrogate
/// keys never leave the store layer. Records are fully denormalized so the
/// adapter layer can serialize them without further lookups.

use crate::models::task::{Priority, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A task as reported to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Public id of the task
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Current lifecycle status
    pub status: TaskStatus,

    /// Current priority
    pub priority: Priority,

    /// Deadline
    pub deadline: DateTime<Utc>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,

    /// Public id of the current assignee, when assigned
    pub user_id: Option<Uuid>,

    /// Username of the current assignee
    pub username: Option<String>,

    /// Email of the current assignee
    pub email: Option<String>,

    /// Full assignment history for this task, oldest first
    pub assignments: Vec<AssignmentRecord>,
}

/// One entry of a task's assignment history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRecord {
    /// Public id of the assignment
    pub id: Uuid,

    /// Public id of the task the assignment belongs to
    pub task_id: Uuid,

    /// Title of the task at read time
    pub task_title: String,

    /// Priority of the task at read time
    pub task_priority: Priority,

    /// When the assignment was recorded
    pub assigned_at: DateTime<Utc>,

    /// Public id of the assigned user, `None` once the user is deleted
    pub user_id: Option<Uuid>,

    /// Username of the assigned user
    pub username: Option<String>,

    /// Email of the assigned user
    pub email: Option<String>,
}

/// A user as reported to callers (never includes the password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Public id of the user
    pub id: Uuid,

    /// Username
    pub username: String,

    /// Email address
    pub email: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// A user together with every task currently assigned to them
#[derive(Debug, Clone, Serialize)]
pub struct UserWithTasksRecord {
    /// Public id of the user
    pub id: Uuid,

    /// Username
    pub username: String,

    /// Email address
    pub email: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,

    /// Tasks whose current assignee is this user, deadline-descending
    pub tasks: Vec<TaskRecord>,
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Ready-to-use Authorization header value ("Bearer <token>")
    pub bearer_token: String,

    /// Username of the authenticated user
    pub username: String,

    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// Request to create a task
#[derive(Debug, Clone, Deserialize)]
pub struct TaskCreateRequest {
    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status
    pub status: TaskStatus,

    /// Initial priority
    pub priority: Priority,

    /// Deadline
    pub deadline: DateTime<Utc>,

    /// Public id of the initial assignee, when assigning at creation
    pub user_id: Option<Uuid>,
}

/// Partial update of a task's descriptive fields
///
/// Absent fields are left unchanged. Status, priority, and assignee
/// changes go through their dedicated operations, not this generic path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdateRequest {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New deadline
    pub deadline: Option<DateTime<Utc>>,
}

/// Login credentials
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// Email address
    pub email: String,

    /// Plaintext password
    pub password: String,
}

/// Registration request
///
/// Embeds [`Credentials`] rather than repeating its fields, so login and
/// registration share one credential shape.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Desired username
    pub username: String,

    /// Email and password for the new account
    #[serde(flatten)]
    pub credentials: Credentials,
}

/// Filter, search, and pagination parameters for task queries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskQuery {
    /// Case-insensitive substring matched against title and description
    pub search: Option<String>,

    /// Keep only tasks in this status
    pub status: Option<TaskStatus>,

    /// Keep only tasks at this priority
    pub priority: Option<Priority>,

    /// 1-based page number; defaults to 1
    pub page_number: Option<u32>,

    /// Page size; defaults to 10
    pub page_size: Option<u32>,
}

/// One page of task records
#[derive(Debug, Clone, Serialize)]
pub struct TaskPage {
    /// Records on this page, deadline-descending
    pub items: Vec<TaskRecord>,

    /// 1-based page number served
    pub page_number: u32,

    /// Page size used
    pub page_size: u32,

    /// Total matching records across all pages
    pub total_items: usize,

    /// Total number of pages
    pub total_pages: u32,
}
