/// Task model and lifecycle enums
///
/// A `TaskItem` is the root of the aggregate: the task row plus its
/// append-only assignment history form one consistency boundary. The task
/// carries a weak reference to its current assignee; the authoritative
/// record of who was attached when lives in the assignment log.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     public_id UUID NOT NULL UNIQUE,
///     title VARCHAR(100) NOT NULL,
///     description VARCHAR(500),
///     status VARCHAR(20) NOT NULL,
///     priority VARCHAR(10) NOT NULL,
///     deadline TIMESTAMPTZ NOT NULL,
///     assignee_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     version BIGINT NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Workflow state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been created but work has not started
    #[default]
    Pending,

    /// Task is actively being worked on
    InProgress,

    /// Task finished successfully
    Completed,

    /// Task was abandoned
    Cancelled,
}

impl TaskStatus {
    /// Converts status to its storage string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Checks if the task can still change (open tasks only)
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }
}

/// Priority scale for tasks
///
/// Ordered from `None` (unset) to `High`; the derive order makes
/// `Priority::Low < Priority::High` hold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(rename_all = "snake_case")]
pub enum Priority {
    /// No priority assigned
    None,

    /// Low priority
    Low,

    /// Medium priority
    Medium,

    /// High priority
    High,
}

impl Priority {
    /// Converts priority to its storage string
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::None => "none",
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// Task row as persisted
///
/// `id` is the store-internal surrogate key and never leaves the service
/// layer; `public_id` is the immutable handle clients see. `version` is a
/// concurrency token: staged updates carry the version observed at load
/// time and the commit step rejects the write when the row has moved on.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskItem {
    /// Surrogate key (internal wiring only)
    pub id: i64,

    /// Externally visible, immutable identifier
    pub public_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Current workflow state
    pub status: TaskStatus,

    /// Current priority
    pub priority: Priority,

    /// When the task is due
    pub deadline: DateTime<Utc>,

    /// Surrogate key of the current assignee, if any
    pub assignee_id: Option<i64>,

    /// Concurrency token, bumped on every committed update
    pub version: i64,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for staging a new task
///
/// Surrogate key and timestamps are assigned by the store at commit time;
/// the public id is generated up front so other staged writes in the same
/// unit of work can reference the task before it exists.
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Pre-generated public identifier
    pub public_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status
    pub status: TaskStatus,

    /// Initial priority
    pub priority: Priority,

    /// Due date
    pub deadline: DateTime<Utc>,

    /// Surrogate key of the initial assignee, if one was resolved
    pub assignee_id: Option<i64>,
}
