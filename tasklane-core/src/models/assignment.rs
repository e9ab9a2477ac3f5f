/// Assignment log model
///
/// Assignments are an append-only audit trail: one row per "this user was
/// attached to this task at this time" event. Rows are created as a side
/// effect of task creation with a user or of reassignment, and are never
/// mutated afterwards. The only way a row disappears is the cascade delete
/// of its owning task.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE assignments (
///     id BIGSERIAL PRIMARY KEY,
///     public_id UUID NOT NULL UNIQUE,
///     task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     assigned_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Assignment row as persisted
///
/// `user_id` is nullable so history survives the removal of a user: the
/// event that someone was once assigned is kept even when the account is
/// gone.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Assignment {
    /// Surrogate key (internal wiring only)
    pub id: i64,

    /// Externally visible, immutable identifier
    pub public_id: Uuid,

    /// Owning task (surrogate key, required)
    pub task_id: i64,

    /// Assigned user (surrogate key, nullable for historical rows)
    pub user_id: Option<i64>,

    /// When the assignment happened
    pub assigned_at: DateTime<Utc>,
}

/// Input for staging a new assignment row
///
/// The owning task is referenced by public id because the task may be an
/// insert staged in the same unit of work, in which case it has no
/// surrogate key yet; the commit step resolves the linkage.
#[derive(Debug, Clone)]
pub struct NewAssignment {
    /// Pre-generated public identifier
    pub public_id: Uuid,

    /// Public id of the owning task (existing or staged in the same unit)
    pub task_public_id: Uuid,

    /// Surrogate key of the assigned user, if any
    pub user_id: Option<i64>,
}
