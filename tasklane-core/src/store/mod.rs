/// Persistence capabilities and the unit-of-work coordinator
///
/// Services never write to storage directly. Reads go through the
/// capability traits below; writes are staged into a request-scoped
/// [`UnitOfWork`] and handed to [`Committer::commit`], which applies every
/// staged write atomically or not at all. Two backends implement the
/// traits: [`memory::MemoryStore`] (tests, DB-less runs) and
/// [`postgres::PgStore`] (production, sqlx transactions).
///
/// # Example
///
/// ```no_run
/// use tasklane_core::store::{memory::MemoryStore, Committer, UnitOfWork, StagedWrite};
/// use tasklane_core::models::user::NewUser;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
///
/// let mut unit = UnitOfWork::new();
/// unit.stage(StagedWrite::InsertUser(NewUser {
///     public_id: Uuid::new_v4(),
///     username: "alice".to_string(),
///     email: "alice@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }));
/// store.commit(unit).await?;
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use crate::models::{
    assignment::{Assignment, NewAssignment},
    task::{NewTask, TaskItem},
    user::{NewUser, User},
};
use async_trait::async_trait;
use uuid::Uuid;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint was violated (e.g. duplicate email)
    #[error("unique constraint violated on {0}")]
    UniqueViolation(String),

    /// A staged update/delete carried a stale concurrency token
    ///
    /// The row was modified by another operation between load and commit.
    /// Nothing from the unit of work was applied; the caller may reload
    /// and retry.
    #[error("concurrent modification of {0}")]
    VersionConflict(String),

    /// A staged write references a row that does not exist
    #[error("staged write references unknown row: {0}")]
    BrokenReference(String),

    /// The backing store itself failed
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // 23505 = unique_violation
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// A single write staged for atomic commit
///
/// Updates and deletes carry the `version` token observed when the row was
/// loaded; the commit step rejects the whole unit with
/// [`StoreError::VersionConflict`] when the stored version differs.
#[derive(Debug, Clone)]
pub enum StagedWrite {
    /// Insert a new user row
    InsertUser(NewUser),

    /// Insert a new task row
    InsertTask(NewTask),

    /// Replace a task row, guarded by its concurrency token
    UpdateTask(TaskItem),

    /// Delete a task row (cascades to its assignments)
    DeleteTask {
        /// Surrogate key of the task
        id: i64,
        /// Version observed at load time
        version: i64,
    },

    /// Append an assignment log row
    InsertAssignment(NewAssignment),
}

/// Request-scoped batch of staged writes
///
/// One unit of work per inbound operation, never shared across concurrent
/// callers. Staging records intent only; nothing touches storage until the
/// unit is passed to [`Committer::commit`].
#[derive(Debug, Default)]
pub struct UnitOfWork {
    writes: Vec<StagedWrite>,
}

impl UnitOfWork {
    /// Creates an empty unit of work
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a write for the next commit
    pub fn stage(&mut self, write: StagedWrite) {
        self.writes.push(write);
    }

    /// Number of staged writes
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// True when nothing has been staged
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Consumes the unit, yielding its writes in staging order
    pub fn into_writes(self) -> Vec<StagedWrite> {
        self.writes
    }
}

/// Read access to user rows
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// All users, ordered by surrogate key
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Looks up a user by public id
    async fn find_user(&self, public_id: Uuid) -> Result<Option<User>, StoreError>;

    /// Looks up a user by surrogate key
    async fn find_user_by_key(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Looks up a user by email under normalized comparison
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// Read access to task rows
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks, ordered by surrogate key
    async fn list_tasks(&self) -> Result<Vec<TaskItem>, StoreError>;

    /// Looks up a task by public id
    async fn find_task(&self, public_id: Uuid) -> Result<Option<TaskItem>, StoreError>;

    /// Looks up a task by surrogate key
    async fn find_task_by_key(&self, id: i64) -> Result<Option<TaskItem>, StoreError>;
}

/// Read access to the assignment log
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// All assignment rows, oldest first
    async fn list_assignments(&self) -> Result<Vec<Assignment>, StoreError>;

    /// Looks up an assignment by public id
    async fn find_assignment(&self, public_id: Uuid) -> Result<Option<Assignment>, StoreError>;

    /// History for one task, oldest first; empty when the task has none
    async fn assignments_for_task(&self, task_id: i64) -> Result<Vec<Assignment>, StoreError>;
}

/// Atomic application of a unit of work
#[async_trait]
pub trait Committer: Send + Sync {
    /// Applies every staged write in one atomic step
    ///
    /// On error nothing from the unit is observable afterwards.
    async fn commit(&self, unit: UnitOfWork) -> Result<(), StoreError>;
}

/// Full persistence capability required by the services
#[async_trait]
pub trait Store: IdentityStore + TaskStore + AssignmentStore + Committer {
    /// Cheap connectivity probe for health reporting
    async fn ping(&self) -> Result<(), StoreError>;
}
