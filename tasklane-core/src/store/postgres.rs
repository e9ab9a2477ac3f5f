/// Postgres store backend
///
/// Implements the capability traits on top of sqlx. Reads run against the
/// pool; `commit` opens one transaction, replays the staged writes in
/// order, and commits. Dropping the transaction on any error rolls the
/// whole unit back.
///
/// # Example
///
/// ```no_run
/// use tasklane_core::store::postgres::PgStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = PgStore::connect("postgresql://localhost/tasklane", 10).await?;
/// store.run_migrations().await?;
/// # Ok(())
/// # }
/// ```

use crate::models::{
    assignment::Assignment,
    task::TaskItem,
    user::{normalize_email, User},
};
use crate::store::{
    AssignmentStore, Committer, IdentityStore, StagedWrite, Store, StoreError, TaskStore,
    UnitOfWork,
};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, public_id, username, email, password_hash, created_at, updated_at";
const TASK_COLUMNS: &str = "id, public_id, title, description, status, priority, deadline, \
                            assignee_id, version, created_at, updated_at";
const ASSIGNMENT_COLUMNS: &str = "id, public_id, task_id, user_id, assigned_at";

/// sqlx-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects a pool to the given database URL
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Wraps an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs all pending embedded migrations
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {}", e)))?;
        Ok(())
    }

    /// Access to the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn find_user(&self, public_id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE public_id = $1",
            USER_COLUMNS
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_key(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE LOWER(TRIM(email)) = $1",
            USER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn list_tasks(&self) -> Result<Vec<TaskItem>, StoreError> {
        let tasks = sqlx::query_as::<_, TaskItem>(&format!(
            "SELECT {} FROM tasks ORDER BY id",
            TASK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn find_task(&self, public_id: Uuid) -> Result<Option<TaskItem>, StoreError> {
        let task = sqlx::query_as::<_, TaskItem>(&format!(
            "SELECT {} FROM tasks WHERE public_id = $1",
            TASK_COLUMNS
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn find_task_by_key(&self, id: i64) -> Result<Option<TaskItem>, StoreError> {
        let task = sqlx::query_as::<_, TaskItem>(&format!(
            "SELECT {} FROM tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }
}

#[async_trait]
impl AssignmentStore for PgStore {
    async fn list_assignments(&self) -> Result<Vec<Assignment>, StoreError> {
        let assignments = sqlx::query_as::<_, Assignment>(&format!(
            "SELECT {} FROM assignments ORDER BY id",
            ASSIGNMENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(assignments)
    }

    async fn find_assignment(&self, public_id: Uuid) -> Result<Option<Assignment>, StoreError> {
        let assignment = sqlx::query_as::<_, Assignment>(&format!(
            "SELECT {} FROM assignments WHERE public_id = $1",
            ASSIGNMENT_COLUMNS
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(assignment)
    }

    async fn assignments_for_task(&self, task_id: i64) -> Result<Vec<Assignment>, StoreError> {
        let assignments = sqlx::query_as::<_, Assignment>(&format!(
            "SELECT {} FROM assignments WHERE task_id = $1 ORDER BY id",
            ASSIGNMENT_COLUMNS
        ))
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(assignments)
    }
}

#[async_trait]
impl Committer for PgStore {
    async fn commit(&self, unit: UnitOfWork) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        // tasks inserted earlier in this unit, keyed by public id, so a
        // staged assignment can reference a task that has no key yet
        let mut inserted_tasks: HashMap<Uuid, i64> = HashMap::new();

        for write in unit.into_writes() {
            match write {
                StagedWrite::InsertUser(user) => {
                    sqlx::query(
                        "INSERT INTO users (public_id, username, email, password_hash) \
                         VALUES ($1, $2, $3, $4)",
                    )
                    .bind(user.public_id)
                    .bind(user.username)
                    .bind(user.email)
                    .bind(user.password_hash)
                    .execute(&mut *tx)
                    .await?;
                }
                StagedWrite::InsertTask(task) => {
                    let (id,): (i64,) = sqlx::query_as(
                        "INSERT INTO tasks \
                         (public_id, title, description, status, priority, deadline, assignee_id) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7) \
                         RETURNING id",
                    )
                    .bind(task.public_id)
                    .bind(task.title)
                    .bind(task.description)
                    .bind(task.status)
                    .bind(task.priority)
                    .bind(task.deadline)
                    .bind(task.assignee_id)
                    .fetch_one(&mut *tx)
                    .await?;
                    inserted_tasks.insert(task.public_id, id);
                }
                StagedWrite::UpdateTask(task) => {
                    let result = sqlx::query(
                        "UPDATE tasks \
                         SET title = $1, description = $2, status = $3, priority = $4, \
                             deadline = $5, assignee_id = $6, updated_at = $7, \
                             version = version + 1 \
                         WHERE id = $8 AND version = $9",
                    )
                    .bind(task.title)
                    .bind(task.description)
                    .bind(task.status)
                    .bind(task.priority)
                    .bind(task.deadline)
                    .bind(task.assignee_id)
                    .bind(task.updated_at)
                    .bind(task.id)
                    .bind(task.version)
                    .execute(&mut *tx)
                    .await?;
                    if result.rows_affected() == 0 {
                        return Err(StoreError::VersionConflict(format!(
                            "task {}",
                            task.public_id
                        )));
                    }
                }
                StagedWrite::DeleteTask { id, version } => {
                    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND version = $2")
                        .bind(id)
                        .bind(version)
                        .execute(&mut *tx)
                        .await?;
                    if result.rows_affected() == 0 {
                        return Err(StoreError::VersionConflict(format!("task {}", id)));
                    }
                }
                StagedWrite::InsertAssignment(assignment) => {
                    let task_id = match inserted_tasks.get(&assignment.task_public_id) {
                        Some(id) => *id,
                        None => {
                            let row: Option<(i64,)> =
                                sqlx::query_as("SELECT id FROM tasks WHERE public_id = $1")
                                    .bind(assignment.task_public_id)
                                    .fetch_optional(&mut *tx)
                                    .await?;
                            row.ok_or_else(|| {
                                StoreError::BrokenReference(format!(
                                    "task {}",
                                    assignment.task_public_id
                                ))
                            })?
                            .0
                        }
                    };
                    sqlx::query(
                        "INSERT INTO assignments (public_id, task_id, user_id) \
                         VALUES ($1, $2, $3)",
                    )
                    .bind(assignment.public_id)
                    .bind(task_id)
                    .bind(assignment.user_id)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
