/// In-memory store backend
///
/// Backs the capability traits with plain maps behind a mutex. Used by the
/// test suites and by DB-less runs of the API. Commit validates every
/// staged write before applying any of them, so a rejected unit of work
/// leaves the maps untouched, the same all-or-nothing contract the
/// Postgres backend gets from transactions.
///
/// `fail_next_commit` injects a one-shot backend failure, for exercising
/// commit-failure paths without a real database.

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
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, TaskItem>,
    assignments: BTreeMap<i64, Assignment>,
    next_user_id: i64,
    next_task_id: i64,
    next_assignment_id: i64,
    fail_next_commit: bool,
}

/// Map-backed store for tests and DB-less runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `commit` fail with a backend error
    ///
    /// One-shot: the flag clears after the failed commit.
    pub fn fail_next_commit(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_next_commit = true;
        }
    }

    fn locked(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

impl Inner {
    fn task_key_by_public(&self, public_id: Uuid) -> Option<i64> {
        self.tasks
            .values()
            .find(|t| t.public_id == public_id)
            .map(|t| t.id)
    }

    /// Rejects the unit before anything is applied. Holding the lock across
    /// both phases makes validate-then-apply atomic.
    fn validate(&self, writes: &[StagedWrite]) -> Result<(), StoreError> {
        let mut pending_emails: HashSet<String> = HashSet::new();
        let mut pending_tasks: HashSet<Uuid> = HashSet::new();

        for write in writes {
            match write {
                StagedWrite::InsertUser(user) => {
                    let normalized = normalize_email(&user.email);
                    let taken = self
                        .users
                        .values()
                        .any(|u| normalize_email(&u.email) == normalized)
                        || pending_emails.contains(&normalized);
                    if taken {
                        return Err(StoreError::UniqueViolation("users.email".to_string()));
                    }
                    pending_emails.insert(normalized);
                }
                StagedWrite::InsertTask(task) => {
                    if let Some(assignee) = task.assignee_id {
                        if !self.users.contains_key(&assignee) {
                            return Err(StoreError::BrokenReference(format!(
                                "user {}",
                                assignee
                            )));
                        }
                    }
                    pending_tasks.insert(task.public_id);
                }
                StagedWrite::UpdateTask(task) => {
                    let current = self.tasks.get(&task.id).ok_or_else(|| {
                        StoreError::BrokenReference(format!("task {}", task.public_id))
                    })?;
                    if current.version != task.version {
                        return Err(StoreError::VersionConflict(format!(
                            "task {}",
                            task.public_id
                        )));
                    }
                    if let Some(assignee) = task.assignee_id {
                        if !self.users.contains_key(&assignee) {
                            return Err(StoreError::BrokenReference(format!(
                                "user {}",
                                assignee
                            )));
                        }
                    }
                }
                StagedWrite::DeleteTask { id, version } => {
                    let current = self
                        .tasks
                        .get(id)
                        .ok_or_else(|| StoreError::BrokenReference(format!("task {}", id)))?;
                    if current.version != *version {
                        return Err(StoreError::VersionConflict(format!(
                            "task {}",
                            current.public_id
                        )));
                    }
                }
                StagedWrite::InsertAssignment(assignment) => {
                    let known = pending_tasks.contains(&assignment.task_public_id)
                        || self.task_key_by_public(assignment.task_public_id).is_some();
                    if !known {
                        return Err(StoreError::BrokenReference(format!(
                            "task {}",
                            assignment.task_public_id
                        )));
                    }
                    if let Some(user_id) = assignment.user_id {
                        if !self.users.contains_key(&user_id) {
                            return Err(StoreError::BrokenReference(format!("user {}", user_id)));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, writes: Vec<StagedWrite>) {
        let now = Utc::now();
        let mut inserted_tasks: HashMap<Uuid, i64> = HashMap::new();

        for write in writes {
            match write {
                StagedWrite::InsertUser(user) => {
                    self.next_user_id += 1;
                    let id = self.next_user_id;
                    self.users.insert(
                        id,
                        User {
                            id,
                            public_id: user.public_id,
                            username: user.username,
                            email: user.email,
                            password_hash: user.password_hash,
                            created_at: now,
                            updated_at: now,
                        },
                    );
                }
                StagedWrite::InsertTask(task) => {
                    self.next_task_id += 1;
                    let id = self.next_task_id;
                    inserted_tasks.insert(task.public_id, id);
                    self.tasks.insert(
                        id,
                        TaskItem {
                            id,
                            public_id: task.public_id,
                            title: task.title,
                            description: task.description,
                            status: task.status,
                            priority: task.priority,
                            deadline: task.deadline,
                            assignee_id: task.assignee_id,
                            version: 0,
                            created_at: now,
                            updated_at: now,
                        },
                    );
                }
                StagedWrite::UpdateTask(mut task) => {
                    task.version += 1;
                    self.tasks.insert(task.id, task);
                }
                StagedWrite::DeleteTask { id, .. } => {
                    self.tasks.remove(&id);
                    // cascade, like the FK in the SQL schema
                    self.assignments.retain(|_, a| a.task_id != id);
                }
                StagedWrite::InsertAssignment(assignment) => {
                    // staged-in-this-unit tasks take precedence over lookups
                    let task_id = inserted_tasks
                        .get(&assignment.task_public_id)
                        .copied()
                        .or_else(|| self.task_key_by_public(assignment.task_public_id));
                    let Some(task_id) = task_id else {
                        // validate() already guaranteed resolvability
                        continue;
                    };
                    self.next_assignment_id += 1;
                    let id = self.next_assignment_id;
                    self.assignments.insert(
                        id,
                        Assignment {
                            id,
                            public_id: assignment.public_id,
                            task_id,
                            user_id: assignment.user_id,
                            assigned_at: now,
                        },
                    );
                }
            }
        }
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.locked()?.users.values().cloned().collect())
    }

    async fn find_user(&self, public_id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .locked()?
            .users
            .values()
            .find(|u| u.public_id == public_id)
            .cloned())
    }

    async fn find_user_by_key(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.locked()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let normalized = normalize_email(email);
        Ok(self
            .locked()?
            .users
            .values()
            .find(|u| normalize_email(&u.email) == normalized)
            .cloned())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_tasks(&self) -> Result<Vec<TaskItem>, StoreError> {
        Ok(self.locked()?.tasks.values().cloned().collect())
    }

    async fn find_task(&self, public_id: Uuid) -> Result<Option<TaskItem>, StoreError> {
        Ok(self
            .locked()?
            .tasks
            .values()
            .find(|t| t.public_id == public_id)
            .cloned())
    }

    async fn find_task_by_key(&self, id: i64) -> Result<Option<TaskItem>, StoreError> {
        Ok(self.locked()?.tasks.get(&id).cloned())
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn list_assignments(&self) -> Result<Vec<Assignment>, StoreError> {
        Ok(self.locked()?.assignments.values().cloned().collect())
    }

    async fn find_assignment(&self, public_id: Uuid) -> Result<Option<Assignment>, StoreError> {
        Ok(self
            .locked()?
            .assignments
            .values()
            .find(|a| a.public_id == public_id)
            .cloned())
    }

    async fn assignments_for_task(&self, task_id: i64) -> Result<Vec<Assignment>, StoreError> {
        Ok(self
            .locked()?
            .assignments
            .values()
            .filter(|a| a.task_id == task_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Committer for MemoryStore {
    async fn commit(&self, unit: UnitOfWork) -> Result<(), StoreError> {
        let mut inner = self.locked()?;
        if inner.fail_next_commit {
            inner.fail_next_commit = false;
            return Err(StoreError::Backend("injected commit failure".to_string()));
        }
        let writes = unit.into_writes();
        inner.validate(&writes)?;
        inner.apply(writes);
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.locked().map(|_| ())
    }
}
