/// Assignment log read service
///
/// The log is append-only and written exclusively by [`TaskService`]
/// commits; this service only reads it back out. Records are denormalized
/// with the owning task's title and priority and whatever is still known
/// about the assigned user.
///
/// [`TaskService`]: crate::service::tasks::TaskService

use crate::error::{ServiceError, ServiceResult};
use crate::models::assignment::Assignment;
use crate::service::dto::AssignmentRecord;
use crate::store::{Store, StoreError};
use std::sync::Arc;
use uuid::Uuid;

/// Read-only view over the assignment audit trail
#[derive(Clone)]
pub struct AssignmentService {
    store: Arc<dyn Store>,
}

impl AssignmentService {
    /// Creates a service over the given store
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Every assignment ever recorded, oldest first
    pub async fn list_all(&self) -> ServiceResult<Vec<AssignmentRecord>> {
        let assignments = self.store.list_assignments().await?;
        self.assemble_all(assignments).await
    }

    /// Looks up one assignment by public id
    pub async fn get_by_id(&self, id: Uuid) -> ServiceResult<AssignmentRecord> {
        let assignment = self.store.find_assignment(id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Assignment with id {} was not found", id))
        })?;
        self.assemble(assignment).await
    }

    /// Assignment history for one task, oldest first
    ///
    /// An unknown task id yields an empty history, not an error; the log
    /// simply has nothing to say about it.
    pub async fn list_by_task(&self, task_id: Uuid) -> ServiceResult<Vec<AssignmentRecord>> {
        let task = match self.store.find_task(task_id).await? {
            Some(task) => task,
            None => return Ok(Vec::new()),
        };

        let assignments = self.store.assignments_for_task(task.id).await?;
        self.assemble_all(assignments).await
    }

    async fn assemble_all(
        &self,
        assignments: Vec<Assignment>,
    ) -> ServiceResult<Vec<AssignmentRecord>> {
        let mut records = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            records.push(self.assemble(assignment).await?);
        }
        Ok(records)
    }

    async fn assemble(&self, assignment: Assignment) -> ServiceResult<AssignmentRecord> {
        // the task must exist: assignment rows are cascade-deleted with it
        let task = self
            .store
            .find_task_by_key(assignment.task_id)
            .await?
            .ok_or_else(|| {
                ServiceError::Persistence(StoreError::BrokenReference(format!(
                    "task {}",
                    assignment.task_id
                )))
            })?;

        let user = match assignment.user_id {
            Some(key) => self.store.find_user_by_key(key).await?,
            None => None,
        };

        Ok(AssignmentRecord {
            id: assignment.public_id,
            task_id: task.public_id,
            task_title: task.title,
            task_priority: task.priority,
            assigned_at: assignment.assigned_at,
            user_id: user.as_ref().map(|u| u.public_id),
            username: user.as_ref().map(|u| u.username.clone()),
            email: user.map(|u| u.email),
        })
    }
}
