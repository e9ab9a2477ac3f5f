/// Task lifecycle service
///
/// Every mutating operation follows the same shape: load the rows it
/// touches, validate, stage the writes into one [`UnitOfWork`], commit, and
/// reload the result. A task and its assignment log rows change together or
/// not at all; nothing here writes outside a commit.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasklane_core::service::tasks::TaskService;
/// use tasklane_core::service::dto::TaskCreateRequest;
/// use tasklane_core::store::memory::MemoryStore;
/// use tasklane_core::models::task::{Priority, TaskStatus};
/// use chrono::{Duration, Utc};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = TaskService::new(Arc::new(MemoryStore::new()));
/// let record = service
///     .create(TaskCreateRequest {
///         title: "Buy groceries".to_string(),
///         description: None,
///         status: TaskStatus::Pending,
///         priority: Priority::Medium,
///         deadline: Utc::now() + Duration::days(1),
///         user_id: None,
///     })
///     .await?;
/// assert!(record.assignments.is_empty());
/// # Ok(())
/// # }
/// ```

use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    assignment::{Assignment, NewAssignment},
    task::{NewTask, Priority, TaskItem, TaskStatus},
    user::User,
};
use crate::service::dto::{
    AssignmentRecord, TaskCreateRequest, TaskPage, TaskQuery, TaskRecord, TaskUpdateRequest,
    UserWithTasksRecord,
};
use crate::service::query::{self, PageWindow};
use crate::store::{StagedWrite, Store, UnitOfWork};
use std::sync::Arc;
use uuid::Uuid;

/// Service coordinating tasks and their assignment log
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
}

impl TaskService {
    /// Creates a service over the given store
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All tasks, deadline-descending
    pub async fn list_all(&self) -> ServiceResult<Vec<TaskRecord>> {
        let mut tasks = self.store.list_tasks().await?;
        query::sort(&mut tasks);

        let mut records = Vec::with_capacity(tasks.len());
        for task in tasks {
            records.push(self.assemble(task).await?);
        }
        Ok(records)
    }

    /// Filtered, ordered, paginated view of the tasks
    pub async fn search(&self, params: TaskQuery) -> ServiceResult<TaskPage> {
        let window = PageWindow::resolve(&params)?;

        let tasks = self.store.list_tasks().await?;
        let mut matching = query::filter(tasks, &params);
        query::sort(&mut matching);

        let total_items = matching.len();
        let page = query::paginate(matching, window);

        let mut items = Vec::with_capacity(page.len());
        for task in page {
            items.push(self.assemble(task).await?);
        }

        Ok(TaskPage {
            items,
            page_number: window.page_number,
            page_size: window.page_size,
            total_items,
            total_pages: window.total_pages(total_items),
        })
    }

    /// Looks up a user together with the tasks currently assigned to them
    ///
    /// Returns `NotFound` for an unknown user; a user with no assigned
    /// tasks gets an empty list.
    pub async fn user_with_tasks(&self, user_id: Uuid) -> ServiceResult<UserWithTasksRecord> {
        let user = self.resolve_user(user_id).await?;

        let mut owned: Vec<TaskItem> = self
            .store
            .list_tasks()
            .await?
            .into_iter()
            .filter(|task| task.assignee_id == Some(user.id))
            .collect();
        query::sort(&mut owned);

        let mut tasks = Vec::with_capacity(owned.len());
        for task in owned {
            tasks.push(self.assemble(task).await?);
        }

        Ok(UserWithTasksRecord {
            id: user.public_id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
            tasks,
        })
    }

    /// Looks up one task by public id
    pub async fn get_by_id(&self, id: Uuid) -> ServiceResult<TaskRecord> {
        let task = self.load(id).await?;
        self.assemble(task).await
    }

    /// Creates a task, optionally assigned to a user from the start
    ///
    /// When `user_id` is set the task row and its first assignment row are
    /// staged into the same unit of work; an unresolvable user fails the
    /// whole operation before anything is staged.
    pub async fn create(&self, request: TaskCreateRequest) -> ServiceResult<TaskRecord> {
        let assignee = match request.user_id {
            Some(user_id) => Some(self.resolve_user(user_id).await?),
            None => None,
        };

        let public_id = Uuid::new_v4();
        let mut unit = UnitOfWork::new();
        unit.stage(StagedWrite::InsertTask(NewTask {
            public_id,
            title: request.title,
            description: request.description,
            status: request.status,
            priority: request.priority,
            deadline: request.deadline,
            assignee_id: assignee.as_ref().map(|u| u.id),
        }));
        if let Some(user) = &assignee {
            unit.stage(StagedWrite::InsertAssignment(NewAssignment {
                public_id: Uuid::new_v4(),
                task_public_id: public_id,
                user_id: Some(user.id),
            }));
        }
        self.store.commit(unit).await?;

        tracing::info!(task_id = %public_id, assigned = assignee.is_some(), "Task created");
        self.get_by_id(public_id).await
    }

    /// Applies a partial update to a task's descriptive fields
    ///
    /// Absent fields keep their current value. Status, priority, and
    /// assignee have dedicated operations.
    pub async fn update(&self, id: Uuid, request: TaskUpdateRequest) -> ServiceResult<TaskRecord> {
        let mut task = self.load(id).await?;
        if let Some(title) = request.title {
            task.title = title;
        }
        if let Some(description) = request.description {
            task.description = Some(description);
        }
        if let Some(deadline) = request.deadline {
            task.deadline = deadline;
        }
        task.updated_at = chrono::Utc::now();

        let mut unit = UnitOfWork::new();
        unit.stage(StagedWrite::UpdateTask(task));
        self.store.commit(unit).await?;

        self.get_by_id(id).await
    }

    /// Deletes a task; its assignment history goes with it
    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        let task = self.load(id).await?;

        let mut unit = UnitOfWork::new();
        unit.stage(StagedWrite::DeleteTask {
            id: task.id,
            version: task.version,
        });
        self.store.commit(unit).await?;

        tracing::info!(task_id = %id, "Task deleted");
        Ok(())
    }

    /// Reassigns or unassigns a task
    ///
    /// Attaching a user appends one assignment log row in the same unit of
    /// work as the assignee change; unassigning only clears the current
    /// assignee, the history stays.
    pub async fn assign_user(&self, id: Uuid, user_id: Option<Uuid>) -> ServiceResult<TaskRecord> {
        let mut task = self.load(id).await?;
        let assignee = match user_id {
            Some(user_id) => Some(self.resolve_user(user_id).await?),
            None => None,
        };

        task.assignee_id = assignee.as_ref().map(|u| u.id);
        task.updated_at = chrono::Utc::now();

        let mut unit = UnitOfWork::new();
        unit.stage(StagedWrite::UpdateTask(task));
        if let Some(user) = &assignee {
            unit.stage(StagedWrite::InsertAssignment(NewAssignment {
                public_id: Uuid::new_v4(),
                task_public_id: id,
                user_id: Some(user.id),
            }));
        }
        self.store.commit(unit).await?;

        tracing::info!(task_id = %id, assigned = assignee.is_some(), "Task assignee changed");
        self.get_by_id(id).await
    }

    /// Moves a task to a new status
    pub async fn update_status(&self, id: Uuid, status: TaskStatus) -> ServiceResult<TaskRecord> {
        let mut task = self.load(id).await?;
        task.status = status;
        task.updated_at = chrono::Utc::now();

        let mut unit = UnitOfWork::new();
        unit.stage(StagedWrite::UpdateTask(task));
        self.store.commit(unit).await?;

        self.get_by_id(id).await
    }

    /// Changes a task's priority
    pub async fn update_priority(&self, id: Uuid, priority: Priority) -> ServiceResult<TaskRecord> {
        let mut task = self.load(id).await?;
        task.priority = priority;
        task.updated_at = chrono::Utc::now();

        let mut unit = UnitOfWork::new();
        unit.stage(StagedWrite::UpdateTask(task));
        self.store.commit(unit).await?;

        self.get_by_id(id).await
    }

    async fn load(&self, id: Uuid) -> ServiceResult<TaskItem> {
        self.store
            .find_task(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Task with id {} was not found", id)))
    }

    async fn resolve_user(&self, id: Uuid) -> ServiceResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User with id {} was not found", id)))
    }

    /// Denormalizes a task row into its boundary record
    async fn assemble(&self, task: TaskItem) -> ServiceResult<TaskRecord> {
        let assignee = match task.assignee_id {
            Some(key) => self.store.find_user_by_key(key).await?,
            None => None,
        };

        let history = self.store.assignments_for_task(task.id).await?;
        let mut assignments = Vec::with_capacity(history.len());
        for assignment in history {
            assignments.push(self.assignment_record(assignment, &task).await?);
        }

        Ok(TaskRecord {
            id: task.public_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            deadline: task.deadline,
            created_at: task.created_at,
            updated_at: task.updated_at,
            user_id: assignee.as_ref().map(|u| u.public_id),
            username: assignee.as_ref().map(|u| u.username.clone()),
            email: assignee.map(|u| u.email),
            assignments,
        })
    }

    async fn assignment_record(
        &self,
        assignment: Assignment,
        task: &TaskItem,
    ) -> ServiceResult<AssignmentRecord> {
        let user = match assignment.user_id {
            Some(key) => self.store.find_user_by_key(key).await?,
            None => None,
        };

        Ok(AssignmentRecord {
            id: assignment.public_id,
            task_id: task.public_id,
            task_title: task.title.clone(),
            task_priority: task.priority,
            assigned_at: assignment.assigned_at,
            user_id: user.as_ref().map(|u| u.public_id),
            username: user.as_ref().map(|u| u.username.clone()),
            email: user.map(|u| u.email),
        })
    }
}
