/// Task endpoints
///
/// Reads are public; writes require a valid session token. Every write
/// goes through the task service, which commits the task row and any
/// assignment log rows atomically.
///
/// # Endpoints
///
/// - `GET    /v1/tasks` - List all tasks
/// - `GET    /v1/tasks/search` - Filtered, paginated view
/// - `GET    /v1/tasks/:id` - Get one task
/// - `POST   /v1/tasks` - Create a task (auth)
/// - `PUT    /v1/tasks/:id` - Replace mutable fields (auth)
/// - `DELETE /v1/tasks/:id` - Delete a task (auth)
/// - `PUT    /v1/tasks/:id/assignee` - Reassign or unassign (auth)
/// - `PUT    /v1/tasks/:id/status` - Change status (auth)
/// - `PUT    /v1/tasks/:id/priority` - Change priority (auth)

use crate::{
    app::{AppState, AuthContext},
    error::{validation_error, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tasklane_core::models::task::{Priority, TaskStatus};
use tasklane_core::service::dto::{
    TaskCreateRequest, TaskPage, TaskQuery, TaskRecord, TaskUpdateRequest,
};
use uuid::Uuid;
use validator::Validate;

/// Create task request body
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskBody {
    /// Task title
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    /// Optional description
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    /// Initial status (defaults to Pending)
    #[serde(default)]
    pub status: TaskStatus,

    /// Initial priority
    pub priority: Priority,

    /// Deadline
    pub deadline: DateTime<Utc>,

    /// Public id of the initial assignee
    pub user_id: Option<Uuid>,
}

/// Partial update request body; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskBody {
    /// New title
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    /// New description
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    /// New deadline
    pub deadline: Option<DateTime<Utc>>,
}

/// Assignee change request body
///
/// `user_id: null` (or absent) unassigns the task.
#[derive(Debug, Deserialize)]
pub struct AssignBody {
    /// Public id of the new assignee, or null to unassign
    pub user_id: Option<Uuid>,
}

/// Status change request body
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    /// New status
    pub status: TaskStatus,
}

/// Priority change request body
#[derive(Debug, Deserialize)]
pub struct PriorityBody {
    /// New priority
    pub priority: Priority,
}

/// Lists all tasks, deadline-descending
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<TaskRecord>>> {
    let tasks = state.tasks().list_all().await?;
    Ok(Json(tasks))
}

/// Filtered, ordered, paginated task view
///
/// # Endpoint
///
/// ```text
/// GET /v1/tasks/search?search=deploy&status=Pending&page_number=1&page_size=10
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Zero page number or page size
pub async fn search_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskQuery>,
) -> ApiResult<Json<TaskPage>> {
    let page = state.tasks().search(params).await?;
    Ok(Json(page))
}

/// Gets one task by public id
///
/// # Errors
///
/// - `404 Not Found`: Unknown task id
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskRecord>> {
    let task = state.tasks().get_by_id(id).await?;
    Ok(Json(task))
}

/// Creates a task
///
/// # Endpoint
///
/// ```text
/// POST /v1/tasks
/// Content-Type: application/json
/// Authorization: Bearer <token>
///
/// {
///   "title": "Buy groceries",
///   "priority": "Medium",
///   "deadline": "2026-09-01T12:00:00Z",
///   "user_id": "uuid"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: `user_id` does not resolve to a user
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateTaskBody>,
) -> ApiResult<(StatusCode, Json<TaskRecord>)> {
    body.validate().map_err(validation_error)?;
    tracing::debug!(actor = %auth.username, "Creating task");

    let task = state
        .tasks()
        .create(TaskCreateRequest {
            title: body.title,
            description: body.description,
            status: body.status,
            priority: body.priority,
            deadline: body.deadline,
            user_id: body.user_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Partially updates a task's descriptive fields
///
/// Status, priority, and assignee have dedicated endpoints.
///
/// # Errors
///
/// - `404 Not Found`: Unknown task id
/// - `409 Conflict`: The task was modified concurrently
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTaskBody>,
) -> ApiResult<Json<TaskRecord>> {
    body.validate().map_err(validation_error)?;

    let task = state
        .tasks()
        .update(
            id,
            TaskUpdateRequest {
                title: body.title,
                description: body.description,
                deadline: body.deadline,
            },
        )
        .await?;

    Ok(Json(task))
}

/// Deletes a task and its assignment history
///
/// # Errors
///
/// - `404 Not Found`: Unknown task id
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::debug!(actor = %auth.username, task_id = %id, "Deleting task");
    state.tasks().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reassigns or unassigns a task
///
/// Attaching a user appends an assignment log entry in the same commit.
///
/// # Errors
///
/// - `404 Not Found`: Unknown task or user id
pub async fn assign_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignBody>,
) -> ApiResult<Json<TaskRecord>> {
    let task = state.tasks().assign_user(id, body.user_id).await?;
    Ok(Json(task))
}

/// Changes a task's status
///
/// # Errors
///
/// - `404 Not Found`: Unknown task id
pub async fn update_task_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<TaskRecord>> {
    let task = state.tasks().update_status(id, body.status).await?;
    Ok(Json(task))
}

/// Changes a task's priority
///
/// # Errors
///
/// - `404 Not Found`: Unknown task id
pub async fn update_task_priority(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<PriorityBody>,
) -> ApiResult<Json<TaskRecord>> {
    let task = state.tasks().update_priority(id, body.priority).await?;
    Ok(Json(task))
}
