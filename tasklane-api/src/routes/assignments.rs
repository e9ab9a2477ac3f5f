/// Assignment log read endpoints
///
/// The log is written only as a side effect of task operations; these
/// endpoints expose it read-only.
///
/// # Endpoints
///
/// - `GET /v1/assignments` - Full audit trail
/// - `GET /v1/assignments/:id` - One entry
/// - `GET /v1/assignments/task/:task_id` - History for one task

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Json,
};
use tasklane_core::service::dto::AssignmentRecord;
use uuid::Uuid;

/// Lists every assignment ever recorded, oldest first
pub async fn list_assignments(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<AssignmentRecord>>> {
    let assignments = state.assignments().list_all().await?;
    Ok(Json(assignments))
}

/// Gets one assignment by public id
///
/// # Errors
///
/// - `404 Not Found`: Unknown assignment id
pub async fn get_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AssignmentRecord>> {
    let assignment = state.assignments().get_by_id(id).await?;
    Ok(Json(assignment))
}

/// Lists the assignment history for one task, oldest first
///
/// An unknown task id returns an empty list.
pub async fn list_assignments_for_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<AssignmentRecord>>> {
    let history = state.assignments().list_by_task(task_id).await?;
    Ok(Json(history))
}
