/// User read endpoints
///
/// # Endpoints
///
/// - `GET /v1/users` - List all users
/// - `GET /v1/users/:id` - Get one user
/// - `GET /v1/users/:id/with-tasks` - Get one user with their assigned tasks

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Json,
};
use tasklane_core::service::dto::{UserRecord, UserWithTasksRecord};
use uuid::Uuid;

/// Lists all registered users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserRecord>>> {
    let users = state.identity().list_all().await?;
    Ok(Json(users))
}

/// Gets one user by public id
///
/// # Errors
///
/// - `404 Not Found`: Unknown user id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserRecord>> {
    let user = state.identity().get_by_id(id).await?;
    Ok(Json(user))
}

/// Gets one user together with the tasks currently assigned to them
///
/// # Errors
///
/// - `404 Not Found`: Unknown user id
pub async fn get_user_with_tasks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserWithTasksRecord>> {
    let user = state.tasks().user_with_tasks(id).await?;
    Ok(Json(user))
}
