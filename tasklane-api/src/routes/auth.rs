/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get a session token

use crate::{
    app::AppState,
    error::{validation_error, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tasklane_core::service::dto::{Credentials, RegisterRequest, SessionRecord, UserRecord};
use validator::Validate;

/// Register request body
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterBody {
    /// Desired username
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 100, message = "Email must be at most 100 characters"))]
    pub email: String,

    /// Password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login request body
#[derive(Debug, Deserialize, Validate)]
pub struct LoginBody {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "secret123"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> ApiResult<(StatusCode, Json<UserRecord>)> {
    body.validate().map_err(validation_error)?;

    let user = state
        .identity()
        .register(RegisterRequest {
            username: body.username,
            credentials: Credentials {
                email: body.email,
                password: body.password,
            },
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login endpoint
///
/// Authenticates a user and returns a session token.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "alice@example.com",
///   "password": "secret123"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "bearer_token": "Bearer eyJ...",
///   "username": "alice",
///   "expires_in": 3600
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Incorrect email or password
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> ApiResult<Json<SessionRecord>> {
    body.validate().map_err(validation_error)?;

    let session = state
        .identity()
        .login(Credentials {
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(Json(session))
}
