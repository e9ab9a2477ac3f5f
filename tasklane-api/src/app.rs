/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasklane_api::{app::AppState, config::Config};
/// use tasklane_core::store::memory::MemoryStore;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = tasklane_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tasklane_core::auth::jwt::{self, TokenSigner};
use tasklane_core::service::{
    assignments::AssignmentService, identity::IdentityService, tasks::TaskService,
};
use tasklane_core::store::Store;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend behind the capability traits
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Task lifecycle service
    pub fn tasks(&self) -> TaskService {
        TaskService::new(self.store.clone())
    }

    /// Assignment log read service
    pub fn assignments(&self) -> AssignmentService {
        AssignmentService::new(self.store.clone())
    }

    /// Identity and session service
    pub fn identity(&self) -> IdentityService {
        IdentityService::new(
            self.store.clone(),
            TokenSigner::new(self.config.jwt.secret.clone(), self.config.jwt.expiry_minutes),
        )
    }
}

/// Identity of the authenticated caller, injected by [`jwt_auth_layer`]
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Public id of the user
    pub user_id: Uuid,

    /// Email from the token claims
    pub email: String,

    /// Username from the token claims
    pub username: String,
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// ├── /v1/                          # API v1 (versioned)
/// │   ├── /auth/
/// │   │   ├── POST /register
/// │   │   └── POST /login
/// │   ├── /users/                   # User reads (public)
/// │   │   ├── GET /
/// │   │   ├── GET /:id
/// │   │   └── GET /:id/with-tasks
/// │   ├── /tasks/                   # Reads public, writes authenticated
/// │   │   ├── GET    /
/// │   │   ├── GET    /search
/// │   │   ├── GET    /:id
/// │   │   ├── POST   /
/// │   │   ├── PUT    /:id
/// │   │   ├── DELETE /:id
/// │   │   ├── PUT    /:id/assignee
/// │   │   ├── PUT    /:id/status
/// │   │   └── PUT    /:id/priority
/// │   └── /assignments/             # Audit log reads (public)
/// │       ├── GET /
/// │       ├── GET /:id
/// │       └── GET /task/:task_id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // User reads (public)
    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/:id", get(routes::users::get_user))
        .route("/:id/with-tasks", get(routes::users::get_user_with_tasks));

    // Task reads (public)
    let task_read_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks))
        .route("/search", get(routes::tasks::search_tasks))
        .route("/:id", get(routes::tasks::get_task));

    // Task writes (require JWT authentication)
    let task_write_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route("/:id", put(routes::tasks::update_task))
        .route("/:id", delete(routes::tasks::delete_task))
        .route("/:id/assignee", put(routes::tasks::assign_task))
        .route("/:id/status", put(routes::tasks::update_task_status))
        .route("/:id/priority", put(routes::tasks::update_task_priority))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Assignment log reads (public)
    let assignment_routes = Router::new()
        .route("/", get(routes::assignments::list_assignments))
        .route("/:id", get(routes::assignments::get_assignment))
        .route(
            "/task/:task_id",
            get(routes::assignments::list_assignments_for_task),
        );

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/tasks", task_read_routes.merge(task_write_routes))
        .nest("/assignments", assignment_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates JWT token from Authorization header,
/// then injects AuthContext into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    // Parse Bearer token
    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    // Validate token
    let claims = jwt::validate_token(token, state.jwt_secret())?;

    // Insert into request extensions
    req.extensions_mut().insert(AuthContext {
        user_id: claims.sub,
        email: claims.email,
        username: claims.username,
    });

    Ok(next.run(req).await)
}
