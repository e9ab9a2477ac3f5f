/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - App construction over the in-memory store
/// - Seeded users and JWT token generation
/// - Request and response helpers

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use std::sync::Arc;
use tasklane_api::app::{build_router, AppState};
use tasklane_api::config::{ApiConfig, Config, JwtConfig, StoreBackend, StoreConfig};
use tasklane_core::auth::jwt::TokenSigner;
use tasklane_core::auth::password::hash_password;
use tasklane_core::models::user::{NewUser, User};
use tasklane_core::store::memory::MemoryStore;
use tasklane_core::store::{Committer, IdentityStore, StagedWrite, UnitOfWork};
use tower::Service as _;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-key-32-bytes-min";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: axum::Router,
    pub user: User,
    pub jwt_token: String,
}

fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            url: None,
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            expiry_minutes: 60,
        },
    }
}

impl TestContext {
    /// Creates a context with one seeded, logged-in user
    pub async fn new() -> anyhow::Result<Self> {
        let store = Arc::new(MemoryStore::new());

        // Seed a user directly; the login flow has its own tests
        let email = format!("test-{}@example.com", Uuid::new_v4());
        let mut unit = UnitOfWork::new();
        unit.stage(StagedWrite::InsertUser(NewUser {
            public_id: Uuid::new_v4(),
            username: "tester".to_string(),
            email: email.clone(),
            password_hash: hash_password("secret123")?,
        }));
        store.commit(unit).await?;
        let user = store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("seeded user missing"))?;

        let signer = TokenSigner::new(TEST_SECRET, 60);
        let (jwt_token, _) = signer.issue(user.public_id, &user.email, &user.username)?;

        let state = AppState::new(store.clone(), test_config());
        let app = build_router(state);

        Ok(TestContext {
            store,
            app,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<axum::body::Body> {
        self.app.clone().call(request).await.unwrap()
    }
}

/// Builds an authenticated JSON request
pub fn json_request(
    ctx: &TestContext,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds an unauthenticated GET request
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Reads the response body as JSON, asserting the expected status first
pub async fn json_body(
    response: Response<axum::body::Body>,
    expected: StatusCode,
) -> serde_json::Value {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if status != expected {
        panic!(
            "Expected {}, got {}: {}",
            expected,
            status,
            String::from_utf8_lossy(&body)
        );
    }
    if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    }
}
