/// Identity and session service
///
/// Registration, login, and user reads. Registration goes through the same
/// unit-of-work commit as every other write; the store's unique email
/// index is the last line of defense against a race between the
/// availability pre-check and the commit.

use crate::auth::jwt::TokenSigner;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::{normalize_email, NewUser, User};
use crate::service::dto::{Credentials, RegisterRequest, SessionRecord, UserRecord};
use crate::store::{StagedWrite, Store, StoreError, UnitOfWork};
use std::sync::Arc;
use uuid::Uuid;

/// Message returned for any credential failure; deliberately does not say
/// whether the email or the password was wrong.
const BAD_CREDENTIALS: &str = "Incorrect email or password";

/// Service managing user accounts and sessions
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn Store>,
    signer: TokenSigner,
}

impl IdentityService {
    /// Creates a service over the given store and token signer
    pub fn new(store: Arc<dyn Store>, signer: TokenSigner) -> Self {
        Self { store, signer }
    }

    /// Registers a new account
    ///
    /// The email must be unused under normalized comparison. Returns
    /// [`ServiceError::Conflict`] when it is taken, whether caught by the
    /// pre-check or by the unique index at commit time.
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<UserRecord> {
        if self
            .store
            .find_user_by_email(&request.credentials.email)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "Email is already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&request.credentials.password)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let public_id = Uuid::new_v4();
        let mut unit = UnitOfWork::new();
        unit.stage(StagedWrite::InsertUser(NewUser {
            public_id,
            username: request.username,
            email: request.credentials.email,
            password_hash,
        }));

        match self.store.commit(unit).await {
            Ok(()) => {}
            Err(StoreError::UniqueViolation(_)) => {
                return Err(ServiceError::Conflict(
                    "Email is already registered".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        let user = self.store.find_user(public_id).await?.ok_or_else(|| {
            ServiceError::Internal(format!("registered user {} not readable", public_id))
        })?;

        tracing::info!(user_id = %public_id, "User registered");
        Ok(record(user))
    }

    /// Authenticates a user and mints a session token
    ///
    /// Every failure mode reports the same [`ServiceError::Unauthorized`]
    /// message.
    pub async fn login(&self, credentials: Credentials) -> ServiceResult<SessionRecord> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        let user = self
            .store
            .find_user_by_email(&normalize_email(&credentials.email))
            .await?
            .ok_or_else(|| ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()))?;

        let verified = verify_password(&credentials.password, &user.password_hash)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if !verified {
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        let (token, expires_in) = self
            .signer
            .issue(user.public_id, &user.email, &user.username)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        tracing::info!(user_id = %user.public_id, "User logged in");
        Ok(SessionRecord {
            bearer_token: format!("Bearer {}", token),
            username: user.username,
            expires_in,
        })
    }

    /// All registered users
    pub async fn list_all(&self) -> ServiceResult<Vec<UserRecord>> {
        let users = self.store.list_users().await?;
        Ok(users.into_iter().map(record).collect())
    }

    /// Looks up one user by public id
    pub async fn get_by_id(&self, id: Uuid) -> ServiceResult<UserRecord> {
        let user = self
            .store
            .find_user(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User with id {} was not found", id)))?;
        Ok(record(user))
    }
}

fn record(user: User) -> UserRecord {
    UserRecord {
        id: user.public_id,
        username: user.username,
        email: user.email,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}
