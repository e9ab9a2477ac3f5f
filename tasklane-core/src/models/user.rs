/// User model
///
/// Users are identity records referenced by tasks (current assignee) and by
/// the assignment log. Emails are unique under a trim + lowercase
/// comparison; lookups always go through [`normalize_email`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     public_id UUID NOT NULL UNIQUE,
///     username VARCHAR(50) NOT NULL,
///     email VARCHAR(100) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// CREATE UNIQUE INDEX users_email_key ON users (LOWER(TRIM(email)));
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User row as persisted
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Surrogate key (internal wiring only)
    pub id: i64,

    /// Externally visible, immutable identifier
    pub public_id: Uuid,

    /// Display name
    pub username: String,

    /// Email address, unique under normalized comparison
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for staging a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Pre-generated public identifier
    pub public_id: Uuid,

    /// Display name
    pub username: String,

    /// Email address (stored as supplied, compared normalized)
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,
}

/// Normalizes an email for comparison: trims surrounding whitespace and
/// lowercases. The stored value keeps the user's original casing.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
        assert_eq!(normalize_email("bob@test.com"), "bob@test.com");
    }
}
