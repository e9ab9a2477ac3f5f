/// JWT session token minting and validation
///
/// Tokens are signed with HS256 and carry the user's public id, email and
/// username as claims. The signer is an opaque capability from the
/// services' point of view: they ask for a token for an identity and get
/// back the encoded string plus its remaining lifetime in seconds.
///
/// # Example
///
/// ```
/// use tasklane_core::auth::jwt::{validate_token, TokenSigner};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let signer = TokenSigner::new("a-secret-key-at-least-32-bytes-long", 60);
/// let (token, expires_in) = signer.issue(Uuid::new_v4(), "a@test.com", "alice")?;
/// assert!(expires_in <= 3600);
///
/// let claims = validate_token(&token, "a-secret-key-at-least-32-bytes-long")?;
/// assert_eq!(claims.username, "alice");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token issuer claim value
const ISSUER: &str = "tasklane";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was not issued by this service
    #[error("Invalid token issuer")]
    InvalidIssuer,
}

/// JWT claims structure
///
/// `sub` is the user's public id; email and username ride along so the
/// adapter layer can identify the caller without a store round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user public id
    pub sub: Uuid,

    /// Email of the authenticated user
    pub email: String,

    /// Username of the authenticated user
    pub username: String,

    /// Issuer - always "tasklane"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims expiring `expiry_minutes` from now
    pub fn new(sub: Uuid, email: &str, username: &str, expiry_minutes: i64) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::minutes(expiry_minutes);

        Self {
            sub,
            email: email.to_string(),
            username: username.to_string(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Seconds until this token expires (0 when already expired)
    pub fn expires_in(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}

/// Signing capability handed to the identity service
#[derive(Debug, Clone)]
pub struct TokenSigner {
    secret: String,
    expiry_minutes: i64,
}

impl TokenSigner {
    /// Creates a signer with the given secret and token lifetime
    pub fn new(secret: impl Into<String>, expiry_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            expiry_minutes,
        }
    }

    /// Mints a token for an identity
    ///
    /// Returns the encoded token and its lifetime in seconds.
    pub fn issue(&self, sub: Uuid, email: &str, username: &str) -> Result<(String, i64), JwtError> {
        let claims = Claims::new(sub, email, username, self.expiry_minutes);
        let token = create_token(&claims, &self.secret)?;
        Ok((token, claims.expires_in()))
    }
}

/// Creates a JWT token from claims, signed with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies the signature, expiration, and issuer.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
