/// Core error taxonomy
///
/// Every service operation returns `Result<T, ServiceError>`. Domain rule
/// violations (`NotFound`, `Validation`, `Conflict`, `Unauthorized`) carry
/// user-safe messages and propagate unmodified to the caller. Store-layer
/// failures are wrapped into `Persistence` with the cause preserved for
/// diagnostics; adapters must not echo that cause to external callers.

use crate::store::StoreError;

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Unified service-layer error
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A referenced task, user, or assignment does not exist
    #[error("{0}")]
    NotFound(String),

    /// Malformed or out-of-range input
    #[error("{0}")]
    Validation(String),

    /// Write rejected because it would duplicate existing state
    #[error("{0}")]
    Conflict(String),

    /// Credentials missing or wrong
    #[error("{0}")]
    Unauthorized(String),

    /// Underlying store failure, including concurrency conflicts
    ///
    /// Transient by nature; callers may retry the whole operation.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// Unexpected fault outside the domain taxonomy
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// True when retrying the operation could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Persistence(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_keep_their_message() {
        let err = ServiceError::NotFound("task 42 not found".to_string());
        assert_eq!(err.to_string(), "task 42 not found");

        let err = ServiceError::Unauthorized("Incorrect email or password".to_string());
        assert_eq!(err.to_string(), "Incorrect email or password");
    }

    #[test]
    fn test_persistence_is_retryable() {
        let err = ServiceError::Persistence(StoreError::Backend("connection reset".to_string()));
        assert!(err.is_retryable());
        assert!(!ServiceError::Validation("bad page".to_string()).is_retryable());
    }
}
