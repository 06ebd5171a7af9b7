//! Unified error system for Stockbook
//!
//! One error type covers every operation in the platform. Business-rule
//! failures (precondition violations, missing rows, authorization) are kept
//! distinct from infrastructure failures (storage unavailable) so callers
//! can tell a recoverable rejection from an outage.

use serde::{Deserialize, Serialize};

/// Unified error type for all Stockbook operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RegistryError {
    /// Invalid input or configuration
    #[error("Invalid: {message}")]
    Invalid {
        /// What was malformed
        message: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// What was missing
        message: String,
    },

    /// A business precondition does not hold
    ///
    /// The caller must resolve the dependency and retry; the operation is
    /// never retried automatically.
    #[error("Precondition failed: {message}")]
    Precondition {
        /// Human-readable description of the violated rule
        message: String,
    },

    /// Caller lacks the required role
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Why the caller was rejected
        message: String,
    },

    /// Storage collaborator failed or is unavailable
    #[error("Storage error: {message}")]
    Storage {
        /// Underlying storage failure
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal failure
        message: String,
    },
}

impl RegistryError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error is a client-recoverable business rejection
    /// rather than an infrastructure failure.
    pub fn is_business_rejection(&self) -> bool {
        matches!(
            self,
            Self::Invalid { .. }
                | Self::NotFound { .. }
                | Self::Precondition { .. }
                | Self::Unauthorized { .. }
        )
    }
}

/// Standard Result type for Stockbook operations
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistryError::precondition("company has shareholders");
        assert_eq!(err.to_string(), "Precondition failed: company has shareholders");

        let err = RegistryError::storage("connection refused");
        assert_eq!(err.to_string(), "Storage error: connection refused");
    }

    #[test]
    fn test_business_rejection_classification() {
        assert!(RegistryError::precondition("x").is_business_rejection());
        assert!(RegistryError::not_found("x").is_business_rejection());
        assert!(RegistryError::unauthorized("x").is_business_rejection());
        assert!(RegistryError::invalid("x").is_business_rejection());
        assert!(!RegistryError::storage("x").is_business_rejection());
        assert!(!RegistryError::internal("x").is_business_rejection());
    }
}
