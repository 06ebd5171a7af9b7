//! Caller classification and the elevated-role predicate
//!
//! Role derivation happens outside this platform; operations here only
//! consume the classification. Every elevated operation applies the single
//! predicate [`require_elevated`] as its first step, so an unauthorized
//! call fails before any read or write.

use crate::errors::{RegistryError, Result};
use crate::identifiers::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role held by an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular authenticated user
    Standard,
    /// Elevated administrator
    Admin,
}

impl Role {
    /// Wire spelling of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of the caller of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Caller {
    /// No authenticated session
    Anonymous,
    /// Authenticated user with a derived role
    Authenticated {
        /// The caller's user account
        user_id: UserId,
        /// The caller's role
        role: Role,
    },
}

impl Caller {
    /// An authenticated caller with the given role
    pub fn authenticated(user_id: UserId, role: Role) -> Self {
        Self::Authenticated { user_id, role }
    }

    /// An authenticated administrator
    pub fn admin(user_id: UserId) -> Self {
        Self::Authenticated {
            user_id,
            role: Role::Admin,
        }
    }

    /// The caller's user id, if authenticated
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { user_id, .. } => Some(*user_id),
        }
    }

    /// Whether the caller holds the elevated role
    pub fn is_elevated(&self) -> bool {
        matches!(
            self,
            Self::Authenticated {
                role: Role::Admin,
                ..
            }
        )
    }
}

/// Require the elevated role, returning the acting user id.
///
/// This is the one authorization predicate in the platform; elevated
/// operations call it before touching storage.
pub fn require_elevated(caller: &Caller) -> Result<UserId> {
    match caller {
        Caller::Anonymous => Err(RegistryError::unauthorized("authentication required")),
        Caller::Authenticated { user_id, role } => match role {
            Role::Admin => Ok(*user_id),
            Role::Standard => Err(RegistryError::unauthorized(
                "elevated role required for this operation",
            )),
        },
    }
}
