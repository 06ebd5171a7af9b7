//! User account
//!
//! Session and credential handling live outside this platform; the user
//! row exists here because invitation acceptance mutates it as a
//! cross-entity side effect.

use crate::authorization::Role;
use crate::identifiers::{CompanyId, UserId};
use serde::{Deserialize, Serialize};

/// A back-office user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Storage-assigned identifier
    pub id: UserId,
    /// Login email, unique across accounts
    pub email: String,
    /// Current role
    pub role: Role,
    /// Company the role is scoped to, if any
    pub company_id: Option<CompanyId>,
    /// Creation timestamp (ms)
    pub created_at_ms: u64,
}

/// Input for provisioning a user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Login email
    pub email: String,
    /// Initial role
    pub role: Role,
    /// Company the role is scoped to, if any
    pub company_id: Option<CompanyId>,
}
