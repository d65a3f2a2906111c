//! Authenticated principal contract
//!
//! The authentication subsystem (token issuance and validation) lives at the
//! edge; the rest of the system only needs to know who is acting and with what
//! role. Search scoping and administrative gates key off `UserRole`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Role held by an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Full access including user administration
    Admin,
    /// Field agent; sees only their own applications
    Agent,
}

impl UserRole {
    /// Returns the wire code for this role
    pub fn code(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Agent => "AGENT",
        }
    }

    /// Returns true if this role may administer users
    pub fn can_administer(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for UserRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches("ROLE_").to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(UserRole::Admin),
            "AGENT" | "USER" => Ok(UserRole::Agent),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

/// The user on whose behalf a request runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub username: String,
    pub role: UserRole,
}

impl Principal {
    pub fn new(username: impl Into<String>, role: UserRole) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// Returns true if this principal is an administrator
    pub fn is_admin(&self) -> bool {
        self.role.can_administer()
    }
}

/// Source of the current principal, if any
pub trait PrincipalSource {
    fn current_principal(&self) -> Option<Principal>;
}
