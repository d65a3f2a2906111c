//! Core error types

use thiserror::Error;

/// Errors raised by kernel value parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A role code that maps to no `UserRole`
    #[error("Unknown user role: {0}")]
    UnknownRole(String),
}
