//! Application domain errors
//!
//! Two layers: `PremiumError` covers the pure calculation, `ApplicationError`
//! wraps it together with storage failures for the domain services.

use core_kernel::{MoneyError, PortError};
use thiserror::Error;

/// Errors raised by the premium calculation engine
///
/// A coverage without a face amount or with an unknown underwriting class is
/// not an error; both are resolved inside the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PremiumError {
    /// A required identifier is absent or empty
    #[error("Missing required identifier: {0}")]
    MissingIdentifier(&'static str),

    /// A numeric field is present but cannot be parsed
    #[error("Malformed {field} '{value}' on coverage {coverage_id}")]
    MalformedNumericInput {
        coverage_id: String,
        field: &'static str,
        value: String,
    },

    /// The premium product does not fit the decimal range
    #[error("Arithmetic overflow while rating coverage {coverage_id}")]
    ArithmeticOverflow {
        coverage_id: String,
    },

    /// Modal division or total accumulation failed
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl PremiumError {
    pub fn malformed(coverage_id: impl Into<String>, field: &'static str, value: impl Into<String>) -> Self {
        PremiumError::MalformedNumericInput {
            coverage_id: coverage_id.into(),
            field,
            value: value.into(),
        }
    }
}

/// Errors that can occur in the application intake services
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Premium calculation failed
    #[error("Premium calculation error: {0}")]
    Premium(#[from] PremiumError),

    /// The backing store failed or the entity was not found
    #[error(transparent)]
    Port(#[from] PortError),

    /// A stored or submitted detail value has the wrong shape
    #[error("Invalid detail {field}: {reason}")]
    InvalidDetail {
        field: String,
        reason: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ApplicationError {
    /// Creates an invalid detail error
    pub fn invalid_detail(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ApplicationError::InvalidDetail {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        ApplicationError::Validation(message.into())
    }

    /// Returns true if the failure is a missing entity
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApplicationError::Port(e) if e.is_not_found())
    }
}
