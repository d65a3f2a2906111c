//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! application intake test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built applications, detail forms and code tables
//! - `builders`: Builder patterns for premium request documents
//! - `assertions`: Custom assertion helpers for premium amounts
//! - `generators`: Property-based test data generators

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod generators;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use generators::*;
