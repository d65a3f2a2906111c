//! Strongly-typed identifiers for intake entities
//!
//! Identifiers arriving from the intake front end are opaque strings (GUIDs
//! generated by the store, or placeholder tokens such as `COV-base-1`), so the
//! newtypes wrap a `String` rather than a parsed UUID. Wrapping still prevents
//! accidentally passing a role identifier where a coverage identifier is due.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $entity:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier string
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier text
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the identifier carries no text
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Name of the entity this identifier refers to
            pub fn entity() -> &'static str {
                $entity
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ApplicationFormId, "ApplicationForm");
define_id!(PlanId, "Plan");
define_id!(CoverageId, "Coverage");
define_id!(CoverageDefinitionId, "CoverageDefinition");
define_id!(RoleId, "Role");
define_id!(ClientId, "Client");
define_id!(AddressId, "Address");

/// Produces globally unique identifiers for newly created entities
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier string
    fn next_id(&self) -> String;
}

/// Random (v4) UUID identifiers, rendered in hyphenated lowercase form
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl UuidIdGenerator {
    /// Generates a typed identifier
    pub fn generate<T: From<String>>(&self) -> T {
        T::from(self.next_id())
    }
}
