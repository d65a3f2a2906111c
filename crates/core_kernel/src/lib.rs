//! Core Kernel - Foundational types and utilities for the intake platform
//!
//! This crate provides the fundamental building blocks used across the domain:
//! - Money types with precise decimal arithmetic and half-up rounding
//! - Opaque identifiers and the identifier generator contract
//! - Ports infrastructure shared by every adapter
//! - The authenticated principal contract

pub mod money;
pub mod identifiers;
pub mod ports;
pub mod principal;
pub mod error;

pub use money::{Money, MoneyError, Rate, round_half_up, MONETARY_SCALE};
pub use identifiers::{
    ApplicationFormId, PlanId, CoverageId, CoverageDefinitionId,
    RoleId, ClientId, AddressId, IdGenerator, UuidIdGenerator,
};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
pub use principal::{Principal, PrincipalSource, UserRole};
pub use error::CoreError;
