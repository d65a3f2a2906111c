//! Application Intake Domain
//!
//! This crate models a life-insurance application at the point of intake and
//! prices it. It provides:
//!
//! - The typed application document posted by the intake front end
//! - Attribute flattening into per-application and per-coverage tables
//! - Underwriting classes, coverage kinds and payment modes
//! - The premium calculation engine and its result document
//! - Detail-row mapping for coverage and medical details
//! - Base coverage, owner and beneficiary capture
//! - Storage ports and the services that drive them
//!
//! # Premium calculation
//!
//! ```rust,ignore
//! use domain_application::{ApplicationEnvelope, PremiumCalculator};
//!
//! let envelope: ApplicationEnvelope = serde_json::from_str(body)?;
//! let result = PremiumCalculator::new().calculate(&envelope.application)?;
//! let response = serde_json::to_value(&result)?;
//! ```

pub mod attributes;
pub mod calculator;
pub mod details;
pub mod error;
pub mod intake;
pub mod model;
pub mod ports;
pub mod premium;
pub mod result;
pub mod services;
pub mod underwriting;

pub use attributes::{Attribute, AttributeTable, FlattenedApplication};
pub use calculator::{calculate_premium, PremiumCalculator};
pub use details::{
    medical_rows_from_json, CoverageDetail, DetailRow, DetailValue, SaveCoverageDetailsRequest,
};
pub use error::{ApplicationError, PremiumError};
pub use model::{
    ApplicationEnvelope, ApplicationInput, ClientInput, CoverageDetailInput, CoverageInput,
    FieldValue, RoleInput,
};
pub use intake::{
    BaseCoverageRequest, BaseCoverageSaved, BeneficiaryAllocation, BeneficiaryAllocationRequest, CoverageDefinition,
    OwnerSaveRequest, OwnerSaveResponse,
};
pub use ports::{CodeEntry, CodeLookupPort, DetailStorePort, IntakeStorePort, SaveOutcome};
pub use premium::{ModalPremiums, PaymentMode};
pub use result::{CoveragePremium, PremiumResult};
pub use services::{CodeService, DetailService, Dropdowns, IntakeService, PremiumService};
pub use underwriting::{tobacco_factor, CoverageKind, UnderwritingClass};
