//! Underwriting classes and coverage kinds
//!
//! The underwriting class is the risk tier the underwriter assigns to an
//! insured. Each class carries a fixed multiplier on the base premium; unknown
//! or missing codes price as Standard.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk classification tiers used for pricing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnderwritingClass {
    /// Standard - normal rates
    #[default]
    Standard,
    /// Standard Plus
    StandardPlus,
    /// Preferred - better than standard
    Preferred,
    /// Preferred Plus - best rates
    PreferredPlus,
}

impl UnderwritingClass {
    pub const ALL: [UnderwritingClass; 4] = [
        UnderwritingClass::Standard,
        UnderwritingClass::StandardPlus,
        UnderwritingClass::Preferred,
        UnderwritingClass::PreferredPlus,
    ];

    /// Returns the stored code for this class
    pub fn code(&self) -> &'static str {
        match self {
            UnderwritingClass::Standard => "01",
            UnderwritingClass::StandardPlus => "02",
            UnderwritingClass::Preferred => "03",
            UnderwritingClass::PreferredPlus => "04",
        }
    }

    /// Returns the label shown on the coverage screen
    pub fn label(&self) -> &'static str {
        match self {
            UnderwritingClass::Standard => "Standard",
            UnderwritingClass::StandardPlus => "Standard Plus",
            UnderwritingClass::Preferred => "Preferred",
            UnderwritingClass::PreferredPlus => "Preferred Plus",
        }
    }

    /// Returns the rate multiplier for this class
    pub fn factor(&self) -> Decimal {
        match self {
            UnderwritingClass::Standard => dec!(1.0),
            UnderwritingClass::StandardPlus => dec!(0.9),
            UnderwritingClass::Preferred => dec!(0.8),
            UnderwritingClass::PreferredPlus => dec!(0.7),
        }
    }

    /// Parses a stored code; anything outside "01".."04" is Standard
    pub fn from_code(code: &str) -> Self {
        Self::lookup_code(code).unwrap_or_default()
    }

    /// Parses a stored code, returning `None` for unknown codes
    pub fn lookup_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.code() == code)
    }

    /// Maps a screen label to its class; unknown labels are Standard
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|class| class.label() == label)
            .unwrap_or_default()
    }
}

impl fmt::Display for UnderwritingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.code())
    }
}

/// Whether a coverage is the plan's base coverage or an additional one
///
/// The kind is inferred from the coverage definition identifier: any
/// identifier containing "base" in any letter case is a base coverage. This
/// stands in for a lookup against the plan's coverage definitions, which is
/// not available to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageKind {
    Base,
    Additional,
}

impl CoverageKind {
    pub fn from_definition(coverage_definition_id: &str) -> Self {
        if coverage_definition_id.to_lowercase().contains("base") {
            CoverageKind::Base
        } else {
            CoverageKind::Additional
        }
    }

    /// Per-mille base rate applied to the face amount
    pub fn base_rate(&self) -> Decimal {
        match self {
            CoverageKind::Base => dec!(0.0005),
            CoverageKind::Additional => dec!(0.0006),
        }
    }
}

/// Tobacco multiplier for the literal status "Smoker"
pub const SMOKER_FACTOR: Decimal = dec!(1.5);

/// Returns the tobacco multiplier for a status value
///
/// Only the exact text "Smoker" is loaded; "smoker", "Y" and the like price
/// as non-smokers.
pub fn tobacco_factor(status: Option<&str>) -> Decimal {
    match status {
        Some("Smoker") => SMOKER_FACTOR,
        _ => Decimal::ONE,
    }
}
