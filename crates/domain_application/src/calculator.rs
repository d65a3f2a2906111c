//! Premium calculation engine
//!
//! A pure function from an application document to premiums. Each coverage is
//! rated as
//!
//! ```text
//! annual = round2(face × baseRate × uwFactor × round2(tableRating / 100) × tobaccoFactor)
//! modal  = round2(annual / divisor)      divisor ∈ {1.92, 3.68, 11.23}
//! ```
//!
//! and the application totals are the mode-by-mode sums of the rated
//! coverages. All rounding is half-up and happens at exactly those steps.
//!
//! The engine holds no state between calls and touches no storage, so a
//! single instance can be shared across request handlers.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use core_kernel::{CoverageId, Money, Rate};

use crate::attributes::{Attribute, AttributeTable, FlattenedApplication};
use crate::error::PremiumError;
use crate::model::{parse_decimal_text, ApplicationInput};
use crate::premium::ModalPremiums;
use crate::result::{CoveragePremium, PremiumResult};
use crate::underwriting::{tobacco_factor, CoverageKind, UnderwritingClass};

/// Stateless premium calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct PremiumCalculator;

impl PremiumCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Calculates per-coverage and application premiums
    ///
    /// # Errors
    ///
    /// - `MissingIdentifier` if the application or a coverage has no identifier
    /// - `MalformedNumericInput` if a face amount or table rating is present
    ///   but not a number
    ///
    /// No partial result is returned on error.
    pub fn calculate(&self, input: &ApplicationInput) -> Result<PremiumResult, PremiumError> {
        let flattened = FlattenedApplication::flatten(input)?;
        self.calculate_flattened(&flattened)
    }

    /// Rates an already flattened application
    pub fn calculate_flattened(
        &self,
        application: &FlattenedApplication,
    ) -> Result<PremiumResult, PremiumError> {
        info!(
            application_form_id = %application.application_form_id,
            coverages = application.coverages.len(),
            "Calculating premium"
        );

        let mut result = PremiumResult::new(application.application_form_id.clone());

        for (coverage_id, attributes) in &application.coverages {
            match self.rate_coverage(coverage_id, attributes)? {
                Some(rated) => {
                    result.totals = result.totals.checked_add(&rated.premiums)?;
                    result.coverages.push(rated);
                }
                None => {
                    warn!(coverage_id = %coverage_id, "Missing face amount, coverage skipped");
                    result.skipped.push(coverage_id.clone());
                }
            }
        }

        info!(
            application_form_id = %application.application_form_id,
            total_annual = %result.totals.annual,
            rated = result.coverages.len(),
            skipped = result.skipped.len(),
            "Premium calculated"
        );
        Ok(result)
    }

    /// Rates one coverage; `None` when it has no face amount
    fn rate_coverage(
        &self,
        coverage_id: &CoverageId,
        attributes: &AttributeTable,
    ) -> Result<Option<CoveragePremium>, PremiumError> {
        let face_amount = match attributes.first_value(Attribute::FaceAmount) {
            Some(text) => parse_decimal(coverage_id, Attribute::FaceAmount, text)?,
            None => return Ok(None),
        };

        let kind = CoverageKind::from_definition(
            attributes.first(Attribute::CoverageDefinition).unwrap_or(""),
        );
        let underwriting_class =
            UnderwritingClass::from_code(attributes.first(Attribute::UwClass).unwrap_or(""));

        let rating_factor = match attributes.first_value(Attribute::TableRating) {
            Some(text) => Rate::from_percentage(parse_decimal(coverage_id, Attribute::TableRating, text)?),
            None => Rate::one(),
        };

        let tobacco = tobacco_factor(attributes.first(Attribute::Tobacco));

        let raw_premium = [
            kind.base_rate(),
            underwriting_class.factor(),
            rating_factor.as_decimal(),
            tobacco,
        ]
        .into_iter()
        .try_fold(face_amount, |acc, factor| acc.checked_mul(factor))
        .ok_or_else(|| PremiumError::ArithmeticOverflow {
            coverage_id: coverage_id.to_string(),
        })?;

        let premiums = ModalPremiums::from_annual(Money::new(raw_premium))?;

        debug!(
            coverage_id = %coverage_id,
            kind = ?kind,
            face_amount = %face_amount,
            underwriting_class = %underwriting_class,
            rating_factor = %rating_factor.as_decimal(),
            tobacco_factor = %tobacco,
            annual = %premiums.annual,
            "Coverage rated"
        );

        Ok(Some(CoveragePremium {
            coverage_id: coverage_id.clone(),
            kind,
            underwriting_class,
            rating_factor: rating_factor.as_decimal(),
            tobacco_factor: tobacco,
            premiums,
        }))
    }
}

/// Convenience wrapper over [`PremiumCalculator::calculate`]
pub fn calculate_premium(input: &ApplicationInput) -> Result<PremiumResult, PremiumError> {
    PremiumCalculator::new().calculate(input)
}

/// Parses plain or scientific decimal text
fn parse_decimal(
    coverage_id: &CoverageId,
    attribute: Attribute,
    text: &str,
) -> Result<Decimal, PremiumError> {
    parse_decimal_text(text)
        .ok_or_else(|| PremiumError::malformed(coverage_id.as_str(), attribute.name(), text))
}
