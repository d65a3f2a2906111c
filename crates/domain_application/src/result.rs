//! Premium result document
//!
//! The result is a flat JSON object: `"<coverageId>_premium"` per rated
//! coverage (annual amount), then `"<applicationId>_total...Premium"` for each
//! payment mode. Amounts are emitted as JSON numbers.

use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};

use core_kernel::{ApplicationFormId, CoverageId, Money};

use crate::premium::{ModalPremiums, PaymentMode};
use crate::underwriting::{CoverageKind, UnderwritingClass};

/// Factor breakdown of one rated coverage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoveragePremium {
    pub coverage_id: CoverageId,
    pub kind: CoverageKind,
    pub underwriting_class: UnderwritingClass,
    pub rating_factor: rust_decimal::Decimal,
    pub tobacco_factor: rust_decimal::Decimal,
    pub premiums: ModalPremiums,
}

/// Output of one premium calculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremiumResult {
    pub application_form_id: ApplicationFormId,
    /// Rated coverages, in iteration order
    pub coverages: Vec<CoveragePremium>,
    /// Coverages left out for lack of a face amount
    pub skipped: Vec<CoverageId>,
    pub totals: ModalPremiums,
}

impl PremiumResult {
    pub fn new(application_form_id: ApplicationFormId) -> Self {
        Self {
            application_form_id,
            coverages: Vec::new(),
            skipped: Vec::new(),
            totals: ModalPremiums::default(),
        }
    }

    /// Annual premium of a rated coverage
    pub fn coverage_premium(&self, coverage_id: &CoverageId) -> Option<Money> {
        self.coverages
            .iter()
            .find(|c| &c.coverage_id == coverage_id)
            .map(|c| c.premiums.annual)
    }

    /// Application total for a payment mode
    pub fn total(&self, mode: PaymentMode) -> Money {
        self.totals.get(mode)
    }

    /// Key/value pairs of the result document, in output order
    pub fn entries(&self) -> IndexMap<String, Money> {
        let mut entries = IndexMap::with_capacity(self.coverages.len() + PaymentMode::ALL.len());
        for coverage in &self.coverages {
            entries.insert(format!("{}_premium", coverage.coverage_id), coverage.premiums.annual);
        }
        for mode in PaymentMode::ALL {
            entries.insert(
                format!("{}_{}", self.application_form_id, mode.total_key_suffix()),
                self.totals.get(mode),
            );
        }
        entries
    }
}

impl Serialize for PremiumResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, amount) in &entries {
            let value = amount.to_f64().map_err(S::Error::custom)?;
            map.serialize_entry(key, &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_serialized_keys_and_numbers() {
        let premiums = ModalPremiums::from_annual(Money::new(dec!(50))).unwrap();
        let mut result = PremiumResult::new(ApplicationFormId::new("APP-1"));
        result.coverages.push(CoveragePremium {
            coverage_id: CoverageId::new("COV-1"),
            kind: CoverageKind::Base,
            underwriting_class: UnderwritingClass::Standard,
            rating_factor: dec!(1),
            tobacco_factor: dec!(1),
            premiums,
        });
        result.totals = premiums;

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "COV-1_premium": 50.0,
                "APP-1_totalAnnualPremium": 50.0,
                "APP-1_totalMonthlyPremium": 4.45,
                "APP-1_totalQuarterlyPremium": 13.59,
                "APP-1_totalSemiAnnualPremium": 26.04
            })
        );
    }

    #[test]
    fn test_empty_result_has_zero_totals() {
        let result = PremiumResult::new(ApplicationFormId::new("APP-2"));
        let entries = result.entries();
        assert_eq!(entries.len(), 4);
        assert!(entries.values().all(Money::is_zero));
    }
}
