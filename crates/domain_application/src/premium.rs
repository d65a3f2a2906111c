//! Payment modes and modal premiums
//!
//! Annual is the rated amount; the other modes divide it by fixed divisors.
//! The divisors are below the number of payments per year, so paying more
//! often costs more per year of coverage.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, MoneyError};

/// Premium payment frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    Annual,
    SemiAnnual,
    Quarterly,
    Monthly,
}

impl PaymentMode {
    /// Output order of the application totals
    pub const ALL: [PaymentMode; 4] = [
        PaymentMode::Annual,
        PaymentMode::Monthly,
        PaymentMode::Quarterly,
        PaymentMode::SemiAnnual,
    ];

    /// Returns the number of payments per year
    pub fn payments_per_year(&self) -> u32 {
        match self {
            PaymentMode::Annual => 1,
            PaymentMode::SemiAnnual => 2,
            PaymentMode::Quarterly => 4,
            PaymentMode::Monthly => 12,
        }
    }

    /// Divisor applied to the annual premium
    pub fn modal_divisor(&self) -> Decimal {
        match self {
            PaymentMode::Annual => Decimal::ONE,
            PaymentMode::SemiAnnual => dec!(1.92),
            PaymentMode::Quarterly => dec!(3.68),
            PaymentMode::Monthly => dec!(11.23),
        }
    }

    /// Suffix of the application total key in the result document
    pub fn total_key_suffix(&self) -> &'static str {
        match self {
            PaymentMode::Annual => "totalAnnualPremium",
            PaymentMode::SemiAnnual => "totalSemiAnnualPremium",
            PaymentMode::Quarterly => "totalQuarterlyPremium",
            PaymentMode::Monthly => "totalMonthlyPremium",
        }
    }
}

/// One premium amount per payment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModalPremiums {
    pub annual: Money,
    pub semi_annual: Money,
    pub quarterly: Money,
    pub monthly: Money,
}

impl ModalPremiums {
    /// Derives the modal amounts from a rounded annual premium
    ///
    /// Each mode is rounded half-up on its own; nothing is derived from an
    /// already-divided amount.
    pub fn from_annual(annual: Money) -> Result<Self, MoneyError> {
        Ok(Self {
            annual,
            semi_annual: annual.divide_rounded(PaymentMode::SemiAnnual.modal_divisor())?,
            quarterly: annual.divide_rounded(PaymentMode::Quarterly.modal_divisor())?,
            monthly: annual.divide_rounded(PaymentMode::Monthly.modal_divisor())?,
        })
    }

    /// Amount for the given mode
    pub fn get(&self, mode: PaymentMode) -> Money {
        match mode {
            PaymentMode::Annual => self.annual,
            PaymentMode::SemiAnnual => self.semi_annual,
            PaymentMode::Quarterly => self.quarterly,
            PaymentMode::Monthly => self.monthly,
        }
    }

    /// Mode-by-mode sum
    pub fn checked_add(&self, other: &ModalPremiums) -> Result<ModalPremiums, MoneyError> {
        Ok(Self {
            annual: self.annual.checked_add(&other.annual)?,
            semi_annual: self.semi_annual.checked_add(&other.semi_annual)?,
            quarterly: self.quarterly.checked_add(&other.quarterly)?,
            monthly: self.monthly.checked_add(&other.monthly)?,
        })
    }
}
