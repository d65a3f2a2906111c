//! Custom Test Assertions
//!
//! Assertion helpers for premium amounts with messages that name the
//! offending mode or key.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::Money;
use domain_application::{ModalPremiums, PaymentMode, PremiumResult};

/// Largest gap between a modal premium and annual / divisor
pub const MODAL_TOLERANCE: Decimal = dec!(0.005);

/// Asserts a monetary amount to the cent
pub fn assert_money_eq(actual: Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Money mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts that two decimals differ by at most `tolerance`
pub fn assert_decimal_approx_eq(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "Decimals differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}

/// Asserts each modal amount is the annual amount over its divisor, rounded
pub fn assert_modal_consistent(premiums: &ModalPremiums) {
    let annual = premiums.annual.amount();
    for mode in PaymentMode::ALL {
        let expected = annual / mode.modal_divisor();
        let diff = (premiums.get(mode).amount() - expected).abs();
        assert!(
            diff <= MODAL_TOLERANCE,
            "{:?} premium {} is not {} / {}",
            mode,
            premiums.get(mode),
            annual,
            mode.modal_divisor()
        );
    }
}

/// Asserts the annual total is the sum of the per-coverage premiums
pub fn assert_totals_balance(result: &PremiumResult) {
    let sum = result
        .coverages
        .iter()
        .fold(Money::zero(), |acc, c| acc + c.premiums.annual);
    assert_eq!(
        result.total(PaymentMode::Annual),
        sum,
        "Annual total does not match the coverage premiums"
    );
}

/// Asserts a numeric key of the serialized result document
pub fn assert_document_amount(document: &serde_json::Value, key: &str, expected: f64) {
    let actual = document
        .get(key)
        .and_then(serde_json::Value::as_f64)
        .unwrap_or_else(|| panic!("Key {} missing from {}", key, document));
    assert!(
        (actual - expected).abs() < 1e-9,
        "{}: actual={}, expected={}",
        key,
        actual,
        expected
    );
}
