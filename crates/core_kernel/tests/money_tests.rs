//! Unit tests for the Money module
//!
//! Tests cover construction, half-up rounding, division by the modal
//! divisors, addition and rate handling.

use core_kernel::{Money, MoneyError, Rate, round_half_up};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_rounds_to_two_places() {
        let m = Money::new(dec!(100.123456789));
        assert_eq!(m.amount(), dec!(100.12));
    }

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        assert_eq!(Money::new(dec!(0.125)).amount(), dec!(0.13));
        assert_eq!(Money::new(dec!(0.135)).amount(), dec!(0.14));
        assert_eq!(Money::new(dec!(2.675)).amount(), dec!(2.68));
    }

    #[test]
    fn test_zero_and_default() {
        assert_eq!(Money::zero().amount(), Decimal::ZERO);
        assert_eq!(Money::default(), Money::zero());
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_add_amounts() {
        let total = Money::new(dec!(50.00)) + Money::new(dec!(72.00)) + Money::new(dec!(0.01));
        assert_eq!(total.amount(), dec!(122.01));
    }

    #[test]
    fn test_checked_add_overflow() {
        let max = Money::new(Decimal::MAX);
        assert_eq!(max.checked_add(&max), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_modal_divisions() {
        let annual = Money::new(dec!(72.00));
        assert_eq!(annual.divide_rounded(dec!(11.23)).unwrap().amount(), dec!(6.41));
        assert_eq!(annual.divide_rounded(dec!(3.68)).unwrap().amount(), dec!(19.57));
        assert_eq!(annual.divide_rounded(dec!(1.92)).unwrap().amount(), dec!(37.50));
    }

    #[test]
    fn test_divide_by_zero_is_error() {
        assert_eq!(
            Money::new(dec!(1)).divide_rounded(dec!(0)),
            Err(MoneyError::DivisionByZero)
        );
    }

    #[test]
    fn test_to_f64() {
        let value = Money::new(dec!(4.45)).to_f64().unwrap();
        assert!((value - 4.45).abs() < 1e-9);
    }
}

mod rates {
    use super::*;

    #[test]
    fn test_rate_from_percentage_rounds_half_up() {
        assert_eq!(Rate::from_percentage(dec!(150)).as_decimal(), dec!(1.50));
        assert_eq!(Rate::from_percentage(dec!(100)).as_decimal(), dec!(1.00));
        assert_eq!(Rate::from_percentage(dec!(0.5)).as_decimal(), dec!(0.01));
    }

    #[test]
    fn test_rate_one() {
        assert_eq!(Rate::one().as_decimal(), Decimal::ONE);
    }

    #[test]
    fn test_round_half_up_helper() {
        assert_eq!(round_half_up(dec!(1.005), 2), dec!(1.01));
        assert_eq!(round_half_up(dec!(-1.005), 2), dec!(-1.01));
    }
}
