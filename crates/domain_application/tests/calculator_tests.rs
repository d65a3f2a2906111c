//! Premium Calculation Engine Tests
//!
//! End-to-end tests of the engine from a JSON request document to the result
//! document, plus property tests for the rating formula.
//!
//! # Test Organization
//!
//! - `document_tests` - JSON in, JSON out
//! - `rating_tests` - factor combinations and skipped coverages
//! - `error_tests` - fatal input problems
//! - `property_tests` - proptest properties of the formula and totals

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde_json::json;

use core_kernel::CoverageId;
use domain_application::{
    calculate_premium, ApplicationEnvelope, ApplicationInput, PaymentMode, PremiumCalculator,
    PremiumError,
};

fn parse(value: serde_json::Value) -> ApplicationInput {
    serde_json::from_value::<ApplicationEnvelope>(value)
        .expect("valid envelope")
        .application
}

fn coverage(id: &str, definition: &str, face: serde_json::Value, uw: &str, tobacco: &str) -> serde_json::Value {
    json!({
        "CoverageGUID": id,
        "CoverageDefinitionGUID": definition,
        "coveragedetails": {
            "FaceAmount": face,
            "TableRating": null,
            "UWClass": uw
        },
        "roles": [{
            "RoleGUID": format!("{}-INS", id),
            "RoleCode": "02",
            "client": { "ClientGUID": "CL-1", "Tobacco": tobacco }
        }]
    })
}

fn envelope(coverages: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "application": {
            "ApplicationFormGUID": "APP-100",
            "PlanGUID": "PLAN-7",
            "roles": [{
                "RoleGUID": "OWN-1",
                "RoleCode": "01",
                "client": { "ClientGUID": "CL-1", "ClientName": "Jane Doe", "Tobacco": "Smoker" }
            }],
            "coverages": coverages
        }
    })
}

mod document_tests {
    use super::*;

    #[test]
    fn test_single_base_coverage_document() {
        let input = parse(envelope(vec![coverage("COV-1", "DEF-Base", json!(100000), "01", "Non-Smoker")]));
        let result = calculate_premium(&input).unwrap();

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "COV-1_premium": 50.0,
                "APP-100_totalAnnualPremium": 50.0,
                "APP-100_totalMonthlyPremium": 4.45,
                "APP-100_totalQuarterlyPremium": 13.59,
                "APP-100_totalSemiAnnualPremium": 26.04
            })
        );
    }

    #[test]
    fn test_key_order_follows_coverages() {
        let input = parse(envelope(vec![
            coverage("Z-COV", "base", json!("100000"), "01", ""),
            coverage("A-COV", "rider", json!("100000"), "01", ""),
        ]));
        let result = calculate_premium(&input).unwrap();
        let keys: Vec<String> = result.entries().keys().cloned().collect();
        assert_eq!(
            keys,
            [
                "Z-COV_premium",
                "A-COV_premium",
                "APP-100_totalAnnualPremium",
                "APP-100_totalMonthlyPremium",
                "APP-100_totalQuarterlyPremium",
                "APP-100_totalSemiAnnualPremium",
            ]
        );
    }

    #[test]
    fn test_owner_tobacco_does_not_load_coverage() {
        // The owner is a smoker; only the coverage's insured counts.
        let input = parse(envelope(vec![coverage("COV-1", "base", json!(100000), "01", "Non-Smoker")]));
        let result = calculate_premium(&input).unwrap();
        assert_eq!(result.total(PaymentMode::Annual).amount(), dec!(50.00));
    }

    #[test]
    fn test_empty_application() {
        let input = parse(json!({"application": {"ApplicationFormGUID": "APP-9", "coverages": null}}));
        let value = serde_json::to_value(calculate_premium(&input).unwrap()).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 4);
        assert_eq!(value["APP-9_totalAnnualPremium"], json!(0.0));
    }
}

mod rating_tests {
    use super::*;

    #[test]
    fn test_two_coverages_total() {
        let input = parse(envelope(vec![
            coverage("COV-1", "DEF-Base", json!(100000), "01", "Non-Smoker"),
            coverage("COV-2", "AddlCoverageX", json!(100000), "03", "Smoker"),
        ]));
        let result = calculate_premium(&input).unwrap();

        assert_eq!(result.coverage_premium(&CoverageId::new("COV-2")).unwrap().amount(), dec!(72.00));
        assert_eq!(result.total(PaymentMode::Annual).amount(), dec!(122.00));
        // 4.45 + round2(72 / 11.23) = 4.45 + 6.41
        assert_eq!(result.total(PaymentMode::Monthly).amount(), dec!(10.86));
    }

    #[test]
    fn test_unknown_class_prices_as_standard() {
        let known = parse(envelope(vec![coverage("C", "base", json!(250000), "01", "")]));
        let unknown = parse(envelope(vec![coverage("C", "base", json!(250000), "07", "")]));
        let calculator = PremiumCalculator::new();
        assert_eq!(
            calculator.calculate(&known).unwrap().totals,
            calculator.calculate(&unknown).unwrap().totals
        );
    }

    #[test]
    fn test_table_rating_is_rounded_before_use() {
        let mut doc = envelope(vec![coverage("C", "base", json!(100000), "01", "")]);
        doc["application"]["coverages"][0]["coveragedetails"]["TableRating"] = json!("125.5");
        let result = calculate_premium(&parse(doc)).unwrap();
        // round2(1.255) = 1.26
        assert_eq!(result.coverages[0].rating_factor, dec!(1.26));
        assert_eq!(result.total(PaymentMode::Annual).amount(), dec!(63.00));
    }

    #[test]
    fn test_annual_premium_is_rounded_half_up() {
        // 12345 × 0.0005 = 6.1725 -> 6.17 ; 12350 × 0.0005 = 6.175 -> 6.18
        let input = parse(envelope(vec![
            coverage("A", "base", json!(12345), "01", ""),
            coverage("B", "base", json!(12350), "01", ""),
        ]));
        let result = calculate_premium(&input).unwrap();
        assert_eq!(result.coverage_premium(&CoverageId::new("A")).unwrap().amount(), dec!(6.17));
        assert_eq!(result.coverage_premium(&CoverageId::new("B")).unwrap().amount(), dec!(6.18));
    }

    #[test]
    fn test_skipped_coverage_has_no_entry() {
        let input = parse(envelope(vec![
            coverage("COV-1", "base", json!(100000), "01", ""),
            coverage("COV-2", "base", json!(null), "01", ""),
            coverage("COV-3", "base", json!(""), "01", ""),
        ]));
        let result = calculate_premium(&input).unwrap();
        let value = serde_json::to_value(&result).unwrap();

        assert!(value.get("COV-2_premium").is_none());
        assert!(value.get("COV-3_premium").is_none());
        assert_eq!(result.skipped, vec![CoverageId::new("COV-2"), CoverageId::new("COV-3")]);
        assert_eq!(result.total(PaymentMode::Annual).amount(), dec!(50.00));
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn test_malformed_table_rating() {
        let mut doc = envelope(vec![coverage("C", "base", json!(100000), "01", "")]);
        doc["application"]["coverages"][0]["coveragedetails"]["TableRating"] = json!("150%");
        let err = calculate_premium(&parse(doc)).unwrap_err();
        assert_eq!(err, PremiumError::malformed("C", "TableRating", "150%"));
    }

    #[test]
    fn test_missing_coverage_id() {
        let mut doc = envelope(vec![coverage("C", "base", json!(100000), "01", "")]);
        doc["application"]["coverages"][0]["CoverageGUID"] = json!(null);
        assert_eq!(
            calculate_premium(&parse(doc)).unwrap_err(),
            PremiumError::MissingIdentifier("CoverageGUID")
        );
    }

    #[test]
    fn test_error_message_names_field() {
        let input = parse(envelope(vec![coverage("C", "base", json!("12a"), "01", "")]));
        let message = calculate_premium(&input).unwrap_err().to_string();
        assert!(message.contains("FaceAmount"));
        assert!(message.contains("12a"));
    }

    #[test]
    fn test_digit_separators_and_radix_prefixes_rejected() {
        for face in ["1_000", "0x10"] {
            let input = parse(envelope(vec![coverage("C", "base", json!(face), "01", "")]));
            assert_eq!(
                calculate_premium(&input).unwrap_err(),
                PremiumError::malformed("C", "FaceAmount", face)
            );
        }
    }

    #[test]
    fn test_overflowing_face_amount() {
        let mut doc = envelope(vec![coverage("C", "base", json!("79228162514264337593543950335"), "01", "Smoker")]);
        doc["application"]["coverages"][0]["coveragedetails"]["TableRating"] = json!("1000000000000");
        assert!(matches!(
            calculate_premium(&parse(doc)),
            Err(PremiumError::ArithmeticOverflow { .. })
        ));
    }
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn round2(value: Decimal) -> Decimal {
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    fn uw_code() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["01", "02", "03", "04", "05", ""])
    }

    fn uw_factor(code: &str) -> Decimal {
        match code {
            "02" => dec!(0.9),
            "03" => dec!(0.8),
            "04" => dec!(0.7),
            _ => dec!(1.0),
        }
    }

    proptest! {
        #[test]
        fn annual_matches_formula(
            face in 0u64..50_000_000,
            base in any::<bool>(),
            uw in uw_code(),
            rating in proptest::option::of(50u32..500),
            smoker in any::<bool>(),
        ) {
            let definition = if base { "PLAN-BASE" } else { "RIDER-1" };
            let mut doc = envelope(vec![coverage("C", definition, json!(face.to_string()), uw, if smoker { "Smoker" } else { "Non-Smoker" })]);
            if let Some(r) = rating {
                doc["application"]["coverages"][0]["coveragedetails"]["TableRating"] = json!(r.to_string());
            }
            let result = calculate_premium(&parse(doc)).unwrap();

            let rate = if base { dec!(0.0005) } else { dec!(0.0006) };
            let rating_factor = rating.map(|r| round2(Decimal::from(r) / dec!(100))).unwrap_or(Decimal::ONE);
            let tobacco = if smoker { dec!(1.5) } else { Decimal::ONE };
            let expected = round2(Decimal::from(face) * rate * uw_factor(uw) * rating_factor * tobacco);

            prop_assert_eq!(result.total(PaymentMode::Annual).amount(), expected);
        }

        #[test]
        fn modal_amounts_are_rounded_divisions(face in 0u64..50_000_000) {
            let input = parse(envelope(vec![coverage("C", "base", json!(face), "01", "")]));
            let result = calculate_premium(&input).unwrap();
            let annual = result.total(PaymentMode::Annual).amount();

            for mode in [PaymentMode::Monthly, PaymentMode::Quarterly, PaymentMode::SemiAnnual] {
                let modal = result.total(mode).amount();
                let exact = annual / mode.modal_divisor();
                prop_assert!((modal - exact).abs() <= dec!(0.005));
            }
        }

        #[test]
        fn totals_are_sums_of_coverages(faces in proptest::collection::vec(proptest::option::of(0u64..5_000_000), 0..8)) {
            let coverages = faces
                .iter()
                .enumerate()
                .map(|(i, face)| {
                    let face = face.map(|f| json!(f)).unwrap_or(json!(null));
                    coverage(&format!("COV-{}", i), if i % 2 == 0 { "base" } else { "rider" }, face, "02", "")
                })
                .collect();
            let result = calculate_premium(&parse(envelope(coverages))).unwrap();

            prop_assert_eq!(result.coverages.len() + result.skipped.len(), faces.len());
            for mode in PaymentMode::ALL {
                let sum: Decimal = result.coverages.iter().map(|c| c.premiums.get(mode).amount()).sum();
                prop_assert_eq!(result.total(mode).amount(), sum);
            }
        }
    }
}
