//! Property-Based Test Generators
//!
//! Proptest strategies for premium request documents.

use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_application::{ApplicationInput, ClientInput, CoverageInput};

use crate::builders::{ApplicationInputBuilder, ClientInputBuilder, CoverageInputBuilder};

/// Face amounts between 1000 and 10 million, in whole units or with cents
pub fn face_amount_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (1_000i64..10_000_000i64).prop_map(|n| n.to_string()),
        (100_000i64..1_000_000_000i64).prop_map(|n| Decimal::new(n, 2).to_string()),
    ]
}

/// Underwriting class codes, including one the engine does not know
pub fn underwriting_code_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("01".to_string())),
        Just(Some("02".to_string())),
        Just(Some("03".to_string())),
        Just(Some("04".to_string())),
        Just(Some("99".to_string())),
    ]
}

/// Table rating percents from 50% to 500%
pub fn table_rating_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of((50u32..=500u32).prop_map(|p| p.to_string()))
}

/// An insured with a tobacco answer
pub fn insured_strategy() -> impl Strategy<Value = ClientInput> {
    prop::bool::ANY.prop_map(|smoker| {
        let builder = ClientInputBuilder::new();
        let builder = if smoker { builder.smoker() } else { builder.non_smoker() };
        builder.build()
    })
}

/// A rateable coverage with a random definition and underwriting details
pub fn coverage_strategy() -> impl Strategy<Value = CoverageInput> {
    (
        prop::bool::ANY,
        face_amount_strategy(),
        underwriting_code_strategy(),
        table_rating_strategy(),
        insured_strategy(),
    )
        .prop_map(|(base, face, uw, rating, insured)| {
            let mut builder = CoverageInputBuilder::new()
                .with_face_amount(&face)
                .with_insured(insured);
            if !base {
                builder = builder.rider();
            }
            if let Some(code) = uw {
                builder = builder.with_underwriting_class(&code);
            }
            if let Some(percent) = rating {
                builder = builder.with_table_rating(&percent);
            }
            builder.build()
        })
}

/// An application with one to five rateable coverages
pub fn application_strategy() -> impl Strategy<Value = ApplicationInput> {
    prop::collection::vec(coverage_strategy(), 1..=5).prop_map(|coverages| {
        coverages
            .into_iter()
            .fold(ApplicationInputBuilder::new(), ApplicationInputBuilder::with_coverage)
            .build()
    })
}
