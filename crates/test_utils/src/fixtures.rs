//! Pre-built Test Fixtures
//!
//! Ready-to-use applications and storage contents with known premiums.

use rust_decimal_macros::dec;
use serde_json::{json, Map, Value};

use domain_application::{ApplicationInput, CodeEntry, CoverageDetail, UnderwritingClass};

use crate::builders::{ApplicationInputBuilder, ClientInputBuilder, CoverageInputBuilder};

/// Applications with hand-checked premiums
pub struct ApplicationFixtures;

impl ApplicationFixtures {
    /// One standard base coverage of 100000: annual premium 50.00
    pub fn single_base_coverage() -> ApplicationInput {
        ApplicationInputBuilder::new()
            .with_id("APP-1")
            .with_coverage(
                CoverageInputBuilder::new()
                    .with_id("COV-1")
                    .with_underwriting_class("01")
                    .with_insured(ClientInputBuilder::new().non_smoker().build())
                    .build(),
            )
            .build()
    }

    /// Base coverage plus a rider of 50000 on a smoker: annual 50.00 + 45.00
    pub fn base_and_rider_smoker() -> ApplicationInput {
        let insured = ClientInputBuilder::new().with_name("Pat Doe").smoker().build();
        ApplicationInputBuilder::new()
            .with_id("APP-2")
            .with_owner(ClientInputBuilder::new().with_name("Pat Doe").build())
            .with_coverage(CoverageInputBuilder::new().with_id("COV-BASE").build())
            .with_coverage(
                CoverageInputBuilder::new()
                    .with_id("COV-RIDER")
                    .rider()
                    .with_face_amount("50000")
                    .with_insured(insured)
                    .build(),
            )
            .build()
    }

    /// A coverage still waiting for its face amount
    pub fn pending_face_amount() -> ApplicationInput {
        ApplicationInputBuilder::new()
            .with_id("APP-3")
            .with_coverage(CoverageInputBuilder::new().with_id("COV-PENDING").without_face_amount().build())
            .build()
    }
}

/// Detail storage contents
pub struct DetailFixtures;

impl DetailFixtures {
    /// A fully underwritten coverage detail
    pub fn rated_coverage() -> CoverageDetail {
        CoverageDetail {
            table_rating: Some(dec!(1.5)),
            permanent_flat_extra: Some(2),
            temporary_flat_extra: Some(5),
            temporary_flat_extra_duration: Some(3),
            underwriting_class: Some(UnderwritingClass::PreferredPlus),
            ..CoverageDetail::new(dec!(250000))
        }
    }

    /// Medical questionnaire answers as posted by the front end
    pub fn medical_answers() -> Map<String, Value> {
        let answers = json!({
            "HeartCondition": "N",
            "Diabetes": false,
            "HeightCm": 180,
            "WeightKg": 82.5,
            "Medications": "None",
            "Notes": null
        });
        match answers {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Code table contents
pub struct CodeFixtures;

impl CodeFixtures {
    pub fn countries() -> Vec<CodeEntry> {
        vec![CodeEntry::new("US", "United States"), CodeEntry::new("CA", "Canada")]
    }

    pub fn states() -> Vec<CodeEntry> {
        vec![CodeEntry::new("TX", "Texas"), CodeEntry::new("NY", "New York")]
    }

    pub fn provinces() -> Vec<CodeEntry> {
        vec![CodeEntry::new("ON", "Ontario")]
    }
}
