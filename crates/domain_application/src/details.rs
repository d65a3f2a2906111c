//! Detail rows
//!
//! Coverage and role details are persisted as entity-attribute-value rows: one
//! row per field, with the value in exactly one of four typed columns
//! (decimal, integer, text, date). This module maps the typed coverage detail
//! and free-form medical answers to and from those rows.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApplicationError;
use crate::model::{parse_decimal_text, text_of, FieldValue};
use crate::underwriting::UnderwritingClass;

/// Longest field name the detail tables accept
pub const MAX_FIELD_NAME_LENGTH: usize = 200;

/// Stored codes for yes/no answers
pub const YES_CODE: &str = "01";
pub const NO_CODE: &str = "02";

/// Coverage detail field names
pub mod fields {
    pub const FACE_AMOUNT: &str = "FaceAmount";
    pub const TABLE_RATING: &str = "TableRating";
    pub const PERM_FLAT_EXTRA: &str = "PermFlatExtra";
    pub const TEMP_FLAT_EXTRA: &str = "TempFlatExtra";
    pub const TEMP_FLAT_EXTRA_DURATION: &str = "TempFlatExtraDuration";
    pub const UW_CLASS: &str = "UWClass";
}

/// Value of one detail row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DetailValue {
    Decimal(Decimal),
    Integer(i32),
    Text(String),
    Date(NaiveDate),
}

impl DetailValue {
    pub fn kind(&self) -> &'static str {
        match self {
            DetailValue::Decimal(_) => "decimal",
            DetailValue::Integer(_) => "integer",
            DetailValue::Text(_) => "text",
            DetailValue::Date(_) => "date",
        }
    }
}

/// One field of a coverage or role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRow {
    pub field_name: String,
    pub value: DetailValue,
}

impl DetailRow {
    pub fn new(field_name: impl Into<String>, value: DetailValue) -> Self {
        Self {
            field_name: field_name.into(),
            value,
        }
    }
}

/// Typed view of a coverage's stored details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageDetail {
    pub face_amount: Decimal,
    /// Table rating as a factor (1.5 for 150%)
    pub table_rating: Option<Decimal>,
    pub permanent_flat_extra: Option<i32>,
    pub temporary_flat_extra: Option<i32>,
    pub temporary_flat_extra_duration: Option<i32>,
    pub underwriting_class: Option<UnderwritingClass>,
}

impl CoverageDetail {
    pub fn new(face_amount: Decimal) -> Self {
        Self {
            face_amount,
            table_rating: None,
            permanent_flat_extra: None,
            temporary_flat_extra: None,
            temporary_flat_extra_duration: None,
            underwriting_class: None,
        }
    }

    /// Rows for every value that is set
    pub fn to_rows(&self) -> Vec<DetailRow> {
        let mut rows = vec![DetailRow::new(fields::FACE_AMOUNT, DetailValue::Decimal(self.face_amount))];

        if let Some(rating) = self.table_rating {
            rows.push(DetailRow::new(fields::TABLE_RATING, DetailValue::Decimal(rating)));
        }
        let integers = [
            (fields::PERM_FLAT_EXTRA, self.permanent_flat_extra),
            (fields::TEMP_FLAT_EXTRA, self.temporary_flat_extra),
            (fields::TEMP_FLAT_EXTRA_DURATION, self.temporary_flat_extra_duration),
        ];
        for (name, value) in integers {
            if let Some(value) = value {
                rows.push(DetailRow::new(name, DetailValue::Integer(value)));
            }
        }
        if let Some(class) = self.underwriting_class {
            rows.push(DetailRow::new(fields::UW_CLASS, DetailValue::Text(class.code().to_string())));
        }
        rows
    }

    /// Rebuilds the typed detail from stored rows
    ///
    /// Rows with unrecognised field names are ignored.
    ///
    /// # Errors
    ///
    /// `InvalidDetail` when a known field holds the wrong kind of value, the
    /// underwriting code is unknown, or no face amount is stored.
    pub fn from_rows(rows: &[DetailRow]) -> Result<Self, ApplicationError> {
        let mut face_amount = None;
        let mut detail = Self::new(Decimal::ZERO);

        for row in rows {
            match (row.field_name.as_str(), &row.value) {
                (fields::FACE_AMOUNT, DetailValue::Decimal(v)) => face_amount = Some(*v),
                (fields::TABLE_RATING, DetailValue::Decimal(v)) => detail.table_rating = Some(*v),
                (fields::PERM_FLAT_EXTRA, DetailValue::Integer(v)) => detail.permanent_flat_extra = Some(*v),
                (fields::TEMP_FLAT_EXTRA, DetailValue::Integer(v)) => detail.temporary_flat_extra = Some(*v),
                (fields::TEMP_FLAT_EXTRA_DURATION, DetailValue::Integer(v)) => {
                    detail.temporary_flat_extra_duration = Some(*v)
                }
                (fields::UW_CLASS, DetailValue::Text(code)) => {
                    let class = UnderwritingClass::lookup_code(code).ok_or_else(|| {
                        ApplicationError::invalid_detail(fields::UW_CLASS, format!("unknown code '{}'", code))
                    })?;
                    detail.underwriting_class = Some(class);
                }
                (
                    name @ (fields::FACE_AMOUNT
                    | fields::TABLE_RATING
                    | fields::PERM_FLAT_EXTRA
                    | fields::TEMP_FLAT_EXTRA
                    | fields::TEMP_FLAT_EXTRA_DURATION
                    | fields::UW_CLASS),
                    value,
                ) => {
                    return Err(ApplicationError::invalid_detail(
                        name,
                        format!("unexpected {} value", value.kind()),
                    ));
                }
                _ => {}
            }
        }

        detail.face_amount = face_amount
            .ok_or_else(|| ApplicationError::invalid_detail(fields::FACE_AMOUNT, "not stored"))?;
        Ok(detail)
    }
}

/// Coverage detail form as submitted by the coverage screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCoverageDetailsRequest {
    #[serde(default)]
    pub face_amount: Option<FieldValue>,
    /// Percent text such as "150%"
    #[serde(default)]
    pub table_rating: Option<FieldValue>,
    #[serde(default)]
    pub permanent_flat_extra_amount: Option<FieldValue>,
    #[serde(default)]
    pub temporary_flat_extra_amount: Option<FieldValue>,
    #[serde(default)]
    pub temporary_flat_extra_duration: Option<FieldValue>,
    /// Screen label such as "Preferred Plus"
    #[serde(default)]
    pub underwriting_class: Option<FieldValue>,
}

impl TryFrom<SaveCoverageDetailsRequest> for CoverageDetail {
    type Error = ApplicationError;

    fn try_from(request: SaveCoverageDetailsRequest) -> Result<Self, Self::Error> {
        let face_amount = match text_of(&request.face_amount).trim() {
            "" => return Err(ApplicationError::invalid_detail("faceAmount", "required")),
            text => parse_decimal("faceAmount", text)?,
        };

        let table_rating = match text_of(&request.table_rating).trim().trim_end_matches('%').trim() {
            "" => None,
            text => Some(parse_decimal("tableRating", text)? / Decimal::ONE_HUNDRED),
        };

        let underwriting_class = match text_of(&request.underwriting_class).trim() {
            "" => None,
            label => Some(UnderwritingClass::from_label(label)),
        };

        Ok(CoverageDetail {
            face_amount,
            table_rating,
            permanent_flat_extra: parse_integer("permanentFlatExtraAmount", &request.permanent_flat_extra_amount)?,
            temporary_flat_extra: parse_integer("temporaryFlatExtraAmount", &request.temporary_flat_extra_amount)?,
            temporary_flat_extra_duration: parse_integer(
                "temporaryFlatExtraDuration",
                &request.temporary_flat_extra_duration,
            )?,
            underwriting_class,
        })
    }
}

fn parse_decimal(field: &str, text: &str) -> Result<Decimal, ApplicationError> {
    parse_decimal_text(text)
        .ok_or_else(|| ApplicationError::invalid_detail(field, format!("'{}' is not a number", text)))
}

fn parse_integer(field: &str, value: &Option<FieldValue>) -> Result<Option<i32>, ApplicationError> {
    match text_of(value).trim() {
        "" => Ok(None),
        text => text
            .parse::<i32>()
            .map(Some)
            .map_err(|_| ApplicationError::invalid_detail(field, format!("'{}' is not an integer", text))),
    }
}

/// Converts a medical questionnaire object into role detail rows
///
/// `"Y"` and `true` are stored as "01", `"N"` and `false` as "02"; other
/// strings are kept as text. Numbers that fit an `i32` become integers and
/// all other numbers decimals. `null`, arrays and nested objects are skipped.
/// Field names longer than the column are truncated.
pub fn medical_rows_from_json(answers: &Map<String, Value>) -> Vec<DetailRow> {
    answers
        .iter()
        .filter_map(|(name, value)| {
            let value = match value {
                Value::String(s) if s == "Y" => DetailValue::Text(YES_CODE.to_string()),
                Value::String(s) if s == "N" => DetailValue::Text(NO_CODE.to_string()),
                Value::String(s) => DetailValue::Text(s.clone()),
                Value::Bool(b) => DetailValue::Text(if *b { YES_CODE } else { NO_CODE }.to_string()),
                Value::Number(n) => number_value(n)?,
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            Some(DetailRow::new(truncate_field_name(name), value))
        })
        .collect()
}

fn number_value(n: &serde_json::Number) -> Option<DetailValue> {
    if let Some(i) = n.as_i64() {
        return Some(match i32::try_from(i) {
            Ok(v) => DetailValue::Integer(v),
            Err(_) => DetailValue::Decimal(Decimal::from(i)),
        });
    }
    parse_decimal_text(&n.to_string()).map(DetailValue::Decimal)
}

fn truncate_field_name(name: &str) -> String {
    name.chars().take(MAX_FIELD_NAME_LENGTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_rows_round_trip_typed_detail() {
        let detail = CoverageDetail {
            face_amount: dec!(250000),
            table_rating: Some(dec!(1.5)),
            permanent_flat_extra: Some(5),
            temporary_flat_extra: None,
            temporary_flat_extra_duration: Some(3),
            underwriting_class: Some(UnderwritingClass::Preferred),
        };
        let rows = detail.to_rows();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], DetailRow::new("FaceAmount", DetailValue::Decimal(dec!(250000))));
        assert_eq!(CoverageDetail::from_rows(&rows).unwrap(), detail);
    }

    #[test]
    fn test_from_rows_rejects_wrong_kind() {
        let rows = vec![
            DetailRow::new("FaceAmount", DetailValue::Decimal(dec!(1000))),
            DetailRow::new("PermFlatExtra", DetailValue::Text("5".into())),
        ];
        let err = CoverageDetail::from_rows(&rows).unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidDetail { ref field, .. } if field == "PermFlatExtra"));
    }

    #[test]
    fn test_from_rows_requires_face_amount() {
        let rows = vec![DetailRow::new("UWClass", DetailValue::Text("02".into()))];
        assert!(CoverageDetail::from_rows(&rows).is_err());
    }

    #[test]
    fn test_request_conversion() {
        let request: SaveCoverageDetailsRequest = serde_json::from_value(json!({
            "faceAmount": 100000,
            "tableRating": "150%",
            "permanentFlatExtraAmount": "10",
            "temporaryFlatExtraDuration": 2,
            "underwritingClass": "Preferred Plus"
        }))
        .unwrap();
        let detail = CoverageDetail::try_from(request).unwrap();
        assert_eq!(detail.face_amount, dec!(100000));
        assert_eq!(detail.table_rating, Some(dec!(1.5)));
        assert_eq!(detail.permanent_flat_extra, Some(10));
        assert_eq!(detail.temporary_flat_extra, None);
        assert_eq!(detail.temporary_flat_extra_duration, Some(2));
        assert_eq!(detail.underwriting_class, Some(UnderwritingClass::PreferredPlus));
    }

    #[test]
    fn test_request_without_face_amount() {
        let err = CoverageDetail::try_from(SaveCoverageDetailsRequest::default()).unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidDetail { .. }));
    }

    #[test]
    fn test_medical_rows() {
        let answers = json!({
            "Diabetes": "Y",
            "HeartDisease": false,
            "Notes": "occasional migraines",
            "Weight": 82,
            "Height": 1.78,
            "Medication": null
        });
        let rows = medical_rows_from_json(answers.as_object().unwrap());
        let find = |name: &str| rows.iter().find(|r| r.field_name == name).map(|r| r.value.clone());

        assert_eq!(rows.len(), 5);
        assert_eq!(find("Diabetes"), Some(DetailValue::Text("01".into())));
        assert_eq!(find("HeartDisease"), Some(DetailValue::Text("02".into())));
        assert_eq!(find("Weight"), Some(DetailValue::Integer(82)));
        assert_eq!(find("Height"), Some(DetailValue::Decimal(dec!(1.78))));
        assert_eq!(find("Medication"), None);
    }

    #[test]
    fn test_long_field_names_truncated() {
        let mut answers = Map::new();
        answers.insert("q".repeat(250), json!("N"));
        let rows = medical_rows_from_json(&answers);
        assert_eq!(rows[0].field_name.len(), MAX_FIELD_NAME_LENGTH);
    }
}
