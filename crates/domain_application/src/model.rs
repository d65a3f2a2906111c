//! Application input model
//!
//! These types mirror the JSON document the intake front end posts for a
//! premium quote: an `application` envelope holding the owner roles and the
//! coverages, each coverage carrying its numeric details and insured roles.
//!
//! Scalar attributes are kept as text. The front end sends face amounts and
//! table ratings as JSON numbers in some screens and as strings in others, and
//! a malformed number has to surface as a calculation error rather than a
//! request-shape error, so parsing happens in the engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A scalar attribute value carried as text
///
/// Deserializes from a JSON string, number or boolean. Numbers keep their JSON
/// rendering (`100000` becomes `"100000"`). `null` is handled by the enclosing
/// `Option`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldValue(String);

impl FieldValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match RawScalar::deserialize(deserializer)? {
            RawScalar::Text(s) => s,
            RawScalar::Number(n) => n.to_string(),
            RawScalar::Flag(b) => b.to_string(),
        };
        Ok(FieldValue(text))
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Returns the text of an optional attribute, or `""` when absent
pub fn text_of(value: &Option<FieldValue>) -> &str {
    value.as_ref().map(FieldValue::as_str).unwrap_or("")
}

/// Parses decimal text in plain or scientific notation
///
/// The accepted grammar is `[+-]digits[.digits][(e|E)[+-]digits]`, with at
/// least one mantissa digit. Digit separators, radix prefixes and surrounding
/// whitespace are rejected.
pub fn parse_decimal_text(text: &str) -> Option<Decimal> {
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(at) => (&text[..at], Some(&text[at + 1..])),
        None => (text, None),
    };
    let unsigned = mantissa.strip_prefix(['+', '-']).unwrap_or(mantissa);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return None;
    }

    match exponent {
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            if digits.is_empty() || !all_digits(digits) {
                return None;
            }
            Decimal::from_scientific(text).ok()
        }
        None => Decimal::from_str(text).ok(),
    }
}

fn nullable_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Request envelope posted by the front end
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationEnvelope {
    #[serde(default)]
    pub application: ApplicationInput,
}

/// The premium engine's sole input unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationInput {
    #[serde(rename = "ApplicationFormGUID", default, skip_serializing_if = "Option::is_none")]
    pub application_form_id: Option<FieldValue>,
    #[serde(rename = "PlanGUID", default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<FieldValue>,
    /// Application-level roles (owners, agents)
    #[serde(default, deserialize_with = "nullable_seq")]
    pub roles: Vec<RoleInput>,
    #[serde(default, deserialize_with = "nullable_seq")]
    pub coverages: Vec<CoverageInput>,
}

/// A party's relationship to an application or coverage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleInput {
    #[serde(rename = "RoleGUID", default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<FieldValue>,
    #[serde(rename = "RoleCode", default, skip_serializing_if = "Option::is_none")]
    pub role_code: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientInput>,
}

/// The person or company behind a role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInput {
    #[serde(rename = "ClientGUID", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<FieldValue>,
    #[serde(rename = "ClientName", default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<FieldValue>,
    #[serde(rename = "CompanyName", default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<FieldValue>,
    #[serde(rename = "Gender", default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<FieldValue>,
    /// `"Smoker"` or `"Non-Smoker"`
    #[serde(rename = "Tobacco", default, skip_serializing_if = "Option::is_none")]
    pub tobacco_status: Option<FieldValue>,
    #[serde(rename = "CountryCode", default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<FieldValue>,
    #[serde(rename = "StateCode", default, skip_serializing_if = "Option::is_none")]
    pub state_code: Option<FieldValue>,
    #[serde(rename = "DateOfBirth", default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<FieldValue>,
    #[serde(rename = "TypeCode", default, skip_serializing_if = "Option::is_none")]
    pub client_type_code: Option<FieldValue>,
}

/// A single benefit line within the application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageInput {
    #[serde(rename = "CoverageGUID", default, skip_serializing_if = "Option::is_none")]
    pub coverage_id: Option<FieldValue>,
    #[serde(rename = "CoverageDefinitionGUID", default, skip_serializing_if = "Option::is_none")]
    pub coverage_definition_id: Option<FieldValue>,
    #[serde(rename = "coveragedetails", default, skip_serializing_if = "Option::is_none")]
    pub details: Option<CoverageDetailInput>,
    /// Insureds covered by this coverage
    #[serde(default, deserialize_with = "nullable_seq")]
    pub roles: Vec<RoleInput>,
}

/// Numeric and underwriting details of a coverage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageDetailInput {
    #[serde(rename = "FaceAmount", default, skip_serializing_if = "Option::is_none")]
    pub face_amount: Option<FieldValue>,
    /// Percentage, e.g. `150` for 150%
    #[serde(rename = "TableRating", default, skip_serializing_if = "Option::is_none")]
    pub table_rating_percent: Option<FieldValue>,
    #[serde(rename = "PermFlat", default, skip_serializing_if = "Option::is_none")]
    pub permanent_flat_extra: Option<FieldValue>,
    #[serde(rename = "TempFlat", default, skip_serializing_if = "Option::is_none")]
    pub temporary_flat_extra: Option<FieldValue>,
    #[serde(rename = "TempFlatDuration", default, skip_serializing_if = "Option::is_none")]
    pub temporary_flat_extra_duration: Option<FieldValue>,
    #[serde(rename = "UWClass", default, skip_serializing_if = "Option::is_none")]
    pub underwriting_class: Option<FieldValue>,
}
