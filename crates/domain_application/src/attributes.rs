//! Attribute flattening
//!
//! The nested application document is flattened into two lookup structures
//! before rating: one table of application-level attributes and one table per
//! coverage. Rating then reads values by attribute name instead of walking
//! the document.
//!
//! Tables are multi-valued. Every role contributes one value per attribute
//! (an absent value is recorded as `""`), so the n-th value of each role
//! attribute belongs to the n-th role. Reads take the first value.

use indexmap::IndexMap;
use std::fmt;

use core_kernel::{ApplicationFormId, CoverageId};

use crate::error::PremiumError;
use crate::model::{text_of, ApplicationInput, CoverageInput, RoleInput};

/// Attribute names recorded during flattening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    ApplicationFormId,
    PlanId,
    RoleId,
    RoleCode,
    ClientId,
    ClientName,
    CompanyName,
    Gender,
    Tobacco,
    CountryCode,
    StateCode,
    DateOfBirth,
    TypeCode,
    CoverageDefinition,
    FaceAmount,
    TableRating,
    PermFlat,
    TempFlat,
    TempFlatDuration,
    UwClass,
}

impl Attribute {
    /// Field name as used by the intake front end
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::ApplicationFormId => "ApplicationFormGUID",
            Attribute::PlanId => "PlanGUID",
            Attribute::RoleId => "RoleGUID",
            Attribute::RoleCode => "RoleCode",
            Attribute::ClientId => "ClientGUID",
            Attribute::ClientName => "ClientName",
            Attribute::CompanyName => "CompanyName",
            Attribute::Gender => "Gender",
            Attribute::Tobacco => "Tobacco",
            Attribute::CountryCode => "CountryCode",
            Attribute::StateCode => "StateCode",
            Attribute::DateOfBirth => "DateOfBirth",
            Attribute::TypeCode => "TypeCode",
            Attribute::CoverageDefinition => "CoverageDefinition",
            Attribute::FaceAmount => "FaceAmount",
            Attribute::TableRating => "TableRating",
            Attribute::PermFlat => "PermFlat",
            Attribute::TempFlat => "TempFlat",
            Attribute::TempFlatDuration => "TempFlatDuration",
            Attribute::UwClass => "UWClass",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered, multi-valued attribute table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeTable {
    entries: IndexMap<Attribute, Vec<String>>,
}

impl AttributeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under the attribute
    pub fn push(&mut self, attribute: Attribute, value: impl Into<String>) {
        self.entries.entry(attribute).or_default().push(value.into());
    }

    /// All values recorded for the attribute, in insertion order
    pub fn values(&self, attribute: Attribute) -> &[String] {
        self.entries
            .get(&attribute)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First recorded value, which may be empty
    pub fn first(&self, attribute: Attribute) -> Option<&str> {
        self.values(attribute).first().map(String::as_str)
    }

    /// First recorded value, treating `""` as absent
    pub fn first_value(&self, attribute: Attribute) -> Option<&str> {
        self.first(attribute).filter(|v| !v.is_empty())
    }

    /// Number of distinct attributes recorded
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &[String])> {
        self.entries.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    fn push_role(&mut self, role: &RoleInput) {
        self.push(Attribute::RoleId, text_of(&role.role_id));
        self.push(Attribute::RoleCode, text_of(&role.role_code));

        let client = role.client.clone().unwrap_or_default();
        self.push(Attribute::ClientId, text_of(&client.client_id));
        self.push(Attribute::ClientName, text_of(&client.client_name));
        self.push(Attribute::CompanyName, text_of(&client.company_name));
        self.push(Attribute::Gender, text_of(&client.gender));
        self.push(Attribute::Tobacco, text_of(&client.tobacco_status));
        self.push(Attribute::CountryCode, text_of(&client.country_code));
        self.push(Attribute::StateCode, text_of(&client.state_code));
        self.push(Attribute::DateOfBirth, text_of(&client.date_of_birth));
        self.push(Attribute::TypeCode, text_of(&client.client_type_code));
    }

    fn from_coverage(coverage: &CoverageInput) -> Self {
        let mut table = Self::new();
        let details = coverage.details.clone().unwrap_or_default();

        table.push(Attribute::CoverageDefinition, text_of(&coverage.coverage_definition_id));
        table.push(Attribute::FaceAmount, text_of(&details.face_amount));
        table.push(Attribute::TableRating, text_of(&details.table_rating_percent));
        table.push(Attribute::PermFlat, text_of(&details.permanent_flat_extra));
        table.push(Attribute::TempFlat, text_of(&details.temporary_flat_extra));
        table.push(Attribute::TempFlatDuration, text_of(&details.temporary_flat_extra_duration));
        table.push(Attribute::UwClass, text_of(&details.underwriting_class));

        for role in &coverage.roles {
            table.push_role(role);
        }
        table
    }
}

/// The flattened form of one application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedApplication {
    pub application_form_id: ApplicationFormId,
    /// Application identifiers plus the owner roles' attributes
    pub application: AttributeTable,
    /// One table per coverage, in document order
    pub coverages: IndexMap<CoverageId, AttributeTable>,
}

impl FlattenedApplication {
    /// Flattens an application document
    ///
    /// A coverage identifier seen twice keeps its first position but takes
    /// the later coverage's attributes.
    ///
    /// # Errors
    ///
    /// Returns `PremiumError::MissingIdentifier` when the application form
    /// identifier or a coverage identifier is absent or empty.
    pub fn flatten(input: &ApplicationInput) -> Result<Self, PremiumError> {
        let application_form_id = text_of(&input.application_form_id);
        if application_form_id.is_empty() {
            return Err(PremiumError::MissingIdentifier(Attribute::ApplicationFormId.name()));
        }

        let mut application = AttributeTable::new();
        application.push(Attribute::ApplicationFormId, application_form_id);
        application.push(Attribute::PlanId, text_of(&input.plan_id));
        for role in &input.roles {
            application.push_role(role);
        }

        let mut coverages = IndexMap::with_capacity(input.coverages.len());
        for coverage in &input.coverages {
            let coverage_id = text_of(&coverage.coverage_id);
            // An empty id would key every such coverage as "_premium".
            if coverage_id.is_empty() {
                return Err(PremiumError::MissingIdentifier("CoverageGUID"));
            }
            coverages.insert(CoverageId::new(coverage_id), AttributeTable::from_coverage(coverage));
        }

        Ok(Self {
            application_form_id: ApplicationFormId::new(application_form_id),
            application,
            coverages,
        })
    }
}
