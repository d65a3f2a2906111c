//! Intake writes
//!
//! Forms posted by the coverage, owner and beneficiary screens, and the
//! records the intake services hand to `IntakeStorePort`. Every new entity
//! receives its identifier from the service's `IdGenerator` before the store
//! is called, so a store write never has to report generated keys back.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use core_kernel::{AddressId, ApplicationFormId, ClientId, CoverageDefinitionId, CoverageId, PlanId, RoleId};

use crate::details::{DetailRow, DetailValue, SaveCoverageDetailsRequest};
use crate::model::{text_of, FieldValue};

/// Name of the coverage definition every plan carries for its base coverage
pub const BASE_COVERAGE_NAME: &str = "Base coverage";

/// Role and status codes written by the intake screens
pub mod codes {
    pub const OWNER_ROLE: &str = "01";
    pub const INSURED_ROLE: &str = "02";
    pub const AGENT_ROLE: &str = "03";
    pub const AGENT_CLIENT_TYPE: &str = "03";
    pub const ACTIVE_STATUS: &str = "01";
}

/// Beneficiary allocation field names in the role detail table
pub mod allocation_fields {
    pub const RELATIONSHIP_TO_INSURED: &str = "Relationship to Insured";
    pub const RELATED_INSURED: &str = "Related Insured";
    pub const ALLOCATION: &str = "Allocation";
    pub const TYPE: &str = "Type";
    pub const COVERAGE_ID: &str = "Coverage ID";
}

/// Treats blank strings as absent
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
}

fn blank_as_none_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match blank_as_none(deserializer)? {
        Some(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Base coverage
// ---------------------------------------------------------------------------

/// Base coverage form
///
/// Insureds are referenced by an existing role (typically an owner role or a
/// role created on the insured screen); the coverage gets new insured roles
/// for the clients behind them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseCoverageRequest {
    #[serde(rename = "planGUID", default, deserialize_with = "blank_as_none")]
    pub plan_id: Option<String>,
    /// `"joint"` adds the second insured
    #[serde(default)]
    pub coverage_type: Option<String>,
    #[serde(default)]
    pub insured1: Option<FieldValue>,
    #[serde(default)]
    pub insured1_is_same_as_owner: bool,
    #[serde(default)]
    pub insured2: Option<FieldValue>,
    #[serde(default)]
    pub insured2_is_same_as_owner: bool,
    #[serde(flatten)]
    pub details: SaveCoverageDetailsRequest,
}

/// An insured named on the base coverage form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsuredRef {
    pub role_id: RoleId,
    pub same_as_owner: bool,
}

impl BaseCoverageRequest {
    pub fn is_joint(&self) -> bool {
        self.coverage_type.as_deref() == Some("joint")
    }

    /// Named insureds in screen order; the second counts only on joint coverages
    pub fn insureds(&self) -> Vec<InsuredRef> {
        let mut slots = vec![(&self.insured1, self.insured1_is_same_as_owner)];
        if self.is_joint() {
            slots.push((&self.insured2, self.insured2_is_same_as_owner));
        }
        slots
            .into_iter()
            .filter_map(|(value, same_as_owner)| match text_of(value).trim() {
                "" => None,
                role => Some(InsuredRef {
                    role_id: RoleId::new(role),
                    same_as_owner,
                }),
            })
            .collect()
    }
}

/// Insured role to create for a new coverage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInsuredRole {
    pub role_id: RoleId,
    pub client_id: ClientId,
    /// Owner-insureds are already tied to the form through their owner role
    pub linked_to_application: bool,
}

/// A coverage with its insured roles and detail rows, written together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBaseCoverage {
    pub coverage_id: CoverageId,
    pub application_form_id: ApplicationFormId,
    pub coverage_definition_id: CoverageDefinitionId,
    pub insured_roles: Vec<NewInsuredRole>,
    pub details: Vec<DetailRow>,
}

/// Identifiers created by a base coverage save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseCoverageSaved {
    #[serde(rename = "coverageGUID")]
    pub coverage_id: CoverageId,
    #[serde(rename = "coverageDefinitionGUID")]
    pub coverage_definition_id: CoverageDefinitionId,
    #[serde(rename = "applicationFormGUID")]
    pub application_form_id: ApplicationFormId,
    #[serde(rename = "planGUID")]
    pub plan_id: PlanId,
    #[serde(rename = "insuredRoles")]
    pub insured_roles: Vec<InsuredRoleCreated>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuredRoleCreated {
    /// Role the form named
    #[serde(rename = "insuredId")]
    pub insured_id: RoleId,
    /// Role created on the coverage
    #[serde(rename = "roleGUID")]
    pub role_id: RoleId,
}

/// A plan's coverage definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageDefinition {
    #[serde(rename = "coverageDefinitionGUID")]
    pub id: CoverageDefinitionId,
    #[serde(rename = "coverageName")]
    pub name: String,
}

impl CoverageDefinition {
    pub fn new(id: impl Into<CoverageDefinitionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn is_base(&self) -> bool {
        self.name == BASE_COVERAGE_NAME
    }
}

// ---------------------------------------------------------------------------
// Owners
// ---------------------------------------------------------------------------

/// Owner screen submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerSaveRequest {
    pub application_form_number: String,
    pub owners: Vec<OwnerInput>,
}

/// One owner, individual or corporate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerInput {
    #[serde(rename = "planGUID", deserialize_with = "blank_as_none")]
    pub plan_id: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub role_code: Option<String>,
    #[serde(flatten)]
    pub client: ClientDetails,
    pub addresses: Vec<AddressInput>,
}

/// Client columns of an owner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientDetails {
    #[serde(deserialize_with = "blank_as_none")]
    pub type_code: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub company_name: Option<String>,
    #[serde(deserialize_with = "blank_as_none_date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(deserialize_with = "blank_as_none")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub tobacco: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub country_code: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub state_code: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub ssn: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub business_registration_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressInput {
    /// `01` residential, `02` mailing
    #[serde(deserialize_with = "blank_as_none")]
    pub type_code: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub address_line1: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub address_line2: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub city: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub state_code: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub country_code: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub address_id: AddressId,
    pub address: AddressInput,
}

/// Owner client, role and addresses to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOwner {
    pub client_id: ClientId,
    pub role_id: RoleId,
    pub role_code: String,
    pub client: ClientDetails,
    pub addresses: Vec<NewAddress>,
}

/// Agent role recorded on a form for the user who keyed it
///
/// The store reuses an existing agent client with the same name and only
/// creates `candidate_client_id` when there is none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOfRecord {
    pub role_id: RoleId,
    pub candidate_client_id: ClientId,
    pub first_name: String,
    pub last_name: String,
}

impl AgentOfRecord {
    /// Splits the display name at its first space
    pub fn new(role_id: RoleId, candidate_client_id: ClientId, name: &str) -> Self {
        let (first, last) = name.trim().split_once(' ').unwrap_or((name.trim(), ""));
        Self {
            role_id,
            candidate_client_id,
            first_name: first.to_string(),
            last_name: last.trim().to_string(),
        }
    }
}

/// Everything an owner save writes, applied in one transaction
///
/// The form is looked up by number inside the transaction; when absent it
/// is created as `candidate_form_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerBatch {
    pub application_form_number: String,
    pub candidate_form_id: ApplicationFormId,
    pub plan_id: Option<PlanId>,
    pub owners: Vec<NewOwner>,
    pub agent: Option<AgentOfRecord>,
}

/// Identifiers created by an owner save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSaveResponse {
    #[serde(rename = "applicationFormGUID")]
    pub application_form_id: ApplicationFormId,
    pub owners: Vec<OwnerSaved>,
    #[serde(rename = "agentRoleGUID", default, skip_serializing_if = "Option::is_none")]
    pub agent_role_id: Option<RoleId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSaved {
    #[serde(rename = "clientGUID")]
    pub client_id: ClientId,
    #[serde(rename = "roleGUID")]
    pub role_id: RoleId,
    #[serde(rename = "roleCode")]
    pub role_code: String,
    #[serde(rename = "addressGUIDs")]
    pub address_ids: Vec<AddressId>,
}

impl From<&NewOwner> for OwnerSaved {
    fn from(owner: &NewOwner) -> Self {
        Self {
            client_id: owner.client_id.clone(),
            role_id: owner.role_id.clone(),
            role_code: owner.role_code.clone(),
            address_ids: owner.addresses.iter().map(|a| a.address_id.clone()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Beneficiaries
// ---------------------------------------------------------------------------

/// Beneficiary screen submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BeneficiaryAllocationRequest {
    pub application_form_number: String,
    pub beneficiary_allocations: Vec<BeneficiaryAllocation>,
}

/// Allocation of one beneficiary role to a coverage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BeneficiaryAllocation {
    #[serde(rename = "roleGUID")]
    pub role_id: String,
    #[serde(deserialize_with = "blank_as_none")]
    pub coverage_id: Option<String>,
    /// `primary` or `contingent`
    #[serde(rename = "type", deserialize_with = "blank_as_none")]
    pub allocation_type: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub relationship_to_insured: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub related_insured: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub allocation: Option<String>,
}

impl BeneficiaryAllocation {
    /// Text rows for the answered fields
    pub fn to_rows(&self) -> Vec<DetailRow> {
        [
            (allocation_fields::RELATIONSHIP_TO_INSURED, &self.relationship_to_insured),
            (allocation_fields::RELATED_INSURED, &self.related_insured),
            (allocation_fields::ALLOCATION, &self.allocation),
            (allocation_fields::TYPE, &self.allocation_type),
            (allocation_fields::COVERAGE_ID, &self.coverage_id),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .as_ref()
                .map(|text| DetailRow::new(name, DetailValue::Text(text.clone())))
        })
        .collect()
    }
}
