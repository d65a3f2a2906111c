//! Application intake services
//!
//! Services orchestrate the engine and the storage ports. Ports are handed in
//! through constructors as `Arc<dyn Port>` so the same service runs against
//! PostgreSQL in the server and against the in-memory adapters in tests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use core_kernel::{
    AddressId, ApplicationFormId, ClientId, CoverageId, IdGenerator, PlanId, PortError, Principal, RoleId,
};

use crate::calculator::PremiumCalculator;
use crate::details::{medical_rows_from_json, CoverageDetail, DetailRow};
use crate::error::ApplicationError;
use crate::intake::{
    codes as intake_codes, AgentOfRecord, BaseCoverageRequest, BaseCoverageSaved, BeneficiaryAllocationRequest,
    CoverageDefinition, InsuredRoleCreated, NewAddress, NewBaseCoverage, NewInsuredRole, NewOwner, OwnerBatch,
    OwnerSaveRequest, OwnerSaveResponse, OwnerSaved,
};
use crate::model::ApplicationInput;
use crate::ports::{CodeEntry, CodeLookupPort, DetailStorePort, IntakeStorePort, SaveOutcome};
use crate::result::PremiumResult;

/// Code table names for the address dropdowns
pub const COUNTRY_CODE_NAME: &str = "frcodeCountry";
pub const STATE_CODE_NAME: &str = "frcodeState";
pub const PROVINCE_CODE_NAME: &str = "frcodeProvince";

/// Premium quoting
#[derive(Debug, Clone, Default)]
pub struct PremiumService {
    calculator: PremiumCalculator,
}

impl PremiumService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rates an application
    #[instrument(skip_all, fields(application_form_id = tracing::field::Empty))]
    pub fn calculate(&self, input: &ApplicationInput) -> Result<PremiumResult, ApplicationError> {
        match self.calculator.calculate(input) {
            Ok(result) => {
                tracing::Span::current().record("application_form_id", result.application_form_id.as_str());
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "Premium calculation failed");
                Err(e.into())
            }
        }
    }
}

/// Coverage and role detail storage
#[derive(Clone)]
pub struct DetailService {
    store: Arc<dyn DetailStorePort>,
}

impl DetailService {
    pub fn new(store: Arc<dyn DetailStorePort>) -> Self {
        Self { store }
    }

    /// Saves a coverage's details as its complete field set
    ///
    /// New fields are inserted, stored ones updated and fields the detail no
    /// longer carries are deleted, all inside the store's transaction.
    #[instrument(skip_all, fields(coverage_id = %coverage_id))]
    pub async fn save_coverage_details(
        &self,
        coverage_id: &CoverageId,
        detail: &CoverageDetail,
    ) -> Result<SaveOutcome, ApplicationError> {
        require_id("coverage", coverage_id.as_str())?;

        let outcome = self.store.save_coverage_details(coverage_id, detail.to_rows()).await?;

        info!(
            inserted = outcome.inserted,
            updated = outcome.updated,
            removed = outcome.removed,
            "Coverage details saved"
        );
        Ok(outcome)
    }

    /// Loads the typed details of a coverage
    ///
    /// # Errors
    ///
    /// `PortError::NotFound` when nothing is stored for the coverage
    #[instrument(skip_all, fields(coverage_id = %coverage_id))]
    pub async fn load_coverage_details(&self, coverage_id: &CoverageId) -> Result<CoverageDetail, ApplicationError> {
        let rows = self.store.list_coverage_details(coverage_id).await?;
        if rows.is_empty() {
            return Err(PortError::not_found("CoverageDetail", coverage_id).into());
        }
        debug!(rows = rows.len(), "Coverage detail rows loaded");
        CoverageDetail::from_rows(&rows)
    }

    /// Replaces a role's medical answers, returning the number of rows stored
    #[instrument(skip_all, fields(role_id = %role_id))]
    pub async fn save_medical_details(
        &self,
        role_id: &RoleId,
        answers: &Map<String, Value>,
    ) -> Result<usize, ApplicationError> {
        require_id("role", role_id.as_str())?;

        let rows = medical_rows_from_json(answers);
        let stored = rows.len();
        if stored < answers.len() {
            debug!(skipped = answers.len() - stored, "Medical answers without a storable value skipped");
        }
        self.store.replace_role_details(role_id, rows).await?;

        info!(rows = stored, "Medical details saved");
        Ok(stored)
    }

    /// Loads a role's stored medical answers
    #[instrument(skip_all, fields(role_id = %role_id))]
    pub async fn load_medical_details(&self, role_id: &RoleId) -> Result<Vec<DetailRow>, ApplicationError> {
        Ok(self.store.list_role_details(role_id).await?)
    }

    /// Records beneficiary allocations as role details
    ///
    /// Fields of an allocation are merged into the role's stored details;
    /// all allocations are written in one transaction.
    #[instrument(skip_all, fields(application_form_number = %request.application_form_number))]
    pub async fn save_beneficiary_allocations(
        &self,
        request: &BeneficiaryAllocationRequest,
    ) -> Result<usize, ApplicationError> {
        let mut batches = Vec::with_capacity(request.beneficiary_allocations.len());
        for allocation in &request.beneficiary_allocations {
            require_id("beneficiary role", &allocation.role_id)?;
            batches.push((RoleId::new(allocation.role_id.trim()), allocation.to_rows()));
        }

        let saved = batches.len();
        self.store.merge_role_details(batches).await?;

        info!(allocations = saved, "Beneficiary allocations saved");
        Ok(saved)
    }

    /// Health of the backing store
    pub async fn health_check(&self) -> core_kernel::HealthCheckResult {
        self.store.health_check().await
    }
}

/// Coverage creation and owner capture
///
/// Every entity id comes from the injected `IdGenerator`.
#[derive(Clone)]
pub struct IntakeService {
    store: Arc<dyn IntakeStorePort>,
    ids: Arc<dyn IdGenerator>,
}

impl IntakeService {
    pub fn new(store: Arc<dyn IntakeStorePort>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, ids }
    }

    /// Creates the base coverage of an application
    ///
    /// Details are validated before any lookup. A named insured whose role has
    /// no client is skipped; any other lookup failure aborts the save.
    #[instrument(skip_all, fields(application_form_number = %application_form_number, coverage_id = tracing::field::Empty))]
    pub async fn save_base_coverage(
        &self,
        application_form_number: &str,
        request: &BaseCoverageRequest,
    ) -> Result<BaseCoverageSaved, ApplicationError> {
        require_id("application form", application_form_number)?;
        let plan_id = request
            .plan_id
            .as_deref()
            .map(PlanId::new)
            .ok_or_else(|| ApplicationError::validation("planGUID is required"))?;
        let detail = CoverageDetail::try_from(request.details.clone())?;

        let application_form_id = self.store.find_application_form(application_form_number.trim()).await?;
        let coverage_definition_id = self.store.find_base_coverage_definition(&plan_id).await?;

        let coverage_id = CoverageId::new(self.ids.next_id());
        tracing::Span::current().record("coverage_id", coverage_id.as_str());

        let mut insured_roles = Vec::new();
        let mut created = Vec::new();
        for insured in request.insureds() {
            let client_id = match self.store.find_role_client(&insured.role_id).await {
                Ok(client_id) => client_id,
                Err(e) if e.is_not_found() => {
                    warn!(insured = %insured.role_id, "Insured role has no client, skipped");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let role_id = RoleId::new(self.ids.next_id());
            insured_roles.push(NewInsuredRole {
                role_id: role_id.clone(),
                client_id,
                linked_to_application: !insured.same_as_owner,
            });
            created.push(InsuredRoleCreated {
                insured_id: insured.role_id,
                role_id,
            });
        }

        self.store
            .create_base_coverage(NewBaseCoverage {
                coverage_id: coverage_id.clone(),
                application_form_id: application_form_id.clone(),
                coverage_definition_id: coverage_definition_id.clone(),
                insured_roles,
                details: detail.to_rows(),
            })
            .await?;

        info!(insureds = created.len(), "Base coverage saved");
        Ok(BaseCoverageSaved {
            coverage_id,
            coverage_definition_id,
            application_form_id,
            plan_id,
            insured_roles: created,
        })
    }

    /// Coverage definitions a plan offers besides its base coverage
    #[instrument(skip(self))]
    pub async fn additional_coverage_definitions(
        &self,
        plan_id: &PlanId,
    ) -> Result<Vec<CoverageDefinition>, ApplicationError> {
        require_id("plan", plan_id.as_str())?;
        Ok(self.store.additional_coverage_definitions(plan_id).await?)
    }

    /// Captures the owners of an application, creating the form if needed
    ///
    /// An agent principal is recorded as the form's agent of record;
    /// administrators keying a form are not.
    #[instrument(skip_all, fields(application_form_number = %request.application_form_number, user = %principal.username))]
    pub async fn save_owners(
        &self,
        principal: &Principal,
        request: OwnerSaveRequest,
    ) -> Result<OwnerSaveResponse, ApplicationError> {
        require_id("application form", &request.application_form_number)?;
        if request.owners.is_empty() {
            return Err(ApplicationError::validation("at least one owner is required"));
        }

        let plan_id = request.owners.iter().find_map(|o| o.plan_id.as_deref()).map(PlanId::new);
        let owners: Vec<NewOwner> = request
            .owners
            .into_iter()
            .map(|owner| NewOwner {
                client_id: ClientId::new(self.ids.next_id()),
                role_id: RoleId::new(self.ids.next_id()),
                role_code: owner.role_code.unwrap_or_else(|| intake_codes::OWNER_ROLE.to_string()),
                client: owner.client,
                addresses: owner
                    .addresses
                    .into_iter()
                    .map(|address| NewAddress {
                        address_id: AddressId::new(self.ids.next_id()),
                        address,
                    })
                    .collect(),
            })
            .collect();
        let agent = (!principal.is_admin()).then(|| {
            AgentOfRecord::new(
                RoleId::new(self.ids.next_id()),
                ClientId::new(self.ids.next_id()),
                &principal.username,
            )
        });

        let saved: Vec<OwnerSaved> = owners.iter().map(OwnerSaved::from).collect();
        let agent_role_id = agent.as_ref().map(|a| a.role_id.clone());
        let batch = OwnerBatch {
            application_form_number: request.application_form_number.trim().to_string(),
            candidate_form_id: ApplicationFormId::new(self.ids.next_id()),
            plan_id,
            owners,
            agent,
        };
        let application_form_id = self.store.save_owners(batch).await?;

        info!(owners = saved.len(), agent_of_record = agent_role_id.is_some(), "Owners saved");
        Ok(OwnerSaveResponse {
            application_form_id,
            owners: saved,
            agent_role_id,
        })
    }

    /// Health of the backing store
    pub async fn health_check(&self) -> core_kernel::HealthCheckResult {
        self.store.health_check().await
    }
}

fn require_id(entity: &str, id: &str) -> Result<(), ApplicationError> {
    if id.trim().is_empty() {
        Err(ApplicationError::validation(format!("{} identifier is required", entity)))
    } else {
        Ok(())
    }
}

/// Address dropdown contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dropdowns {
    pub countries: Vec<CodeEntry>,
    pub states: Vec<CodeEntry>,
    pub provinces: Vec<CodeEntry>,
}

/// Code table lookups
#[derive(Clone)]
pub struct CodeService {
    lookup: Arc<dyn CodeLookupPort>,
}

impl CodeService {
    pub fn new(lookup: Arc<dyn CodeLookupPort>) -> Self {
        Self { lookup }
    }

    /// Entries of a single code table
    #[instrument(skip(self))]
    pub async fn codes(&self, code_name: &str) -> Result<Vec<CodeEntry>, ApplicationError> {
        Ok(self.lookup.codes_by_name(code_name).await?)
    }

    /// Countries, states and provinces for the address screens
    pub async fn dropdowns(&self) -> Result<Dropdowns, ApplicationError> {
        let (countries, states, provinces) = tokio::try_join!(
            self.codes(COUNTRY_CODE_NAME),
            self.codes(STATE_CODE_NAME),
            self.codes(PROVINCE_CODE_NAME),
        )?;
        Ok(Dropdowns {
            countries,
            states,
            provinces,
        })
    }

    /// Health of the backing lookup
    pub async fn health_check(&self) -> core_kernel::HealthCheckResult {
        self.lookup.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::details::DetailValue;
    use crate::ports::mock::{MockCodeLookup, MockDetailStore, MockIntakeStore, SequentialIds};
    use core_kernel::UserRole;
    use crate::underwriting::UnderwritingClass;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn detail() -> CoverageDetail {
        CoverageDetail {
            underwriting_class: Some(UnderwritingClass::StandardPlus),
            ..CoverageDetail::new(dec!(100000))
        }
    }

    #[tokio::test]
    async fn test_save_inserts_then_updates() {
        let service = DetailService::new(Arc::new(MockDetailStore::new()));
        let coverage = CoverageId::new("COV-1");

        let first = service.save_coverage_details(&coverage, &detail()).await.unwrap();
        assert_eq!(first, SaveOutcome { inserted: 2, updated: 0, removed: 0 });

        let mut changed = detail();
        changed.table_rating = Some(dec!(1.25));
        let second = service.save_coverage_details(&coverage, &changed).await.unwrap();
        assert_eq!(second, SaveOutcome { inserted: 1, updated: 2, removed: 0 });

        assert_eq!(service.load_coverage_details(&coverage).await.unwrap(), changed);
    }

    #[tokio::test]
    async fn test_cleared_fields_are_deleted() {
        let coverage = CoverageId::new("COV-1");
        let stored = CoverageDetail {
            table_rating: Some(dec!(1.5)),
            ..CoverageDetail::new(dec!(100000))
        };
        let store = MockDetailStore::with_coverage_rows(coverage.clone(), stored.to_rows()).await;
        let service = DetailService::new(Arc::new(store));

        let cleared = CoverageDetail::new(dec!(200000));
        let outcome = service.save_coverage_details(&coverage, &cleared).await.unwrap();
        assert_eq!(outcome, SaveOutcome { inserted: 0, updated: 1, removed: 1 });

        let loaded = service.load_coverage_details(&coverage).await.unwrap();
        assert_eq!(loaded.table_rating, None);
        assert_eq!(loaded, cleared);
    }

    #[tokio::test]
    async fn test_store_failure_aborts_save() {
        let store = Arc::new(MockDetailStore::new());
        store.set_unavailable(true);
        let service = DetailService::new(store);

        let err = service
            .save_coverage_details(&CoverageId::new("COV-1"), &detail())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Port(ref e) if e.is_transient()));
    }

    #[tokio::test]
    async fn test_load_missing_coverage() {
        let service = DetailService::new(Arc::new(MockDetailStore::new()));
        let err = service.load_coverage_details(&CoverageId::new("nope")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_medical_details_replace() {
        let service = DetailService::new(Arc::new(MockDetailStore::new()));
        let role = RoleId::new("ROLE-1");

        let answers = json!({"Smoker": "Y", "Alcohol": "N", "Notes": null});
        assert_eq!(service.save_medical_details(&role, answers.as_object().unwrap()).await.unwrap(), 2);

        let answers = json!({"Smoker": "N"});
        service.save_medical_details(&role, answers.as_object().unwrap()).await.unwrap();

        let rows = service.load_medical_details(&role).await.unwrap();
        assert_eq!(rows, vec![DetailRow::new("Smoker", DetailValue::Text("02".into()))]);
    }

    #[tokio::test]
    async fn test_blank_role_id_rejected() {
        let service = DetailService::new(Arc::new(MockDetailStore::new()));
        let err = service.save_medical_details(&RoleId::new(" "), &Map::new()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Validation(_)));
    }

    #[tokio::test]
    async fn test_beneficiary_allocations_merge() {
        let service = DetailService::new(Arc::new(MockDetailStore::new()));
        let role = RoleId::new("BEN-1");
        service
            .save_medical_details(&role, json!({"Smoker": "N"}).as_object().unwrap())
            .await
            .unwrap();

        let request: BeneficiaryAllocationRequest = serde_json::from_value(json!({
            "applicationFormNumber": "A-100",
            "beneficiaryAllocations": [
                { "roleGUID": "BEN-1", "type": "primary", "allocation": "60" },
                { "roleGUID": "BEN-2", "type": "contingent", "allocation": "40" }
            ]
        }))
        .unwrap();
        assert_eq!(service.save_beneficiary_allocations(&request).await.unwrap(), 2);

        let names: Vec<_> = service
            .load_medical_details(&role)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.field_name)
            .collect();
        assert_eq!(names, ["Smoker", "Allocation", "Type"]);
    }

    #[tokio::test]
    async fn test_allocation_without_role_rejected() {
        let service = DetailService::new(Arc::new(MockDetailStore::new()));
        let request: BeneficiaryAllocationRequest = serde_json::from_value(json!({
            "beneficiaryAllocations": [{ "roleGUID": "", "allocation": "100" }]
        }))
        .unwrap();
        let err = service.save_beneficiary_allocations(&request).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Validation(_)));
    }

    #[tokio::test]
    async fn test_dropdowns() {
        let lookup = MockCodeLookup::new()
            .with_codes(COUNTRY_CODE_NAME, vec![CodeEntry::new("CA", "Canada"), CodeEntry::new("US", "United States")])
            .with_codes(PROVINCE_CODE_NAME, vec![CodeEntry::new("ON", "Ontario")]);
        let dropdowns = CodeService::new(Arc::new(lookup)).dropdowns().await.unwrap();
        assert_eq!(dropdowns.countries.len(), 2);
        assert!(dropdowns.states.is_empty());
        assert_eq!(dropdowns.provinces[0].description, "Ontario");
    }

    fn intake_store() -> MockIntakeStore {
        MockIntakeStore::new()
            .with_application_form("A-100", "FORM-1")
            .with_coverage_definition("PLAN-1", CoverageDefinition::new("DEF-BASE", "Base coverage"))
            .with_coverage_definition("PLAN-1", CoverageDefinition::new("DEF-ADB", "Accidental death"))
            .with_role_client("OWNER-ROLE", "CLIENT-1")
            .with_role_client("INSURED-ROLE", "CLIENT-2")
    }

    fn base_request(body: serde_json::Value) -> BaseCoverageRequest {
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn test_base_coverage_created_with_generated_ids() {
        let store = Arc::new(intake_store());
        let service = IntakeService::new(store.clone(), Arc::new(SequentialIds::new("id")));

        let request = base_request(json!({
            "planGUID": "PLAN-1",
            "coverageType": "joint",
            "insured1": "OWNER-ROLE",
            "insured1IsSameAsOwner": true,
            "insured2": "INSURED-ROLE",
            "faceAmount": "250000",
            "tableRating": "150%",
            "underwritingClass": "Preferred"
        }));
        let saved = service.save_base_coverage("A-100", &request).await.unwrap();

        assert_eq!(saved.coverage_id, CoverageId::new("id-1"));
        assert_eq!(saved.coverage_definition_id.as_str(), "DEF-BASE");
        assert_eq!(saved.application_form_id.as_str(), "FORM-1");
        assert_eq!(
            saved.insured_roles,
            vec![
                InsuredRoleCreated { insured_id: RoleId::new("OWNER-ROLE"), role_id: RoleId::new("id-2") },
                InsuredRoleCreated { insured_id: RoleId::new("INSURED-ROLE"), role_id: RoleId::new("id-3") },
            ]
        );

        let tables = store.snapshot().await;
        let coverage = &tables.coverages[0];
        assert_eq!(coverage.coverage_id, saved.coverage_id);
        assert!(!coverage.insured_roles[0].linked_to_application);
        assert!(coverage.insured_roles[1].linked_to_application);
        assert_eq!(coverage.insured_roles[1].client_id.as_str(), "CLIENT-2");
        assert_eq!(
            CoverageDetail::from_rows(&coverage.details).unwrap(),
            CoverageDetail {
                table_rating: Some(dec!(1.5)),
                underwriting_class: Some(UnderwritingClass::Preferred),
                ..CoverageDetail::new(dec!(250000))
            }
        );
    }

    #[tokio::test]
    async fn test_insured_without_client_is_skipped() {
        let store = Arc::new(intake_store());
        let service = IntakeService::new(store.clone(), Arc::new(SequentialIds::new("id")));

        let request = base_request(json!({
            "planGUID": "PLAN-1",
            "insured1": "UNKNOWN-ROLE",
            "faceAmount": 100000
        }));
        let saved = service.save_base_coverage("A-100", &request).await.unwrap();

        assert!(saved.insured_roles.is_empty());
        assert!(store.snapshot().await.coverages[0].insured_roles.is_empty());
    }

    #[tokio::test]
    async fn test_base_coverage_failures_write_nothing() {
        let store = Arc::new(intake_store());
        let service = IntakeService::new(store.clone(), Arc::new(SequentialIds::new("id")));

        let missing_plan = base_request(json!({ "faceAmount": "1000" }));
        assert!(matches!(
            service.save_base_coverage("A-100", &missing_plan).await.unwrap_err(),
            ApplicationError::Validation(_)
        ));

        let bad_face = base_request(json!({ "planGUID": "PLAN-1", "faceAmount": "1_000" }));
        assert!(matches!(
            service.save_base_coverage("A-100", &bad_face).await.unwrap_err(),
            ApplicationError::InvalidDetail { .. }
        ));

        let request = base_request(json!({ "planGUID": "PLAN-1", "faceAmount": "1000" }));
        assert!(service.save_base_coverage("A-999", &request).await.unwrap_err().is_not_found());

        let other_plan = base_request(json!({ "planGUID": "PLAN-9", "faceAmount": "1000" }));
        assert!(service.save_base_coverage("A-100", &other_plan).await.unwrap_err().is_not_found());

        assert!(store.snapshot().await.coverages.is_empty());
    }

    #[tokio::test]
    async fn test_additional_definitions_exclude_base() {
        let service = IntakeService::new(Arc::new(intake_store()), Arc::new(SequentialIds::new("id")));
        let definitions = service
            .additional_coverage_definitions(&PlanId::new("PLAN-1"))
            .await
            .unwrap();
        assert_eq!(definitions, vec![CoverageDefinition::new("DEF-ADB", "Accidental death")]);
    }

    fn owner_request() -> OwnerSaveRequest {
        serde_json::from_value(json!({
            "applicationFormNumber": "A-200",
            "owners": [{
                "planGUID": "PLAN-1",
                "typeCode": "01",
                "firstName": "Jane",
                "lastName": "Doe",
                "addresses": [{ "typeCode": "01", "city": "Toronto" }, { "typeCode": "02", "city": "Ottawa" }]
            }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_agent_owner_save_records_agent_of_record() {
        let store = Arc::new(intake_store());
        let service = IntakeService::new(store.clone(), Arc::new(SequentialIds::new("id")));
        let agent = Principal::new("Sam Agent", UserRole::Agent);

        let response = service.save_owners(&agent, owner_request()).await.unwrap();

        let owner = &response.owners[0];
        assert_eq!((owner.client_id.as_str(), owner.role_id.as_str()), ("id-1", "id-2"));
        assert_eq!(owner.role_code, "01");
        assert_eq!(owner.address_ids, vec![AddressId::new("id-3"), AddressId::new("id-4")]);
        assert_eq!(response.agent_role_id, Some(RoleId::new("id-5")));
        assert_eq!(response.application_form_id.as_str(), "id-7");

        let tables = store.snapshot().await;
        assert_eq!(tables.application_forms["A-200"], (ApplicationFormId::new("id-7"), Some(PlanId::new("PLAN-1"))));
        assert_eq!(tables.agent_roles[0].2, ClientId::new("id-6"));
        assert_eq!(tables.agent_clients[&("Sam".to_string(), "Agent".to_string())], ClientId::new("id-6"));
        assert_eq!(tables.role_clients[&RoleId::new("id-2")], ClientId::new("id-1"));
    }

    #[tokio::test]
    async fn test_admin_owner_save_has_no_agent_and_reuses_form() {
        let store = Arc::new(intake_store().with_application_form("A-200", "FORM-EXISTING"));
        let service = IntakeService::new(store.clone(), Arc::new(SequentialIds::new("id")));
        let admin = Principal::new("root", UserRole::Admin);

        let response = service.save_owners(&admin, owner_request()).await.unwrap();

        assert_eq!(response.agent_role_id, None);
        assert_eq!(response.application_form_id.as_str(), "FORM-EXISTING");
        assert!(store.snapshot().await.agent_roles.is_empty());
    }

    #[tokio::test]
    async fn test_owner_then_base_coverage_for_owner_insured() {
        let store = Arc::new(intake_store());
        let service = IntakeService::new(store.clone(), Arc::new(SequentialIds::new("id")));
        let agent = Principal::new("agent7", UserRole::Agent);

        let owners = service.save_owners(&agent, owner_request()).await.unwrap();
        let owner_role = owners.owners[0].role_id.clone();

        let request = base_request(json!({
            "planGUID": "PLAN-1",
            "insured1": owner_role.as_str(),
            "insured1IsSameAsOwner": true,
            "faceAmount": "500000"
        }));
        let saved = service.save_base_coverage("A-200", &request).await.unwrap();

        assert_eq!(saved.application_form_id, owners.application_form_id);
        assert_eq!(saved.insured_roles[0].insured_id, owner_role);
        let tables = store.snapshot().await;
        assert_eq!(tables.coverages[0].insured_roles[0].client_id, owners.owners[0].client_id);
    }

    #[tokio::test]
    async fn test_owner_save_requires_owners() {
        let service = IntakeService::new(Arc::new(intake_store()), Arc::new(SequentialIds::new("id")));
        let request = OwnerSaveRequest {
            application_form_number: "A-1".into(),
            owners: vec![],
        };
        let err = service
            .save_owners(&Principal::new("agent7", UserRole::Agent), request)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Validation(_)));
    }
}
