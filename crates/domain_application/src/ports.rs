//! Application Intake Ports
//!
//! Port traits for the storage the intake services depend on. The PostgreSQL
//! adapters live in `infra_db`; the `mock` module provides in-memory adapters
//! for tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_application::ports::DetailStorePort;
//!
//! pub struct DetailService {
//!     store: Arc<dyn DetailStorePort>,
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{
    ApplicationFormId, ClientId, CoverageDefinitionId, CoverageId, DomainPort, HealthCheckable, PortError, PlanId,
    RoleId,
};

use crate::details::DetailRow;
use crate::intake::{CoverageDefinition, NewBaseCoverage, OwnerBatch, BASE_COVERAGE_NAME};

/// One entry of a code table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub code: String,
    pub description: String,
}

impl CodeEntry {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// Rows written by a coverage detail save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub removed: usize,
}

/// Port for coverage and role detail rows
#[async_trait]
pub trait DetailStorePort: DomainPort + HealthCheckable {
    /// All detail rows stored for a coverage
    async fn list_coverage_details(&self, coverage_id: &CoverageId) -> Result<Vec<DetailRow>, PortError>;

    /// Makes `rows` the complete field set of a coverage in one transaction
    ///
    /// Each field is looked up inside the transaction: a `NotFound` lookup
    /// inserts it, a hit updates it. Stored fields absent from `rows` are
    /// deleted. Concurrent saves of the same coverage are serialized.
    async fn save_coverage_details(
        &self,
        coverage_id: &CoverageId,
        rows: Vec<DetailRow>,
    ) -> Result<SaveOutcome, PortError>;

    /// Replaces every detail row of a role in a single transaction
    async fn replace_role_details(&self, role_id: &RoleId, rows: Vec<DetailRow>) -> Result<(), PortError>;

    /// Inserts or updates the given fields of several roles in one transaction
    ///
    /// Fields not named keep their stored value.
    async fn merge_role_details(&self, batches: Vec<(RoleId, Vec<DetailRow>)>) -> Result<(), PortError>;

    /// All detail rows stored for a role
    async fn list_role_details(&self, role_id: &RoleId) -> Result<Vec<DetailRow>, PortError>;
}

/// Port for code tables (countries, states, provinces)
#[async_trait]
pub trait CodeLookupPort: DomainPort + HealthCheckable {
    /// Entries of the named code table, in stored order
    async fn codes_by_name(&self, code_name: &str) -> Result<Vec<CodeEntry>, PortError>;
}

/// Port for application forms, coverages, clients and roles
#[async_trait]
pub trait IntakeStorePort: DomainPort + HealthCheckable {
    /// Resolves an application form number
    ///
    /// # Errors
    ///
    /// `PortError::NotFound` when no form carries the number
    async fn find_application_form(&self, application_form_number: &str) -> Result<ApplicationFormId, PortError>;

    /// The plan's definition named [`BASE_COVERAGE_NAME`]
    ///
    /// # Errors
    ///
    /// `PortError::NotFound` when the plan has none
    async fn find_base_coverage_definition(&self, plan_id: &PlanId) -> Result<CoverageDefinitionId, PortError>;

    /// The plan's other coverage definitions, ordered by name
    async fn additional_coverage_definitions(&self, plan_id: &PlanId) -> Result<Vec<CoverageDefinition>, PortError>;

    /// Client behind an existing role
    ///
    /// # Errors
    ///
    /// `PortError::NotFound` when the role does not exist or has no client
    async fn find_role_client(&self, role_id: &RoleId) -> Result<ClientId, PortError>;

    /// Writes the coverage, its insured roles and its details in one transaction
    async fn create_base_coverage(&self, coverage: NewBaseCoverage) -> Result<(), PortError>;

    /// Writes the form, owner clients, roles, addresses and agent role in one
    /// transaction, returning the form's identifier
    async fn save_owners(&self, batch: OwnerBatch) -> Result<ApplicationFormId, PortError>;
}

/// In-memory adapters for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use indexmap::IndexMap;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    use crate::details::DetailValue;

    /// In-memory detail store
    #[derive(Debug, Default)]
    pub struct MockDetailStore {
        coverages: Arc<RwLock<HashMap<CoverageId, IndexMap<String, DetailValue>>>>,
        roles: Arc<RwLock<HashMap<RoleId, Vec<DetailRow>>>>,
        unavailable: AtomicBool,
    }

    impl MockDetailStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates coverage rows
        pub async fn with_coverage_rows(coverage_id: CoverageId, rows: Vec<DetailRow>) -> Self {
            let store = Self::new();
            let fields = rows.into_iter().map(|r| (r.field_name, r.value)).collect();
            store.coverages.write().await.insert(coverage_id, fields);
            store
        }

        /// Makes every operation fail with a connection error
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        fn check_available(&self) -> Result<(), PortError> {
            if self.unavailable.load(Ordering::SeqCst) {
                Err(PortError::connection("mock detail store unavailable"))
            } else {
                Ok(())
            }
        }
    }

    impl DomainPort for MockDetailStore {}

    #[async_trait]
    impl HealthCheckable for MockDetailStore {
        async fn health_check(&self) -> HealthCheckResult {
            match self.check_available() {
                Ok(()) => HealthCheckResult::healthy("mock-detail-store", 0),
                Err(e) => HealthCheckResult::unhealthy("mock-detail-store", e.to_string()),
            }
        }
    }

    #[async_trait]
    impl DetailStorePort for MockDetailStore {
        async fn list_coverage_details(&self, coverage_id: &CoverageId) -> Result<Vec<DetailRow>, PortError> {
            self.check_available()?;
            Ok(self
                .coverages
                .read()
                .await
                .get(coverage_id)
                .map(|fields| {
                    fields
                        .iter()
                        .map(|(name, value)| DetailRow::new(name.clone(), value.clone()))
                        .collect()
                })
                .unwrap_or_default())
        }

        async fn save_coverage_details(
            &self,
            coverage_id: &CoverageId,
            rows: Vec<DetailRow>,
        ) -> Result<SaveOutcome, PortError> {
            self.check_available()?;
            let mut coverages = self.coverages.write().await;
            let fields = coverages.entry(coverage_id.clone()).or_default();

            let stored = fields.len();
            fields.retain(|name, _| rows.iter().any(|row| &row.field_name == name));
            let mut outcome = SaveOutcome {
                removed: stored - fields.len(),
                ..SaveOutcome::default()
            };
            for row in rows {
                match fields.insert(row.field_name, row.value) {
                    Some(_) => outcome.updated += 1,
                    None => outcome.inserted += 1,
                }
            }
            Ok(outcome)
        }

        async fn replace_role_details(&self, role_id: &RoleId, rows: Vec<DetailRow>) -> Result<(), PortError> {
            self.check_available()?;
            self.roles.write().await.insert(role_id.clone(), rows);
            Ok(())
        }

        async fn merge_role_details(&self, batches: Vec<(RoleId, Vec<DetailRow>)>) -> Result<(), PortError> {
            self.check_available()?;
            let mut roles = self.roles.write().await;
            for (role_id, rows) in batches {
                let stored = roles.entry(role_id).or_default();
                for row in rows {
                    match stored.iter_mut().find(|r| r.field_name == row.field_name) {
                        Some(existing) => existing.value = row.value,
                        None => stored.push(row),
                    }
                }
            }
            Ok(())
        }

        async fn list_role_details(&self, role_id: &RoleId) -> Result<Vec<DetailRow>, PortError> {
            self.check_available()?;
            Ok(self.roles.read().await.get(role_id).cloned().unwrap_or_default())
        }
    }

    /// In-memory code tables
    #[derive(Debug, Default)]
    pub struct MockCodeLookup {
        tables: HashMap<String, Vec<CodeEntry>>,
    }

    impl MockCodeLookup {
        pub fn new() -> Self {
            Self::default()
        }

        /// Adds a code table
        pub fn with_codes(mut self, code_name: impl Into<String>, entries: Vec<CodeEntry>) -> Self {
            self.tables.insert(code_name.into(), entries);
            self
        }
    }

    impl DomainPort for MockCodeLookup {}

    #[async_trait]
    impl HealthCheckable for MockCodeLookup {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-code-lookup", 0)
        }
    }

    #[async_trait]
    impl CodeLookupPort for MockCodeLookup {
        async fn codes_by_name(&self, code_name: &str) -> Result<Vec<CodeEntry>, PortError> {
            Ok(self.tables.get(code_name).cloned().unwrap_or_default())
        }
    }

    /// Rows held by [`MockIntakeStore`]
    #[derive(Debug, Default, Clone)]
    pub struct IntakeTables {
        /// Form number to form id and plan
        pub application_forms: HashMap<String, (ApplicationFormId, Option<PlanId>)>,
        pub coverage_definitions: Vec<(PlanId, CoverageDefinition)>,
        pub role_clients: HashMap<RoleId, ClientId>,
        pub coverages: Vec<NewBaseCoverage>,
        pub owners: Vec<(ApplicationFormId, crate::intake::NewOwner)>,
        /// Agent roles and the client each was recorded against
        pub agent_roles: Vec<(ApplicationFormId, RoleId, ClientId)>,
        /// Agent clients by first and last name
        pub agent_clients: HashMap<(String, String), ClientId>,
    }

    /// In-memory intake store
    #[derive(Debug, Default)]
    pub struct MockIntakeStore {
        tables: RwLock<IntakeTables>,
    }

    impl MockIntakeStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_application_form(mut self, number: impl Into<String>, id: impl Into<ApplicationFormId>) -> Self {
            self.tables
                .get_mut()
                .application_forms
                .insert(number.into(), (id.into(), None));
            self
        }

        pub fn with_coverage_definition(mut self, plan_id: impl Into<PlanId>, definition: CoverageDefinition) -> Self {
            self.tables
                .get_mut()
                .coverage_definitions
                .push((plan_id.into(), definition));
            self
        }

        pub fn with_role_client(mut self, role_id: impl Into<RoleId>, client_id: impl Into<ClientId>) -> Self {
            self.tables
                .get_mut()
                .role_clients
                .insert(role_id.into(), client_id.into());
            self
        }

        /// Copy of everything written so far
        pub async fn snapshot(&self) -> IntakeTables {
            self.tables.read().await.clone()
        }
    }

    impl DomainPort for MockIntakeStore {}

    #[async_trait]
    impl HealthCheckable for MockIntakeStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-intake-store", 0)
        }
    }

    #[async_trait]
    impl IntakeStorePort for MockIntakeStore {
        async fn find_application_form(&self, application_form_number: &str) -> Result<ApplicationFormId, PortError> {
            self.tables
                .read()
                .await
                .application_forms
                .get(application_form_number)
                .map(|(id, _)| id.clone())
                .ok_or_else(|| PortError::not_found("ApplicationForm", application_form_number))
        }

        async fn find_base_coverage_definition(&self, plan_id: &PlanId) -> Result<CoverageDefinitionId, PortError> {
            self.tables
                .read()
                .await
                .coverage_definitions
                .iter()
                .find(|(plan, definition)| plan == plan_id && definition.is_base())
                .map(|(_, definition)| definition.id.clone())
                .ok_or_else(|| PortError::not_found("CoverageDefinition", format!("{}/{}", plan_id, BASE_COVERAGE_NAME)))
        }

        async fn additional_coverage_definitions(&self, plan_id: &PlanId) -> Result<Vec<CoverageDefinition>, PortError> {
            let mut definitions: Vec<CoverageDefinition> = self
                .tables
                .read()
                .await
                .coverage_definitions
                .iter()
                .filter(|(plan, definition)| plan == plan_id && !definition.is_base())
                .map(|(_, definition)| definition.clone())
                .collect();
            definitions.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(definitions)
        }

        async fn find_role_client(&self, role_id: &RoleId) -> Result<ClientId, PortError> {
            self.tables
                .read()
                .await
                .role_clients
                .get(role_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Role", role_id))
        }

        async fn create_base_coverage(&self, coverage: NewBaseCoverage) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            for role in &coverage.insured_roles {
                tables.role_clients.insert(role.role_id.clone(), role.client_id.clone());
            }
            tables.coverages.push(coverage);
            Ok(())
        }

        async fn save_owners(&self, batch: OwnerBatch) -> Result<ApplicationFormId, PortError> {
            let mut tables = self.tables.write().await;
            let form = tables
                .application_forms
                .entry(batch.application_form_number)
                .or_insert_with(|| (batch.candidate_form_id, None));
            if batch.plan_id.is_some() {
                form.1 = batch.plan_id;
            }
            let form_id = form.0.clone();

            for owner in batch.owners {
                tables.role_clients.insert(owner.role_id.clone(), owner.client_id.clone());
                tables.owners.push((form_id.clone(), owner));
            }
            if let Some(agent) = batch.agent {
                let client_id = tables
                    .agent_clients
                    .entry((agent.first_name, agent.last_name))
                    .or_insert(agent.candidate_client_id)
                    .clone();
                tables.agent_roles.push((form_id.clone(), agent.role_id, client_id));
            }
            Ok(form_id)
        }
    }

    /// Deterministic identifiers: `<prefix>-1`, `<prefix>-2`, ...
    #[derive(Debug, Default)]
    pub struct SequentialIds {
        prefix: String,
        next: std::sync::atomic::AtomicUsize,
    }

    impl SequentialIds {
        pub fn new(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                next: Default::default(),
            }
        }
    }

    impl core_kernel::IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            format!("{}-{}", self.prefix, self.next.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }
}
