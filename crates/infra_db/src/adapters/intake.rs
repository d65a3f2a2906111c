//! PostgreSQL Intake Store
//!
//! Implements `IntakeStorePort` over `frapplicationform`, `frcoveragedefinition`,
//! `frcoverage`, `frclient`, `frrole`, `fraddress` and `fraddressdetails`.
//! Base coverage details land in `frcoveragedetails` inside the coverage's
//! own transaction.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use core_kernel::{
    ApplicationFormId, ClientId, CoverageDefinitionId, CoverageId, DomainPort, HealthCheckResult, HealthCheckable,
    PlanId, PortError, RoleId,
};
use domain_application::intake::{
    codes, AgentOfRecord, NewBaseCoverage, NewOwner, OwnerBatch, BASE_COVERAGE_NAME,
};
use domain_application::{CoverageDefinition, IntakeStorePort};

use crate::adapters::details::{DetailRecord, PostgresDetailStore};
use crate::adapters::lock_key;
use crate::error::DatabaseError;
use crate::pool::ping;

#[derive(Debug, sqlx::FromRow)]
struct CoverageDefinitionRecord {
    id: String,
    name: String,
}

impl From<CoverageDefinitionRecord> for CoverageDefinition {
    fn from(record: CoverageDefinitionRecord) -> Self {
        CoverageDefinition::new(record.id, record.name)
    }
}

/// PostgreSQL-backed application, coverage and party storage
#[derive(Debug, Clone)]
pub struct PostgresIntakeStore {
    pool: PgPool,
}

impl PostgresIntakeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_owner(
        tx: &mut Transaction<'_, Postgres>,
        form_id: &ApplicationFormId,
        owner: &NewOwner,
    ) -> Result<(), DatabaseError> {
        let client = &owner.client;
        sqlx::query(
            r#"
            INSERT INTO frclient (
                ClientGUID, TypeCode, FirstName, LastName, CompanyName,
                DateOfBirth, Gender, Tobacco, CountryCode, StateCode,
                SSN, BusinessRegistrationNumber
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(owner.client_id.as_str())
        .bind(&client.type_code)
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.company_name)
        .bind(client.date_of_birth)
        .bind(&client.gender)
        .bind(&client.tobacco)
        .bind(&client.country_code)
        .bind(&client.state_code)
        .bind(&client.ssn)
        .bind(&client.business_registration_number)
        .execute(&mut **tx)
        .await?;

        Self::insert_form_role(tx, &owner.role_id, &owner.role_code, &owner.client_id, form_id).await?;

        for new_address in &owner.addresses {
            let address = &new_address.address;
            sqlx::query(
                "INSERT INTO fraddress (AddressGUID, TypeCode, StatusCode, ClientGUID) VALUES ($1, $2, $3, $4)",
            )
            .bind(new_address.address_id.as_str())
            .bind(&address.type_code)
            .bind(codes::ACTIVE_STATUS)
            .bind(owner.client_id.as_str())
            .execute(&mut **tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO fraddressdetails (
                    AddressGUID, AddressLine1, AddressLine2, City, StateCode, CountryCode, ZipCode
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(new_address.address_id.as_str())
            .bind(&address.address_line1)
            .bind(&address.address_line2)
            .bind(&address.city)
            .bind(&address.state_code)
            .bind(&address.country_code)
            .bind(&address.zip_code)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Records the agent role, reusing an agent client of the same name
    async fn insert_agent(
        tx: &mut Transaction<'_, Postgres>,
        form_id: &ApplicationFormId,
        agent: &AgentOfRecord,
    ) -> Result<(), DatabaseError> {
        let existing: Option<(String,)> = sqlx::query_as(
            "SELECT ClientGUID FROM frclient WHERE TypeCode = $1 AND FirstName = $2 AND LastName = $3 LIMIT 1",
        )
        .bind(codes::AGENT_CLIENT_TYPE)
        .bind(&agent.first_name)
        .bind(&agent.last_name)
        .fetch_optional(&mut **tx)
        .await?;

        let client_id = match existing {
            Some((id,)) => ClientId::new(id),
            None => {
                sqlx::query("INSERT INTO frclient (ClientGUID, TypeCode, FirstName, LastName) VALUES ($1, $2, $3, $4)")
                    .bind(agent.candidate_client_id.as_str())
                    .bind(codes::AGENT_CLIENT_TYPE)
                    .bind(&agent.first_name)
                    .bind(&agent.last_name)
                    .execute(&mut **tx)
                    .await?;
                debug!(client_id = %agent.candidate_client_id, "Agent client created");
                agent.candidate_client_id.clone()
            }
        };

        Self::insert_form_role(tx, &agent.role_id, codes::AGENT_ROLE, &client_id, form_id).await
    }

    async fn insert_form_role(
        tx: &mut Transaction<'_, Postgres>,
        role_id: &RoleId,
        role_code: &str,
        client_id: &ClientId,
        form_id: &ApplicationFormId,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO frrole (RoleGUID, RoleCode, ClientGUID, ApplicationFormGUID, StatusCode)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(role_id.as_str())
        .bind(role_code)
        .bind(client_id.as_str())
        .bind(form_id.as_str())
        .bind(codes::ACTIVE_STATUS)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

impl DomainPort for PostgresIntakeStore {}

#[async_trait]
impl HealthCheckable for PostgresIntakeStore {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-intake-store").await
    }
}

#[async_trait]
impl IntakeStorePort for PostgresIntakeStore {
    #[instrument(skip(self))]
    async fn find_application_form(&self, application_form_number: &str) -> Result<ApplicationFormId, PortError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT ApplicationFormGUID FROM frapplicationform WHERE ApplicationFormNumber = $1")
                .bind(application_form_number)
                .fetch_optional(&self.pool)
                .await
                .map_err(DatabaseError::from)?;

        row.map(|(id,)| ApplicationFormId::new(id))
            .ok_or_else(|| DatabaseError::not_found("ApplicationForm", application_form_number).into())
    }

    #[instrument(skip(self), fields(plan_id = %plan_id))]
    async fn find_base_coverage_definition(&self, plan_id: &PlanId) -> Result<CoverageDefinitionId, PortError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT CoverageDefinitionGUID FROM frcoveragedefinition WHERE CoverageName = $1 AND PlanGUID = $2 LIMIT 1",
        )
        .bind(BASE_COVERAGE_NAME)
        .bind(plan_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.map(|(id,)| CoverageDefinitionId::new(id)).ok_or_else(|| {
            DatabaseError::not_found("CoverageDefinition", format!("{}/{}", plan_id, BASE_COVERAGE_NAME)).into()
        })
    }

    #[instrument(skip(self), fields(plan_id = %plan_id))]
    async fn additional_coverage_definitions(&self, plan_id: &PlanId) -> Result<Vec<CoverageDefinition>, PortError> {
        let records = sqlx::query_as::<_, CoverageDefinitionRecord>(
            r#"
            SELECT CoverageDefinitionGUID AS id, CoverageName AS name
            FROM frcoveragedefinition
            WHERE PlanGUID = $1 AND CoverageName <> $2
            ORDER BY CoverageName
            "#,
        )
        .bind(plan_id.as_str())
        .bind(BASE_COVERAGE_NAME)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        debug!(count = records.len(), "Additional coverage definitions fetched");
        Ok(records.into_iter().map(CoverageDefinition::from).collect())
    }

    #[instrument(skip(self), fields(role_id = %role_id))]
    async fn find_role_client(&self, role_id: &RoleId) -> Result<ClientId, PortError> {
        let row: Option<(Option<String>,)> = sqlx::query_as("SELECT ClientGUID FROM frrole WHERE RoleGUID = $1")
            .bind(role_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        row.and_then(|(client,)| client)
            .map(ClientId::new)
            .ok_or_else(|| DatabaseError::not_found("Role", role_id).into())
    }

    #[instrument(skip_all, fields(coverage_id = %coverage.coverage_id, insureds = coverage.insured_roles.len()))]
    async fn create_base_coverage(&self, coverage: NewBaseCoverage) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        sqlx::query(
            r#"
            INSERT INTO frcoverage (CoverageGUID, ApplicationFormGUID, CoverageDefinitionGUID, StatusCode)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(coverage.coverage_id.as_str())
        .bind(coverage.application_form_id.as_str())
        .bind(coverage.coverage_definition_id.as_str())
        .bind(codes::ACTIVE_STATUS)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        for role in &coverage.insured_roles {
            let form_id = role
                .linked_to_application
                .then(|| coverage.application_form_id.as_str());
            sqlx::query(
                r#"
                INSERT INTO frrole (
                    RoleGUID, RoleCode, ClientGUID, ApplicationFormGUID, CoverageGUID, IssueDate, StatusCode
                ) VALUES ($1, $2, $3, $4, $5, CURRENT_DATE, $6)
                "#,
            )
            .bind(role.role_id.as_str())
            .bind(codes::INSURED_ROLE)
            .bind(role.client_id.as_str())
            .bind(form_id)
            .bind(coverage.coverage_id.as_str())
            .bind(codes::ACTIVE_STATUS)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;
        }

        for row in &coverage.details {
            PostgresDetailStore::insert_coverage_detail(&mut tx, &coverage.coverage_id, &DetailRecord::from_row(row))
                .await?;
        }

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    #[instrument(skip_all, fields(application_form_number = %batch.application_form_number, owners = batch.owners.len()))]
    async fn save_owners(&self, batch: OwnerBatch) -> Result<ApplicationFormId, PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        lock_key(&mut tx, "frapplicationform", &batch.application_form_number).await?;

        let existing: Option<(String,)> =
            sqlx::query_as("SELECT ApplicationFormGUID FROM frapplicationform WHERE ApplicationFormNumber = $1")
                .bind(&batch.application_form_number)
                .fetch_optional(&mut *tx)
                .await
                .map_err(DatabaseError::from)?;

        let form_id = match existing {
            Some((id,)) => {
                sqlx::query(
                    r#"
                    UPDATE frapplicationform
                    SET LastModifiedDate = CURRENT_DATE, PlanGUID = COALESCE($2, PlanGUID)
                    WHERE ApplicationFormGUID = $1
                    "#,
                )
                .bind(&id)
                .bind(batch.plan_id.as_ref().map(PlanId::as_str))
                .execute(&mut *tx)
                .await
                .map_err(DatabaseError::from)?;
                ApplicationFormId::new(id)
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO frapplicationform (ApplicationFormGUID, ApplicationFormNumber, LastModifiedDate, PlanGUID)
                    VALUES ($1, $2, CURRENT_DATE, $3)
                    "#,
                )
                .bind(batch.candidate_form_id.as_str())
                .bind(&batch.application_form_number)
                .bind(batch.plan_id.as_ref().map(PlanId::as_str))
                .execute(&mut *tx)
                .await
                .map_err(DatabaseError::from)?;
                debug!(application_form_id = %batch.candidate_form_id, "Application form created");
                batch.candidate_form_id.clone()
            }
        };

        for owner in &batch.owners {
            Self::insert_owner(&mut tx, &form_id, owner).await?;
        }
        if let Some(agent) = &batch.agent {
            Self::insert_agent(&mut tx, &form_id, agent).await?;
        }

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(form_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_record_maps_to_domain() {
        let definition = CoverageDefinition::from(CoverageDefinitionRecord {
            id: "DEF-ADB".into(),
            name: "Accidental death".into(),
        });
        assert_eq!(definition, CoverageDefinition::new("DEF-ADB", "Accidental death"));
        assert!(!definition.is_base());
    }
}
