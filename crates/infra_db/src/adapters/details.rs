//! PostgreSQL Detail Store
//!
//! Implements `DetailStorePort` over the `frcoveragedetails` and
//! `frroledetails` tables. Both tables share one layout: an owner key, a
//! field name and four nullable value columns of which exactly one is set.
//!
//! Writes take a transaction-scoped advisory lock on the owner key, so two
//! saves of the same coverage or role never interleave their lookups.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use core_kernel::{CoverageId, DomainPort, HealthCheckResult, HealthCheckable, PortError, RoleId};
use domain_application::{DetailRow, DetailStorePort, DetailValue, SaveOutcome};

use crate::adapters::lock_key;
use crate::error::DatabaseError;
use crate::pool::ping;

/// One row of a detail table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DetailRecord {
    pub field_name: String,
    pub decimal_value: Option<Decimal>,
    pub integer_value: Option<i32>,
    pub text_value: Option<String>,
    pub date_value: Option<NaiveDate>,
}

impl DetailRecord {
    /// Splits a domain value across the typed columns
    pub fn from_row(row: &DetailRow) -> Self {
        let mut record = Self {
            field_name: row.field_name.clone(),
            decimal_value: None,
            integer_value: None,
            text_value: None,
            date_value: None,
        };
        match &row.value {
            DetailValue::Decimal(v) => record.decimal_value = Some(*v),
            DetailValue::Integer(v) => record.integer_value = Some(*v),
            DetailValue::Text(v) => record.text_value = Some(v.clone()),
            DetailValue::Date(v) => record.date_value = Some(*v),
        }
        record
    }

    /// Rebuilds the domain row; exactly one value column must be set
    pub fn into_row(self) -> Result<DetailRow, DatabaseError> {
        let value = match (self.decimal_value, self.integer_value, self.text_value, self.date_value) {
            (Some(v), None, None, None) => DetailValue::Decimal(v),
            (None, Some(v), None, None) => DetailValue::Integer(v),
            (None, None, Some(v), None) => DetailValue::Text(v),
            (None, None, None, Some(v)) => DetailValue::Date(v),
            _ => {
                return Err(DatabaseError::InvalidRow(format!(
                    "detail field '{}' must hold exactly one value",
                    self.field_name
                )))
            }
        };
        Ok(DetailRow::new(self.field_name, value))
    }
}

const SELECT_COVERAGE_DETAILS: &str = r#"
    SELECT FieldName AS field_name, DecimalValue AS decimal_value, IntegerValue AS integer_value,
           TextValue AS text_value, DateValue AS date_value
    FROM frcoveragedetails
    WHERE CoverageGUID = $1
"#;

const SELECT_ROLE_DETAILS: &str = r#"
    SELECT FieldName AS field_name, DecimalValue AS decimal_value, IntegerValue AS integer_value,
           TextValue AS text_value, DateValue AS date_value
    FROM frroledetails
    WHERE RoleGUID = $1
"#;

/// PostgreSQL-backed detail storage
#[derive(Debug, Clone)]
pub struct PostgresDetailStore {
    pool: PgPool,
}

impl PostgresDetailStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Locks one stored field inside the transaction
    ///
    /// # Errors
    ///
    /// `DatabaseError::NotFound` when the coverage has no row for the field
    async fn lock_coverage_detail(
        tx: &mut Transaction<'_, Postgres>,
        coverage_id: &CoverageId,
        field_name: &str,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "SELECT 1 FROM frcoveragedetails WHERE CoverageGUID = $1 AND FieldName = $2 FOR UPDATE",
        )
        .bind(coverage_id.as_str())
        .bind(field_name)
        .fetch_optional(&mut **tx)
        .await?
        .map(|_| ())
        .ok_or_else(|| DatabaseError::not_found("CoverageDetail", format!("{}/{}", coverage_id, field_name)))
    }

    pub(crate) async fn insert_coverage_detail(
        tx: &mut Transaction<'_, Postgres>,
        coverage_id: &CoverageId,
        record: &DetailRecord,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO frcoveragedetails
                (CoverageGUID, FieldName, DecimalValue, IntegerValue, TextValue, DateValue)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(coverage_id.as_str())
        .bind(&record.field_name)
        .bind(record.decimal_value)
        .bind(record.integer_value)
        .bind(&record.text_value)
        .bind(record.date_value)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn update_coverage_detail(
        tx: &mut Transaction<'_, Postgres>,
        coverage_id: &CoverageId,
        record: &DetailRecord,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE frcoveragedetails
            SET DecimalValue = $3, IntegerValue = $4, TextValue = $5, DateValue = $6
            WHERE CoverageGUID = $1 AND FieldName = $2
            "#,
        )
        .bind(coverage_id.as_str())
        .bind(&record.field_name)
        .bind(record.decimal_value)
        .bind(record.integer_value)
        .bind(&record.text_value)
        .bind(record.date_value)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(
                "CoverageDetail",
                format!("{}/{}", coverage_id, record.field_name),
            ));
        }
        Ok(())
    }

    async fn insert_role_detail(
        tx: &mut Transaction<'_, Postgres>,
        role_id: &RoleId,
        record: &DetailRecord,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO frroledetails
                (RoleGUID, FieldName, DecimalValue, IntegerValue, TextValue, DateValue)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(role_id.as_str())
        .bind(&record.field_name)
        .bind(record.decimal_value)
        .bind(record.integer_value)
        .bind(&record.text_value)
        .bind(record.date_value)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn fetch_rows(&self, sql: &str, owner_id: &str) -> Result<Vec<DetailRow>, DatabaseError> {
        let records = sqlx::query_as::<_, DetailRecord>(sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        records.into_iter().map(DetailRecord::into_row).collect()
    }
}

impl DomainPort for PostgresDetailStore {}

#[async_trait]
impl HealthCheckable for PostgresDetailStore {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-detail-store").await
    }
}

#[async_trait]
impl DetailStorePort for PostgresDetailStore {
    #[instrument(skip_all, fields(coverage_id = %coverage_id))]
    async fn list_coverage_details(&self, coverage_id: &CoverageId) -> Result<Vec<DetailRow>, PortError> {
        let rows = self.fetch_rows(SELECT_COVERAGE_DETAILS, coverage_id.as_str()).await?;
        debug!(rows = rows.len(), "Coverage details fetched");
        Ok(rows)
    }

    #[instrument(skip_all, fields(coverage_id = %coverage_id, rows = rows.len()))]
    async fn save_coverage_details(
        &self,
        coverage_id: &CoverageId,
        rows: Vec<DetailRow>,
    ) -> Result<SaveOutcome, PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        lock_key(&mut tx, "frcoveragedetails", coverage_id.as_str()).await?;

        let mut outcome = SaveOutcome::default();
        for row in &rows {
            let record = DetailRecord::from_row(row);
            match Self::lock_coverage_detail(&mut tx, coverage_id, &record.field_name).await {
                Ok(()) => {
                    Self::update_coverage_detail(&mut tx, coverage_id, &record).await?;
                    outcome.updated += 1;
                }
                Err(e) if e.is_not_found() => {
                    Self::insert_coverage_detail(&mut tx, coverage_id, &record).await?;
                    outcome.inserted += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let kept: Vec<String> = rows.into_iter().map(|row| row.field_name).collect();
        let removed = sqlx::query(
            "DELETE FROM frcoveragedetails WHERE CoverageGUID = $1 AND NOT (FieldName = ANY($2))",
        )
        .bind(coverage_id.as_str())
        .bind(&kept)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?
        .rows_affected();
        outcome.removed = usize::try_from(removed).unwrap_or(usize::MAX);

        tx.commit().await.map_err(DatabaseError::from)?;
        debug!(
            inserted = outcome.inserted,
            updated = outcome.updated,
            removed = outcome.removed,
            "Coverage details written"
        );
        Ok(outcome)
    }

    #[instrument(skip_all, fields(role_id = %role_id, rows = rows.len()))]
    async fn replace_role_details(&self, role_id: &RoleId, rows: Vec<DetailRow>) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        sqlx::query("DELETE FROM frroledetails WHERE RoleGUID = $1")
            .bind(role_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;

        for row in &rows {
            Self::insert_role_detail(&mut tx, role_id, &DetailRecord::from_row(row)).await?;
        }

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    #[instrument(skip_all, fields(roles = batches.len()))]
    async fn merge_role_details(&self, batches: Vec<(RoleId, Vec<DetailRow>)>) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        for (role_id, rows) in &batches {
            lock_key(&mut tx, "frroledetails", role_id.as_str()).await?;
            for row in rows {
                let record = DetailRecord::from_row(row);
                let updated = sqlx::query(
                    r#"
                    UPDATE frroledetails
                    SET DecimalValue = $3, IntegerValue = $4, TextValue = $5, DateValue = $6
                    WHERE RoleGUID = $1 AND FieldName = $2
                    "#,
                )
                .bind(role_id.as_str())
                .bind(&record.field_name)
                .bind(record.decimal_value)
                .bind(record.integer_value)
                .bind(&record.text_value)
                .bind(record.date_value)
                .execute(&mut *tx)
                .await
                .map_err(DatabaseError::from)?
                .rows_affected();

                if updated == 0 {
                    Self::insert_role_detail(&mut tx, role_id, &record).await?;
                }
            }
        }

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    #[instrument(skip_all, fields(role_id = %role_id))]
    async fn list_role_details(&self, role_id: &RoleId) -> Result<Vec<DetailRow>, PortError> {
        Ok(self.fetch_rows(SELECT_ROLE_DETAILS, role_id.as_str()).await?)
    }
}
