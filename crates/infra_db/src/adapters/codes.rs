//! PostgreSQL Code Lookup
//!
//! Reads code tables from `frcode`, where each row belongs to a named table
//! (`CodeName`) and carries a code value and its long description.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_application::{CodeEntry, CodeLookupPort};

use crate::error::DatabaseError;
use crate::pool::ping;

#[derive(Debug, sqlx::FromRow)]
struct CodeRecord {
    code: String,
    description: Option<String>,
}

impl From<CodeRecord> for CodeEntry {
    fn from(record: CodeRecord) -> Self {
        CodeEntry::new(record.code, record.description.unwrap_or_default())
    }
}

/// PostgreSQL-backed code tables
#[derive(Debug, Clone)]
pub struct PostgresCodeLookup {
    pool: PgPool,
}

impl PostgresCodeLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresCodeLookup {}

#[async_trait]
impl HealthCheckable for PostgresCodeLookup {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-code-lookup").await
    }
}

#[async_trait]
impl CodeLookupPort for PostgresCodeLookup {
    #[instrument(skip(self))]
    async fn codes_by_name(&self, code_name: &str) -> Result<Vec<CodeEntry>, PortError> {
        let records = sqlx::query_as::<_, CodeRecord>(
            r#"
            SELECT CodeValue AS code, DescriptionLong AS description
            FROM frcode
            WHERE CodeName = $1
            "#,
        )
        .bind(code_name)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        debug!(count = records.len(), "Codes fetched");
        Ok(records.into_iter().map(CodeEntry::from).collect())
    }
}
