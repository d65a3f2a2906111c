//! Domain Adapters
//!
//! PostgreSQL implementations of the intake domain's ports.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use infra_db::adapters::{PostgresCodeLookup, PostgresDetailStore, PostgresIntakeStore};
//! use domain_application::{CodeService, DetailService, IntakeService};
//!
//! let details = DetailService::new(Arc::new(PostgresDetailStore::new(pool.clone())));
//! let intake = IntakeService::new(Arc::new(PostgresIntakeStore::new(pool.clone())), Arc::new(UuidIdGenerator));
//! let codes = CodeService::new(Arc::new(PostgresCodeLookup::new(pool)));
//! ```

use sqlx::{Postgres, Transaction};

use crate::error::DatabaseError;

pub mod codes;
pub mod details;
pub mod intake;

pub use codes::PostgresCodeLookup;
pub use details::{DetailRecord, PostgresDetailStore};
pub use intake::PostgresIntakeStore;

/// Takes a transaction-scoped advisory lock on `key` within `namespace`
///
/// Released on commit or rollback.
pub(crate) async fn lock_key(
    tx: &mut Transaction<'_, Postgres>,
    namespace: &str,
    key: &str,
) -> Result<(), DatabaseError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1), hashtext($2))")
        .bind(namespace)
        .bind(key)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
