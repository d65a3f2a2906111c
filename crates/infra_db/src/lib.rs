//! Infrastructure Database Layer
//!
//! PostgreSQL access for the intake platform using SQLx. The crate owns the
//! connection pool, the database error taxonomy and the adapters that back
//! the domain's storage ports.
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PostgresDetailStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/intake")).await?;
//! let store = PostgresDetailStore::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;

pub use adapters::{PostgresCodeLookup, PostgresDetailStore, PostgresIntakeStore};
pub use error::DatabaseError;
pub use pool::{create_pool, ping, DatabaseConfig, DatabasePool};
