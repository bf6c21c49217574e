//! Caseflow Database — SurrealDB connection management, schema
//! migrations, and repository implementations for the `caseflow-core`
//! traits.
//!
//! The mutating case and vault operations run as single SurrealDB
//! transactions so that business state, history records, and audit
//! entries commit together or not at all.

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
