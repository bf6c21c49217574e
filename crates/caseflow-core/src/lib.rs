//! Caseflow Core — domain models, repository traits, tenant context,
//! and the shared error taxonomy.
//!
//! This crate has no storage or transport dependencies; the database
//! and HTTP layers build on the traits and types defined here.

pub mod context;
pub mod error;
pub mod event;
pub mod models;
pub mod repository;

pub use context::{RequestIdentity, TenantContext, UserType};
pub use error::{CaseflowError, CaseflowResult};
