//! Caseflow engine: case lifecycle, transfer, vault session, and audit
//! trail services.
//!
//! Services are generic over the repository traits in `caseflow-core`
//! so this crate has no dependency on the database crate. Every entry
//! point takes a resolved [`caseflow_core::TenantContext`] by
//! reference; nothing here runs without one.

pub mod audit;
pub mod config;
pub mod lifecycle;
pub mod transfer;
pub mod vault;

pub use audit::AuditTrailService;
pub use config::EngineConfig;
pub use lifecycle::{CaseHistoryEntry, CaseLifecycleService};
pub use transfer::CaseTransferService;
pub use vault::VaultSessionService;
