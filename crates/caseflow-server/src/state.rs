//! Shared application state.

use std::sync::Arc;

use caseflow_core::event::TracingEventSink;
use caseflow_db::repository::{
    SurrealAuditLogRepository, SurrealCaseRepository, SurrealEmployeeRepository,
    SurrealVaultSessionRepository,
};
use caseflow_engine::{
    AuditTrailService, CaseLifecycleService, CaseTransferService, EngineConfig,
    VaultSessionService,
};
use surrealdb::{Connection, Surreal};

pub type Lifecycle<C> = CaseLifecycleService<SurrealCaseRepository<C>, TracingEventSink>;
pub type Transfer<C> =
    CaseTransferService<SurrealCaseRepository<C>, SurrealEmployeeRepository<C>, TracingEventSink>;
pub type Vault<C> = VaultSessionService<
    SurrealVaultSessionRepository<C>,
    SurrealCaseRepository<C>,
    SurrealAuditLogRepository<C>,
>;
pub type Audit<C> = AuditTrailService<SurrealAuditLogRepository<C>>;

/// State shared across handlers. Generic over the SurrealDB
/// connection so API tests run on the in-memory engine.
pub struct AppState<C: Connection> {
    pub lifecycle: Arc<Lifecycle<C>>,
    pub transfer: Arc<Transfer<C>>,
    pub vault: Arc<Vault<C>>,
    pub audit: Arc<Audit<C>>,
}

impl<C: Connection> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: Arc::clone(&self.lifecycle),
            transfer: Arc::clone(&self.transfer),
            vault: Arc::clone(&self.vault),
            audit: Arc::clone(&self.audit),
        }
    }
}

impl<C: Connection> AppState<C> {
    pub fn new(db: Surreal<C>, config: EngineConfig) -> Self {
        let lifecycle = CaseLifecycleService::new(
            SurrealCaseRepository::new(db.clone()),
            TracingEventSink,
        );
        let transfer = CaseTransferService::new(
            SurrealCaseRepository::new(db.clone()),
            SurrealEmployeeRepository::new(db.clone()),
            TracingEventSink,
        );
        let vault = VaultSessionService::new(
            SurrealVaultSessionRepository::new(db.clone()),
            SurrealCaseRepository::new(db.clone()),
            SurrealAuditLogRepository::new(db.clone()),
            config.clone(),
        );
        let audit = AuditTrailService::new(SurrealAuditLogRepository::new(db), config);

        Self {
            lifecycle: Arc::new(lifecycle),
            transfer: Arc::new(transfer),
            vault: Arc::new(vault),
            audit: Arc::new(audit),
        }
    }
}
