//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Firm-scoped repositories
//! require a `firm_id` parameter to enforce tenant isolation, and the
//! mutating case/vault operations commit their business change, the
//! history record, and the audit entry as one atomic unit.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::CaseflowResult;
use crate::models::{
    audit::{AuditAction, AuditLogEntry, CreateAuditLogEntry},
    case::{Case, CaseStatus, CreateCase},
    employee::{CreateEmployee, Employee},
    firm::{CreateFirm, Firm},
    transfer::CaseTransferRecord,
    transition::CaseTransitionRecord,
    vault::{CreateVaultSession, VaultSession},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Firm & Employee directory (collaborator surface)
// ---------------------------------------------------------------------------

pub trait FirmRepository: Send + Sync {
    fn create(&self, input: CreateFirm) -> impl Future<Output = CaseflowResult<Firm>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CaseflowResult<Firm>> + Send;
}

pub trait EmployeeRepository: Send + Sync {
    fn create(
        &self,
        input: CreateEmployee,
    ) -> impl Future<Output = CaseflowResult<Employee>> + Send;

    /// Global lookup — callers compare the returned `firm_id` against
    /// the request context to distinguish `TENANT_MISMATCH` from
    /// `NOT_FOUND`.
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CaseflowResult<Employee>> + Send;

    fn list(
        &self,
        firm_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = CaseflowResult<PaginatedResult<Employee>>> + Send;
}

// ---------------------------------------------------------------------------
// Cases (firm-scoped)
// ---------------------------------------------------------------------------

/// Input for the atomic status-transition unit.
#[derive(Debug, Clone)]
pub struct ApplyTransition {
    pub from: CaseStatus,
    pub to: CaseStatus,
    pub actor_id: Uuid,
    pub actor_role: String,
    pub reason: Option<String>,
    /// Optimistic-concurrency guard; the update aborts when the stored
    /// version differs.
    pub expected_version: u64,
}

/// Input for the atomic reassignment unit.
#[derive(Debug, Clone)]
pub struct ApplyTransfer {
    pub from_employee_id: Option<Uuid>,
    pub to_employee_id: Uuid,
    pub actor_id: Uuid,
    pub actor_role: String,
    pub reason: String,
    pub expected_version: u64,
}

pub trait CaseRepository: Send + Sync {
    fn create(&self, input: CreateCase) -> impl Future<Output = CaseflowResult<Case>> + Send;

    fn get_by_id(
        &self,
        firm_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CaseflowResult<Case>> + Send;

    /// Apply a validated status transition: compare-and-swap on
    /// `version`, bump it, and write the transition record plus the
    /// STATUS_CHANGE audit entry in the same storage transaction.
    /// Fails `CONCURRENT_MODIFICATION` when the version check loses.
    fn apply_transition(
        &self,
        firm_id: Uuid,
        id: Uuid,
        input: ApplyTransition,
    ) -> impl Future<Output = CaseflowResult<Case>> + Send;

    /// Apply a reassignment under the same CAS + atomicity contract as
    /// `apply_transition`. Never touches `status`.
    fn apply_transfer(
        &self,
        firm_id: Uuid,
        id: Uuid,
        input: ApplyTransfer,
    ) -> impl Future<Output = CaseflowResult<Case>> + Send;

    fn list_transitions(
        &self,
        firm_id: Uuid,
        case_id: Uuid,
    ) -> impl Future<Output = CaseflowResult<Vec<CaseTransitionRecord>>> + Send;

    fn list_transfers(
        &self,
        firm_id: Uuid,
        case_id: Uuid,
    ) -> impl Future<Output = CaseflowResult<Vec<CaseTransferRecord>>> + Send;
}

// ---------------------------------------------------------------------------
// Vault sessions (firm-scoped, exclusive lease per case)
// ---------------------------------------------------------------------------

pub trait VaultSessionRepository: Send + Sync {
    /// Create a new `Unlocked` session and its UNLOCK audit entry in
    /// one transaction, failing `VAULT_SESSION_ACTIVE` when another
    /// session for the case is `Unlocked` with a heartbeat newer than
    /// `cutoff`. Stale leases do not block a fresh unlock.
    fn create_exclusive(
        &self,
        input: CreateVaultSession,
        cutoff: DateTime<Utc>,
        audit: CreateAuditLogEntry,
    ) -> impl Future<Output = CaseflowResult<VaultSession>> + Send;

    fn get_by_id(
        &self,
        firm_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CaseflowResult<VaultSession>> + Send;

    /// Extend the lease (`last_heartbeat_at = now`) iff the session is
    /// still `Unlocked` and its heartbeat is newer than `cutoff`.
    /// Fails `VAULT_SESSION_EXPIRED` otherwise.
    fn touch(
        &self,
        firm_id: Uuid,
        id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = CaseflowResult<VaultSession>> + Send;

    /// Transition an `Unlocked`, non-stale session to `Locked` and
    /// write the LOCK audit entry atomically. Fails
    /// `VAULT_SESSION_EXPIRED` when the session is no longer live;
    /// idempotency for already-ended sessions is handled by the caller.
    fn lock_active(
        &self,
        firm_id: Uuid,
        id: Uuid,
        cutoff: DateTime<Utc>,
        audit: CreateAuditLogEntry,
    ) -> impl Future<Output = CaseflowResult<()>> + Send;

    /// Lazily mark a stale `Unlocked` session as `Expired`.
    fn mark_expired(
        &self,
        firm_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CaseflowResult<()>> + Send;

    /// Sweep: mark every `Unlocked` session with a heartbeat at or
    /// before `cutoff` as `Expired`. Returns the number swept.
    fn expire_stale(
        &self,
        firm_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = CaseflowResult<u64>> + Send;

    /// The live lease for a case, if any.
    fn active_for_case(
        &self,
        firm_id: Uuid,
        case_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = CaseflowResult<Option<VaultSession>>> + Send;
}

// ---------------------------------------------------------------------------
// Audit (append-only, firm-scoped)
// ---------------------------------------------------------------------------

/// Query filters for audit log entries.
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub entity_type: Option<String>,
    pub actor_id: Option<Uuid>,
    pub action: Option<AuditAction>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub trait AuditLogRepository: Send + Sync {
    /// Append a new audit log entry. No update or delete operations
    /// exist.
    fn append(
        &self,
        input: CreateAuditLogEntry,
    ) -> impl Future<Output = CaseflowResult<AuditLogEntry>> + Send;

    /// Entries scoped strictly to `firm_id`, newest first.
    fn list(
        &self,
        firm_id: Uuid,
        filter: AuditLogFilter,
        pagination: Pagination,
    ) -> impl Future<Output = CaseflowResult<PaginatedResult<AuditLogEntry>>> + Send;
}
