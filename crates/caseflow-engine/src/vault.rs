//! Vault session service — exclusive, heartbeat-renewed access leases.

use caseflow_core::context::TenantContext;
use caseflow_core::error::{CaseflowError, CaseflowResult};
use caseflow_core::models::audit::{AuditAction, AuditOutcome, CreateAuditLogEntry};
use caseflow_core::models::vault::{
    CreateVaultSession, VaultSession, VaultSessionState, verify_pin,
};
use caseflow_core::repository::{AuditLogRepository, CaseRepository, VaultSessionRepository};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::EngineConfig;

/// Vault session service.
///
/// A session is live while it is `Unlocked` and its last heartbeat is
/// within the TTL. Expiry is evaluated lazily on every read against
/// `now - TTL`; a background sweep is an optional optimization, never
/// a correctness requirement.
pub struct VaultSessionService<V, C, A>
where
    V: VaultSessionRepository,
    C: CaseRepository,
    A: AuditLogRepository,
{
    vault_repo: V,
    case_repo: C,
    audit_repo: A,
    config: EngineConfig,
}

impl<V, C, A> VaultSessionService<V, C, A>
where
    V: VaultSessionRepository,
    C: CaseRepository,
    A: AuditLogRepository,
{
    pub fn new(vault_repo: V, case_repo: C, audit_repo: A, config: EngineConfig) -> Self {
        Self {
            vault_repo,
            case_repo,
            audit_repo,
            config,
        }
    }

    /// Heartbeats older than this instant no longer hold the lease.
    fn cutoff(&self) -> DateTime<Utc> {
        Utc::now() - Duration::seconds(self.config.vault_session_ttl_secs as i64)
    }

    fn audit_entry(
        &self,
        ctx: &TenantContext,
        case_id: Uuid,
        action: AuditAction,
        outcome: AuditOutcome,
        metadata: serde_json::Value,
    ) -> CreateAuditLogEntry {
        CreateAuditLogEntry {
            firm_id: ctx.firm_id(),
            entity_type: "case".into(),
            entity_id: case_id,
            action,
            actor_id: ctx.actor_id(),
            actor_role: ctx.actor_role().to_string(),
            outcome,
            metadata,
        }
    }

    /// Open a vault session for a case by presenting its PIN.
    ///
    /// Available to staff and client callers; possession of the PIN is
    /// the credential. Wrong PINs are audited as denied access. While
    /// another session for the case is live the unlock fails with
    /// `VAULT_SESSION_ACTIVE` regardless of who holds it.
    pub async fn unlock(
        &self,
        ctx: &TenantContext,
        case_id: Uuid,
        pin: &str,
    ) -> CaseflowResult<VaultSession> {
        let case = self.case_repo.get_by_id(ctx.firm_id(), case_id).await?;

        if !verify_pin(pin, &case.vault_pin_hash) {
            // The denied attempt is recorded before the rejection.
            self.audit_repo
                .append(self.audit_entry(
                    ctx,
                    case_id,
                    AuditAction::Access,
                    AuditOutcome::Denied,
                    serde_json::json!({ "reason": "invalid_pin" }),
                ))
                .await?;
            return Err(CaseflowError::VaultInvalidPin);
        }

        // Session creation and its UNLOCK audit entry commit together;
        // the exclusivity check runs in the same transaction.
        self.vault_repo
            .create_exclusive(
                CreateVaultSession {
                    firm_id: ctx.firm_id(),
                    case_id,
                    holder_id: ctx.actor_id(),
                },
                self.cutoff(),
                self.audit_entry(
                    ctx,
                    case_id,
                    AuditAction::Unlock,
                    AuditOutcome::Success,
                    serde_json::json!({}),
                ),
            )
            .await
    }

    /// Renew a session's lease. Heartbeats are not audited.
    pub async fn heartbeat(
        &self,
        ctx: &TenantContext,
        case_id: Uuid,
        session_id: Uuid,
    ) -> CaseflowResult<VaultSession> {
        let session = self.vault_repo.get_by_id(ctx.firm_id(), session_id).await?;
        if session.case_id != case_id {
            return Err(CaseflowError::NotFound {
                entity: "vault_session".into(),
                id: session_id.to_string(),
            });
        }

        if session.state != VaultSessionState::Unlocked {
            return Err(CaseflowError::VaultSessionExpired);
        }

        // Lazy expiry: a lapsed lease is marked Expired the moment it
        // is observed, and the beat is rejected.
        if session.last_heartbeat_at <= self.cutoff() {
            self.vault_repo
                .mark_expired(ctx.firm_id(), session_id)
                .await?;
            return Err(CaseflowError::VaultSessionExpired);
        }

        self.vault_repo
            .touch(ctx.firm_id(), session_id, self.cutoff())
            .await
    }

    /// End a session. Idempotent: locking a session that is already
    /// `Locked` or `Expired` succeeds without writing anything. Only a
    /// real `Unlocked` → `Locked` transition produces a LOCK audit
    /// entry.
    pub async fn lock(
        &self,
        ctx: &TenantContext,
        case_id: Uuid,
        session_id: Uuid,
    ) -> CaseflowResult<()> {
        let session = self.vault_repo.get_by_id(ctx.firm_id(), session_id).await?;
        if session.case_id != case_id {
            return Err(CaseflowError::NotFound {
                entity: "vault_session".into(),
                id: session_id.to_string(),
            });
        }

        match session.state {
            VaultSessionState::Locked | VaultSessionState::Expired => return Ok(()),
            VaultSessionState::Unlocked => {}
        }

        if session.last_heartbeat_at <= self.cutoff() {
            // The lease had already lapsed; settle its state and treat
            // the lock as done.
            self.vault_repo
                .mark_expired(ctx.firm_id(), session_id)
                .await?;
            return Ok(());
        }

        let result = self
            .vault_repo
            .lock_active(
                ctx.firm_id(),
                session_id,
                self.cutoff(),
                self.audit_entry(
                    ctx,
                    case_id,
                    AuditAction::Lock,
                    AuditOutcome::Success,
                    serde_json::json!({ "session_id": session_id }),
                ),
            )
            .await;

        match result {
            Ok(()) => Ok(()),
            // Raced with expiry or another lock between our read and
            // the guarded update. The session has ended either way.
            Err(CaseflowError::VaultSessionExpired) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// The live session for a case, if any.
    pub async fn active_for_case(
        &self,
        ctx: &TenantContext,
        case_id: Uuid,
    ) -> CaseflowResult<Option<VaultSession>> {
        self.vault_repo
            .active_for_case(ctx.firm_id(), case_id, self.cutoff())
            .await
    }

    /// Sweep lapsed sessions into `Expired`. Correctness never depends
    /// on this running; it keeps dashboards honest.
    pub async fn sweep_expired(&self, ctx: &TenantContext) -> CaseflowResult<u64> {
        ctx.require_staff()?;
        let swept = self
            .vault_repo
            .expire_stale(ctx.firm_id(), self.cutoff())
            .await?;
        if swept > 0 {
            tracing::info!(firm_id = %ctx.firm_id(), swept, "expired stale vault sessions");
        }
        Ok(swept)
    }
}
