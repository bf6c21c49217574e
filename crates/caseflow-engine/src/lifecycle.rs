//! Case lifecycle service — status transitions and history.

use caseflow_core::context::TenantContext;
use caseflow_core::error::{CaseflowError, CaseflowResult};
use caseflow_core::event::{DomainEvent, DomainEventSink};
use caseflow_core::models::case::{Case, CaseStatus};
use caseflow_core::models::transfer::CaseTransferRecord;
use caseflow_core::models::transition::CaseTransitionRecord;
use caseflow_core::repository::{ApplyTransition, CaseRepository};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One entry in a case's merged timeline: either a status transition
/// or an assignment transfer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseHistoryEntry {
    Transition(CaseTransitionRecord),
    Transfer(CaseTransferRecord),
}

impl CaseHistoryEntry {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Transition(record) => record.timestamp,
            Self::Transfer(record) => record.timestamp,
        }
    }
}

/// Case lifecycle service.
///
/// Generic over the case repository and the event sink so that the
/// engine has no dependency on the database crate.
pub struct CaseLifecycleService<C: CaseRepository, S: DomainEventSink> {
    case_repo: C,
    events: S,
}

impl<C: CaseRepository, S: DomainEventSink> CaseLifecycleService<C, S> {
    pub fn new(case_repo: C, events: S) -> Self {
        Self { case_repo, events }
    }

    /// Move a case to `target` along an edge of the fixed transition
    /// table.
    ///
    /// `expected_version` is the version the caller last read; the
    /// update aborts with `CONCURRENT_MODIFICATION` when the stored
    /// case has moved on since.
    pub async fn transition(
        &self,
        ctx: &TenantContext,
        case_id: Uuid,
        target: CaseStatus,
        reason: Option<String>,
        expected_version: u64,
    ) -> CaseflowResult<Case> {
        // 1. Only staff may move a case.
        ctx.require_staff()?;

        // 2. Tenant-scoped load. A case in another firm surfaces as
        //    NOT_FOUND, indistinguishable from absence.
        let case = self.case_repo.get_by_id(ctx.firm_id(), case_id).await?;

        // 3. Validate the edge before touching storage.
        if !case.status.can_transition_to(target) {
            return Err(CaseflowError::InvalidTransition {
                from: case.status,
                to: target,
            });
        }

        // 4. CAS apply. The repository commits the status change, the
        //    transition record, and the audit entry in one transaction.
        let updated = self
            .case_repo
            .apply_transition(
                ctx.firm_id(),
                case_id,
                ApplyTransition {
                    from: case.status,
                    to: target,
                    actor_id: ctx.actor_id(),
                    actor_role: ctx.actor_role().to_string(),
                    reason,
                    expected_version,
                },
            )
            .await?;

        // 5. Fire-and-forget event, after commit.
        self.events.emit(DomainEvent::case_status_changed(
            ctx.firm_id(),
            ctx.actor_id(),
            case_id,
            case.status,
            target,
        ));

        Ok(updated)
    }

    /// Read a case within the caller's firm. Open to staff and client
    /// callers alike.
    pub async fn get(&self, ctx: &TenantContext, case_id: Uuid) -> CaseflowResult<Case> {
        self.case_repo.get_by_id(ctx.firm_id(), case_id).await
    }

    /// The case's full timeline: transition and transfer records
    /// merged in chronological order.
    pub async fn history(
        &self,
        ctx: &TenantContext,
        case_id: Uuid,
    ) -> CaseflowResult<Vec<CaseHistoryEntry>> {
        // Existence and tenancy check first.
        self.case_repo.get_by_id(ctx.firm_id(), case_id).await?;

        let transitions = self
            .case_repo
            .list_transitions(ctx.firm_id(), case_id)
            .await?;
        let transfers = self.case_repo.list_transfers(ctx.firm_id(), case_id).await?;

        let mut entries: Vec<CaseHistoryEntry> = transitions
            .into_iter()
            .map(CaseHistoryEntry::Transition)
            .chain(transfers.into_iter().map(CaseHistoryEntry::Transfer))
            .collect();
        entries.sort_by_key(CaseHistoryEntry::timestamp);

        Ok(entries)
    }
}
