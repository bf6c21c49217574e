//! Case transfer service — reassignment between staff members.

use caseflow_core::context::TenantContext;
use caseflow_core::error::{CaseflowError, CaseflowResult};
use caseflow_core::event::{DomainEvent, DomainEventSink};
use caseflow_core::models::case::Case;
use caseflow_core::models::employee::EmployeeStatus;
use caseflow_core::repository::{ApplyTransfer, CaseRepository, EmployeeRepository};
use uuid::Uuid;

/// Case transfer service.
///
/// Transfer changes who is responsible for a case; it is orthogonal to
/// status and is allowed in any status, terminal ones included.
pub struct CaseTransferService<C: CaseRepository, E: EmployeeRepository, S: DomainEventSink> {
    case_repo: C,
    employee_repo: E,
    events: S,
}

impl<C: CaseRepository, E: EmployeeRepository, S: DomainEventSink> CaseTransferService<C, E, S> {
    pub fn new(case_repo: C, employee_repo: E, events: S) -> Self {
        Self {
            case_repo,
            employee_repo,
            events,
        }
    }

    /// Reassign a case to `to_employee_id`, recording who, when, and
    /// why. The reason is mandatory.
    pub async fn transfer(
        &self,
        ctx: &TenantContext,
        case_id: Uuid,
        to_employee_id: Uuid,
        reason: String,
        expected_version: u64,
    ) -> CaseflowResult<Case> {
        // 1. Only staff may reassign.
        ctx.require_staff()?;

        // 2. A transfer without a reason is not auditable.
        let reason = reason.trim().to_string();
        if reason.is_empty() {
            return Err(CaseflowError::Validation {
                message: "transfer reason must not be empty".into(),
            });
        }

        // 3. Tenant-scoped case load.
        let case = self.case_repo.get_by_id(ctx.firm_id(), case_id).await?;

        // 4. The target must exist, work for the caller's firm, and be
        //    active. The employee lookup is global so a cross-firm
        //    target is reported as TENANT_MISMATCH, not NOT_FOUND.
        let employee = self.employee_repo.get_by_id(to_employee_id).await?;
        if employee.firm_id != ctx.firm_id() {
            return Err(CaseflowError::TenantMismatch);
        }
        if employee.status != EmployeeStatus::Active {
            return Err(CaseflowError::NotFound {
                entity: "employee".into(),
                id: to_employee_id.to_string(),
            });
        }

        // 5. CAS apply. Assignee, transfer record, and audit entry
        //    commit together; status is never touched.
        let updated = self
            .case_repo
            .apply_transfer(
                ctx.firm_id(),
                case_id,
                ApplyTransfer {
                    from_employee_id: case.assignee_id,
                    to_employee_id,
                    actor_id: ctx.actor_id(),
                    actor_role: ctx.actor_role().to_string(),
                    reason,
                    expected_version,
                },
            )
            .await?;

        // 6. Fire-and-forget event, after commit.
        self.events.emit(DomainEvent::case_transferred(
            ctx.firm_id(),
            ctx.actor_id(),
            case_id,
            case.assignee_id,
            to_employee_id,
        ));

        Ok(updated)
    }
}
