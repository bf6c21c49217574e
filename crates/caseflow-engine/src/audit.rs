//! Audit trail query service.

use caseflow_core::context::TenantContext;
use caseflow_core::error::CaseflowResult;
use caseflow_core::models::audit::AuditLogEntry;
use caseflow_core::repository::{AuditLogFilter, AuditLogRepository, PaginatedResult, Pagination};

use crate::config::EngineConfig;

/// Read access to the audit trail, strictly scoped to the caller's
/// firm. Staff only.
pub struct AuditTrailService<A: AuditLogRepository> {
    audit_repo: A,
    config: EngineConfig,
}

impl<A: AuditLogRepository> AuditTrailService<A> {
    pub fn new(audit_repo: A, config: EngineConfig) -> Self {
        Self { audit_repo, config }
    }

    pub async fn query(
        &self,
        ctx: &TenantContext,
        filter: AuditLogFilter,
        pagination: Pagination,
    ) -> CaseflowResult<PaginatedResult<AuditLogEntry>> {
        ctx.require_staff()?;

        let pagination = Pagination {
            offset: pagination.offset,
            limit: pagination.limit.clamp(1, self.config.audit_page_limit),
        };

        self.audit_repo.list(ctx.firm_id(), filter, pagination).await
    }
}
