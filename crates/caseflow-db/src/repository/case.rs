//! SurrealDB implementation of [`CaseRepository`].
//!
//! Status transitions and transfers run as single SurrealDB
//! transactions: a compare-and-swap UPDATE guarded by the expected
//! version, the immutable history record, and the audit entry either
//! all commit or none do. A losing writer aborts via the
//! `stale_version` THROW sentinel.

use caseflow_core::error::CaseflowResult;
use caseflow_core::models::audit::{AuditAction, AuditOutcome, CreateAuditLogEntry};
use caseflow_core::models::case::{Case, CasePriority, CaseStatus, CreateCase};
use caseflow_core::models::transfer::CaseTransferRecord;
use caseflow_core::models::transition::CaseTransitionRecord;
use caseflow_core::models::vault::hash_pin;
use caseflow_core::repository::{ApplyTransfer, ApplyTransition, CaseRepository};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, check_tx_response, classify_tx_error};
use crate::repository::audit::{AUDIT_SET, bind_audit};

#[derive(Debug, SurrealValue)]
struct CaseRow {
    firm_id: String,
    organization_id: String,
    service_id: String,
    case_number: String,
    status: String,
    priority: String,
    assignee_id: Option<String>,
    flags: Vec<String>,
    vault_pin_hash: String,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CaseRow {
    fn into_case(self, id: Uuid) -> Result<Case, DbError> {
        let firm_id = Uuid::parse_str(&self.firm_id)
            .map_err(|e| DbError::Migration(format!("invalid firm UUID: {e}")))?;
        let organization_id = Uuid::parse_str(&self.organization_id)
            .map_err(|e| DbError::Migration(format!("invalid organization UUID: {e}")))?;
        let service_id = Uuid::parse_str(&self.service_id)
            .map_err(|e| DbError::Migration(format!("invalid service UUID: {e}")))?;
        let assignee_id = self
            .assignee_id
            .map(|s| Uuid::parse_str(&s))
            .transpose()
            .map_err(|e| DbError::Migration(format!("invalid assignee UUID: {e}")))?;
        let status = CaseStatus::parse(&self.status)
            .ok_or_else(|| DbError::Migration(format!("invalid case status: {}", self.status)))?;
        let priority = CasePriority::parse(&self.priority).ok_or_else(|| {
            DbError::Migration(format!("invalid case priority: {}", self.priority))
        })?;
        Ok(Case {
            id,
            firm_id,
            organization_id,
            service_id,
            case_number: self.case_number,
            status,
            priority,
            assignee_id,
            flags: self.flags,
            vault_pin_hash: self.vault_pin_hash,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct TransitionRowWithId {
    record_id: String,
    case_id: String,
    firm_id: String,
    from_status: String,
    to_status: String,
    actor_id: String,
    actor_role: String,
    reason: Option<String>,
    timestamp: DateTime<Utc>,
}

impl TransitionRowWithId {
    fn try_into_record(self) -> Result<CaseTransitionRecord, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let case_id = Uuid::parse_str(&self.case_id)
            .map_err(|e| DbError::Migration(format!("invalid case UUID: {e}")))?;
        let firm_id = Uuid::parse_str(&self.firm_id)
            .map_err(|e| DbError::Migration(format!("invalid firm UUID: {e}")))?;
        let actor_id = Uuid::parse_str(&self.actor_id)
            .map_err(|e| DbError::Migration(format!("invalid actor UUID: {e}")))?;
        let from_status = CaseStatus::parse(&self.from_status).ok_or_else(|| {
            DbError::Migration(format!("invalid case status: {}", self.from_status))
        })?;
        let to_status = CaseStatus::parse(&self.to_status).ok_or_else(|| {
            DbError::Migration(format!("invalid case status: {}", self.to_status))
        })?;
        Ok(CaseTransitionRecord {
            id,
            case_id,
            firm_id,
            from_status,
            to_status,
            actor_id,
            actor_role: self.actor_role,
            reason: self.reason,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct TransferRowWithId {
    record_id: String,
    case_id: String,
    firm_id: String,
    from_employee_id: Option<String>,
    to_employee_id: String,
    reason: String,
    actor_id: String,
    timestamp: DateTime<Utc>,
}

impl TransferRowWithId {
    fn try_into_record(self) -> Result<CaseTransferRecord, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let case_id = Uuid::parse_str(&self.case_id)
            .map_err(|e| DbError::Migration(format!("invalid case UUID: {e}")))?;
        let firm_id = Uuid::parse_str(&self.firm_id)
            .map_err(|e| DbError::Migration(format!("invalid firm UUID: {e}")))?;
        let from_employee_id = self
            .from_employee_id
            .map(|s| Uuid::parse_str(&s))
            .transpose()
            .map_err(|e| DbError::Migration(format!("invalid employee UUID: {e}")))?;
        let to_employee_id = Uuid::parse_str(&self.to_employee_id)
            .map_err(|e| DbError::Migration(format!("invalid employee UUID: {e}")))?;
        let actor_id = Uuid::parse_str(&self.actor_id)
            .map_err(|e| DbError::Migration(format!("invalid actor UUID: {e}")))?;
        Ok(CaseTransferRecord {
            id,
            case_id,
            firm_id,
            from_employee_id,
            to_employee_id,
            reason: self.reason,
            actor_id,
            timestamp: self.timestamp,
        })
    }
}

/// SurrealDB implementation of the Case repository.
#[derive(Clone)]
pub struct SurrealCaseRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCaseRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CaseRepository for SurrealCaseRepository<C> {
    async fn create(&self, input: CreateCase) -> CaseflowResult<Case> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let pin_hash = hash_pin(&input.vault_pin);

        let result = self
            .db
            .query(
                "CREATE type::record('compliance_case', $id) SET \
                 firm_id = $firm_id, \
                 organization_id = $organization_id, \
                 service_id = $service_id, \
                 case_number = $case_number, \
                 status = 'Draft', \
                 priority = $priority, \
                 assignee_id = $assignee_id, \
                 flags = $flags, \
                 vault_pin_hash = $vault_pin_hash, \
                 version = 1",
            )
            .bind(("id", id_str.clone()))
            .bind(("firm_id", input.firm_id.to_string()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("service_id", input.service_id.to_string()))
            .bind(("case_number", input.case_number))
            .bind(("priority", input.priority.as_str()))
            .bind(("assignee_id", input.assignee_id.map(|a| a.to_string())))
            .bind(("flags", input.flags))
            .bind(("vault_pin_hash", pin_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<CaseRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "case".into(),
            id: id_str,
        })?;

        Ok(row.into_case(id)?)
    }

    async fn get_by_id(&self, firm_id: Uuid, id: Uuid) -> CaseflowResult<Case> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('compliance_case', $id) \
                 WHERE firm_id = $firm_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("firm_id", firm_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CaseRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "case".into(),
            id: id_str,
        })?;

        Ok(row.into_case(id)?)
    }

    async fn apply_transition(
        &self,
        firm_id: Uuid,
        id: Uuid,
        input: ApplyTransition,
    ) -> CaseflowResult<Case> {
        let id_str = id.to_string();
        let audit = CreateAuditLogEntry {
            firm_id,
            entity_type: "case".into(),
            entity_id: id,
            action: AuditAction::StatusChange,
            actor_id: input.actor_id,
            actor_role: input.actor_role.clone(),
            outcome: AuditOutcome::Success,
            metadata: serde_json::json!({
                "from": input.from.as_str(),
                "to": input.to.as_str(),
                "reason": input.reason.clone(),
            }),
        };

        let query = format!(
            "BEGIN TRANSACTION; \
             LET $rows = (UPDATE type::record('compliance_case', $id) \
                 SET status = $to_status, \
                     version = version + 1, \
                     updated_at = time::now() \
                 WHERE firm_id = $firm_id \
                   AND version = $expected_version \
                   AND status = $from_status); \
             IF array::len($rows) == 0 {{ THROW 'stale_version' }}; \
             CREATE type::record('case_transition', $transition_id) SET \
                 case_id = $id, firm_id = $firm_id, \
                 from_status = $from_status, to_status = $to_status, \
                 actor_id = $actor_id, actor_role = $actor_role, \
                 reason = $reason; \
             CREATE type::record('audit_log', $audit_id) SET {AUDIT_SET}; \
             COMMIT TRANSACTION;"
        );

        let result = bind_audit(self.db.query(query), audit)
            .bind(("id", id_str.clone()))
            .bind(("transition_id", Uuid::new_v4().to_string()))
            .bind(("firm_id", firm_id.to_string()))
            .bind(("from_status", input.from.as_str()))
            .bind(("to_status", input.to.as_str()))
            .bind(("expected_version", input.expected_version))
            .bind(("actor_id", input.actor_id.to_string()))
            .bind(("actor_role", input.actor_role))
            .bind(("reason", input.reason))
            .await
            .map_err(|e| classify_tx_error("case", &id_str, e))?;

        check_tx_response("case", &id_str, result)?;

        self.get_by_id(firm_id, id).await
    }

    async fn apply_transfer(
        &self,
        firm_id: Uuid,
        id: Uuid,
        input: ApplyTransfer,
    ) -> CaseflowResult<Case> {
        let id_str = id.to_string();
        let audit = CreateAuditLogEntry {
            firm_id,
            entity_type: "case".into(),
            entity_id: id,
            action: AuditAction::Transfer,
            actor_id: input.actor_id,
            actor_role: input.actor_role.clone(),
            outcome: AuditOutcome::Success,
            metadata: serde_json::json!({
                "from_employee_id": input.from_employee_id,
                "to_employee_id": input.to_employee_id,
                "reason": input.reason.clone(),
            }),
        };

        let query = format!(
            "BEGIN TRANSACTION; \
             LET $rows = (UPDATE type::record('compliance_case', $id) \
                 SET assignee_id = $to_employee_id, \
                     version = version + 1, \
                     updated_at = time::now() \
                 WHERE firm_id = $firm_id \
                   AND version = $expected_version); \
             IF array::len($rows) == 0 {{ THROW 'stale_version' }}; \
             CREATE type::record('case_transfer', $transfer_id) SET \
                 case_id = $id, firm_id = $firm_id, \
                 from_employee_id = $from_employee_id, \
                 to_employee_id = $to_employee_id, \
                 reason = $reason, actor_id = $actor_id; \
             CREATE type::record('audit_log', $audit_id) SET {AUDIT_SET}; \
             COMMIT TRANSACTION;"
        );

        let result = bind_audit(self.db.query(query), audit)
            .bind(("id", id_str.clone()))
            .bind(("transfer_id", Uuid::new_v4().to_string()))
            .bind(("firm_id", firm_id.to_string()))
            .bind((
                "from_employee_id",
                input.from_employee_id.map(|e| e.to_string()),
            ))
            .bind(("to_employee_id", input.to_employee_id.to_string()))
            .bind(("expected_version", input.expected_version))
            .bind(("actor_id", input.actor_id.to_string()))
            .bind(("reason", input.reason))
            .await
            .map_err(|e| classify_tx_error("case", &id_str, e))?;

        check_tx_response("case", &id_str, result)?;

        self.get_by_id(firm_id, id).await
    }

    async fn list_transitions(
        &self,
        firm_id: Uuid,
        case_id: Uuid,
    ) -> CaseflowResult<Vec<CaseTransitionRecord>> {
        let mut result = self
            .db
            .query(
                "SELECT record::id(id) AS record_id, * FROM case_transition \
                 WHERE firm_id = $firm_id AND case_id = $case_id \
                 ORDER BY timestamp",
            )
            .bind(("firm_id", firm_id.to_string()))
            .bind(("case_id", case_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TransitionRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(TransitionRowWithId::try_into_record)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn list_transfers(
        &self,
        firm_id: Uuid,
        case_id: Uuid,
    ) -> CaseflowResult<Vec<CaseTransferRecord>> {
        let mut result = self
            .db
            .query(
                "SELECT record::id(id) AS record_id, * FROM case_transfer \
                 WHERE firm_id = $firm_id AND case_id = $case_id \
                 ORDER BY timestamp",
            )
            .bind(("firm_id", firm_id.to_string()))
            .bind(("case_id", case_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TransferRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(TransferRowWithId::try_into_record)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
