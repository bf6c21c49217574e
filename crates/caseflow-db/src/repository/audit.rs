//! SurrealDB implementation of [`AuditLogRepository`].
//!
//! The audit table is append-only (update/delete are denied at the
//! schema level). Other repositories reuse the shared insert fragment
//! here so audit entries land in the same transaction as the business
//! mutation they describe.

use caseflow_core::error::CaseflowResult;
use caseflow_core::models::audit::{
    AuditAction, AuditLogEntry, AuditOutcome, CreateAuditLogEntry,
};
use caseflow_core::repository::{AuditLogFilter, AuditLogRepository, PaginatedResult, Pagination};
use chrono::{DateTime, Utc};
use surrealdb::method::Query;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// SET clause shared by every audit insert, standalone or inside a
/// business transaction. All parameters carry the `audit_` prefix so
/// they never collide with the enclosing statement's binds.
pub(crate) const AUDIT_SET: &str = "\
    firm_id = $audit_firm_id, \
    entity_type = $audit_entity_type, \
    entity_id = $audit_entity_id, \
    action = $audit_action, \
    actor_id = $audit_actor_id, \
    actor_role = $audit_actor_role, \
    outcome = $audit_outcome, \
    metadata = $audit_metadata";

/// Bind the `audit_`-prefixed parameters for [`AUDIT_SET`], including a
/// fresh `$audit_id` so in-transaction inserts get UUID record ids like
/// every other row in the crate.
pub(crate) fn bind_audit<'r, C: Connection>(
    query: Query<'r, C>,
    input: CreateAuditLogEntry,
) -> Query<'r, C> {
    query
        .bind(("audit_id", Uuid::new_v4().to_string()))
        .bind(("audit_firm_id", input.firm_id.to_string()))
        .bind(("audit_entity_type", input.entity_type))
        .bind(("audit_entity_id", input.entity_id.to_string()))
        .bind(("audit_action", input.action.as_str()))
        .bind(("audit_actor_id", input.actor_id.to_string()))
        .bind(("audit_actor_role", input.actor_role))
        .bind(("audit_outcome", input.outcome.as_str()))
        .bind(("audit_metadata", input.metadata))
}

#[derive(Debug, SurrealValue)]
struct AuditRow {
    firm_id: String,
    entity_type: String,
    entity_id: String,
    action: String,
    actor_id: String,
    actor_role: String,
    outcome: String,
    metadata: serde_json::Value,
    timestamp: DateTime<Utc>,
}

impl AuditRow {
    fn into_entry(self, id: Uuid) -> Result<AuditLogEntry, DbError> {
        let firm_id = Uuid::parse_str(&self.firm_id)
            .map_err(|e| DbError::Migration(format!("invalid firm UUID: {e}")))?;
        let entity_id = Uuid::parse_str(&self.entity_id)
            .map_err(|e| DbError::Migration(format!("invalid entity UUID: {e}")))?;
        let actor_id = Uuid::parse_str(&self.actor_id)
            .map_err(|e| DbError::Migration(format!("invalid actor UUID: {e}")))?;
        let action = AuditAction::parse(&self.action)
            .ok_or_else(|| DbError::Migration(format!("invalid audit action: {}", self.action)))?;
        let outcome = AuditOutcome::parse(&self.outcome).ok_or_else(|| {
            DbError::Migration(format!("invalid audit outcome: {}", self.outcome))
        })?;
        Ok(AuditLogEntry {
            id,
            firm_id,
            entity_type: self.entity_type,
            entity_id,
            action,
            actor_id,
            actor_role: self.actor_role,
            outcome,
            metadata: self.metadata,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct AuditRowWithId {
    record_id: String,
    firm_id: String,
    entity_type: String,
    entity_id: String,
    action: String,
    actor_id: String,
    actor_role: String,
    outcome: String,
    metadata: serde_json::Value,
    timestamp: DateTime<Utc>,
}

impl AuditRowWithId {
    fn try_into_entry(self) -> Result<AuditLogEntry, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        AuditRow {
            firm_id: self.firm_id,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            action: self.action,
            actor_id: self.actor_id,
            actor_role: self.actor_role,
            outcome: self.outcome,
            metadata: self.metadata,
            timestamp: self.timestamp,
        }
        .into_entry(id)
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the append-only audit log repository.
#[derive(Clone)]
pub struct SurrealAuditLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuditLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AuditLogRepository for SurrealAuditLogRepository<C> {
    async fn append(&self, input: CreateAuditLogEntry) -> CaseflowResult<AuditLogEntry> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let query = format!("CREATE type::record('audit_log', $id) SET {AUDIT_SET}");
        let result = bind_audit(self.db.query(query), input)
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AuditRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "audit_log".into(),
            id: id_str,
        })?;

        Ok(row.into_entry(id)?)
    }

    async fn list(
        &self,
        firm_id: Uuid,
        filter: AuditLogFilter,
        pagination: Pagination,
    ) -> CaseflowResult<PaginatedResult<AuditLogEntry>> {
        let mut conditions = vec!["firm_id = $firm_id"];
        if filter.entity_type.is_some() {
            conditions.push("entity_type = $entity_type");
        }
        if filter.actor_id.is_some() {
            conditions.push("actor_id = $actor_id");
        }
        if filter.action.is_some() {
            conditions.push("action = $action");
        }
        if filter.from.is_some() {
            conditions.push("timestamp >= $from");
        }
        if filter.to.is_some() {
            conditions.push("timestamp <= $to");
        }
        let where_clause = conditions.join(" AND ");

        let query = format!(
            "SELECT record::id(id) AS record_id, * FROM audit_log \
             WHERE {where_clause} \
             ORDER BY timestamp DESC \
             LIMIT $limit START $offset; \
             SELECT count() AS total FROM audit_log \
             WHERE {where_clause} GROUP ALL"
        );

        let mut query = self
            .db
            .query(query)
            .bind(("firm_id", firm_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(entity_type) = filter.entity_type {
            query = query.bind(("entity_type", entity_type));
        }
        if let Some(actor_id) = filter.actor_id {
            query = query.bind(("actor_id", actor_id.to_string()));
        }
        if let Some(action) = filter.action {
            query = query.bind(("action", action.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.bind(("from", from));
        }
        if let Some(to) = filter.to {
            query = query.bind(("to", to));
        }

        let mut result = query.await.map_err(DbError::from)?;

        let rows: Vec<AuditRowWithId> = result.take(0).map_err(DbError::from)?;
        let counts: Vec<CountRow> = result.take(1).map_err(DbError::from)?;
        let total = counts.first().map(|c| c.total).unwrap_or(0);

        let items = rows
            .into_iter()
            .map(AuditRowWithId::try_into_entry)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
