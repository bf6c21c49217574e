//! SurrealDB implementation of [`VaultSessionRepository`].
//!
//! Exclusivity is enforced inside a transaction: the live-lease check
//! and the session insert observe a consistent snapshot, so two
//! concurrent unlocks for the same case cannot both succeed. A lease
//! whose heartbeat is older than the caller-supplied cutoff counts as
//! dead whether or not it has been marked `Expired` yet.

use caseflow_core::error::CaseflowResult;
use caseflow_core::models::audit::CreateAuditLogEntry;
use caseflow_core::models::vault::{CreateVaultSession, VaultSession, VaultSessionState};
use caseflow_core::repository::VaultSessionRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, check_tx_response, classify_tx_error};
use crate::repository::audit::{AUDIT_SET, bind_audit};

#[derive(Debug, SurrealValue)]
struct VaultSessionRow {
    firm_id: String,
    case_id: String,
    holder_id: String,
    state: String,
    created_at: DateTime<Utc>,
    last_heartbeat_at: DateTime<Utc>,
}

impl VaultSessionRow {
    fn into_session(self, id: Uuid) -> Result<VaultSession, DbError> {
        let firm_id = Uuid::parse_str(&self.firm_id)
            .map_err(|e| DbError::Migration(format!("invalid firm UUID: {e}")))?;
        let case_id = Uuid::parse_str(&self.case_id)
            .map_err(|e| DbError::Migration(format!("invalid case UUID: {e}")))?;
        let holder_id = Uuid::parse_str(&self.holder_id)
            .map_err(|e| DbError::Migration(format!("invalid holder UUID: {e}")))?;
        let state = VaultSessionState::parse(&self.state)
            .ok_or_else(|| DbError::Migration(format!("invalid session state: {}", self.state)))?;
        Ok(VaultSession {
            id,
            firm_id,
            case_id,
            holder_id,
            state,
            created_at: self.created_at,
            last_heartbeat_at: self.last_heartbeat_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct VaultSessionRowWithId {
    record_id: String,
    firm_id: String,
    case_id: String,
    holder_id: String,
    state: String,
    created_at: DateTime<Utc>,
    last_heartbeat_at: DateTime<Utc>,
}

impl VaultSessionRowWithId {
    fn try_into_session(self) -> Result<VaultSession, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        VaultSessionRow {
            firm_id: self.firm_id,
            case_id: self.case_id,
            holder_id: self.holder_id,
            state: self.state,
            created_at: self.created_at,
            last_heartbeat_at: self.last_heartbeat_at,
        }
        .into_session(id)
    }
}

/// SurrealDB implementation of the vault session repository.
#[derive(Clone)]
pub struct SurrealVaultSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealVaultSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> VaultSessionRepository for SurrealVaultSessionRepository<C> {
    async fn create_exclusive(
        &self,
        input: CreateVaultSession,
        cutoff: DateTime<Utc>,
        audit: CreateAuditLogEntry,
    ) -> CaseflowResult<VaultSession> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let query = format!(
            "BEGIN TRANSACTION; \
             LET $active = (SELECT * FROM vault_session \
                 WHERE case_id = $case_id \
                   AND state = 'Unlocked' \
                   AND last_heartbeat_at > $cutoff); \
             IF array::len($active) > 0 {{ THROW 'lease_held' }}; \
             CREATE type::record('vault_session', $id) SET \
                 firm_id = $firm_id, case_id = $case_id, \
                 holder_id = $holder_id, state = 'Unlocked', \
                 last_heartbeat_at = time::now(); \
             CREATE type::record('audit_log', $audit_id) SET {AUDIT_SET}; \
             COMMIT TRANSACTION;"
        );

        let result = bind_audit(self.db.query(query), audit)
            .bind(("id", id_str.clone()))
            .bind(("firm_id", input.firm_id.to_string()))
            .bind(("case_id", input.case_id.to_string()))
            .bind(("holder_id", input.holder_id.to_string()))
            .bind(("cutoff", cutoff))
            .await
            .map_err(|e| classify_tx_error("vault_session", &id_str, e))?;

        check_tx_response("vault_session", &id_str, result)?;

        self.get_by_id(input.firm_id, id).await
    }

    async fn get_by_id(&self, firm_id: Uuid, id: Uuid) -> CaseflowResult<VaultSession> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('vault_session', $id) \
                 WHERE firm_id = $firm_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("firm_id", firm_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<VaultSessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "vault_session".into(),
            id: id_str,
        })?;

        Ok(row.into_session(id)?)
    }

    async fn touch(
        &self,
        firm_id: Uuid,
        id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> CaseflowResult<VaultSession> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('vault_session', $id) \
                 SET last_heartbeat_at = time::now() \
                 WHERE firm_id = $firm_id \
                   AND state = 'Unlocked' \
                   AND last_heartbeat_at > $cutoff",
            )
            .bind(("id", id_str.clone()))
            .bind(("firm_id", firm_id.to_string()))
            .bind(("cutoff", cutoff))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<VaultSessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or(DbError::NotActive)?;

        Ok(row.into_session(id)?)
    }

    async fn lock_active(
        &self,
        firm_id: Uuid,
        id: Uuid,
        cutoff: DateTime<Utc>,
        audit: CreateAuditLogEntry,
    ) -> CaseflowResult<()> {
        let id_str = id.to_string();

        let query = format!(
            "BEGIN TRANSACTION; \
             LET $rows = (UPDATE type::record('vault_session', $id) \
                 SET state = 'Locked' \
                 WHERE firm_id = $firm_id \
                   AND state = 'Unlocked' \
                   AND last_heartbeat_at > $cutoff); \
             IF array::len($rows) == 0 {{ THROW 'not_active' }}; \
             CREATE type::record('audit_log', $audit_id) SET {AUDIT_SET}; \
             COMMIT TRANSACTION;"
        );

        let result = bind_audit(self.db.query(query), audit)
            .bind(("id", id_str.clone()))
            .bind(("firm_id", firm_id.to_string()))
            .bind(("cutoff", cutoff))
            .await
            .map_err(|e| classify_tx_error("vault_session", &id_str, e))?;

        check_tx_response("vault_session", &id_str, result)?;

        Ok(())
    }

    async fn mark_expired(&self, firm_id: Uuid, id: Uuid) -> CaseflowResult<()> {
        self.db
            .query(
                "UPDATE type::record('vault_session', $id) \
                 SET state = 'Expired' \
                 WHERE firm_id = $firm_id AND state = 'Unlocked'",
            )
            .bind(("id", id.to_string()))
            .bind(("firm_id", firm_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn expire_stale(&self, firm_id: Uuid, cutoff: DateTime<Utc>) -> CaseflowResult<u64> {
        let mut result = self
            .db
            .query(
                "UPDATE vault_session SET state = 'Expired' \
                 WHERE firm_id = $firm_id \
                   AND state = 'Unlocked' \
                   AND last_heartbeat_at <= $cutoff",
            )
            .bind(("firm_id", firm_id.to_string()))
            .bind(("cutoff", cutoff))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<VaultSessionRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }

    async fn active_for_case(
        &self,
        firm_id: Uuid,
        case_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> CaseflowResult<Option<VaultSession>> {
        let mut result = self
            .db
            .query(
                "SELECT record::id(id) AS record_id, * FROM vault_session \
                 WHERE firm_id = $firm_id \
                   AND case_id = $case_id \
                   AND state = 'Unlocked' \
                   AND last_heartbeat_at > $cutoff",
            )
            .bind(("firm_id", firm_id.to_string()))
            .bind(("case_id", case_id.to_string()))
            .bind(("cutoff", cutoff))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<VaultSessionRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(VaultSessionRowWithId::try_into_session)
            .transpose()?)
    }
}
