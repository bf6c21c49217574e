//! Database-specific error types and conversions.

use caseflow_core::error::CaseflowError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Version conflict on {entity} with id {id}")]
    VersionConflict { entity: String, id: String },

    #[error("An unlocked vault session already exists for this case")]
    LeaseHeld,

    #[error("Vault session is no longer active")]
    NotActive,
}

impl From<DbError> for CaseflowError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CaseflowError::NotFound { entity, id },
            DbError::VersionConflict { entity, id } => {
                CaseflowError::ConcurrentModification { entity, id }
            }
            DbError::LeaseHeld => CaseflowError::VaultSessionActive,
            DbError::NotActive => CaseflowError::VaultSessionExpired,
            other => CaseflowError::StorageUnavailable(other.to_string()),
        }
    }
}

/// Sentinel strings raised with `THROW` inside storage transactions to
/// abort on business conflicts. They come back embedded in the
/// SurrealDB error message.
pub(crate) const THROW_STALE_VERSION: &str = "stale_version";
pub(crate) const THROW_LEASE_HELD: &str = "lease_held";
pub(crate) const THROW_NOT_ACTIVE: &str = "not_active";

/// Check a transaction response, recognising the THROW sentinels.
///
/// When a transaction aborts, the sentinel message lands on the THROW
/// statement's slot while earlier statements report a generic
/// "failed transaction" error, so every statement error must be
/// scanned rather than just the first.
pub(crate) fn check_tx_response(
    entity: &str,
    id: &str,
    mut response: surrealdb::IndexedResults,
) -> Result<surrealdb::IndexedResults, DbError> {
    let errors = response.take_errors();
    if errors.is_empty() {
        return Ok(response);
    }
    let mut ordered: Vec<_> = errors.into_iter().collect();
    ordered.sort_by_key(|(index, _)| *index);
    for (_, err) in &ordered {
        let msg = err.to_string();
        if msg.contains(THROW_STALE_VERSION) {
            return Err(DbError::VersionConflict {
                entity: entity.into(),
                id: id.into(),
            });
        } else if msg.contains(THROW_LEASE_HELD) {
            return Err(DbError::LeaseHeld);
        } else if msg.contains(THROW_NOT_ACTIVE) {
            return Err(DbError::NotActive);
        }
    }
    let (_, first) = ordered.remove(0);
    Err(DbError::Surreal(first))
}

/// Map a transaction error, recognising the THROW sentinels.
pub(crate) fn classify_tx_error(entity: &str, id: &str, err: surrealdb::Error) -> DbError {
    let msg = err.to_string();
    if msg.contains(THROW_STALE_VERSION) {
        DbError::VersionConflict {
            entity: entity.into(),
            id: id.into(),
        }
    } else if msg.contains(THROW_LEASE_HELD) {
        DbError::LeaseHeld
    } else if msg.contains(THROW_NOT_ACTIVE) {
        DbError::NotActive
    } else {
        DbError::Surreal(err)
    }
}
