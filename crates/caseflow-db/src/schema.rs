//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. History and audit tables are
//! append-only via table permissions.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Firms (global scope — the tenant isolation boundary)
-- =======================================================================
DEFINE TABLE firm SCHEMAFULL;
DEFINE FIELD name ON TABLE firm TYPE string;
DEFINE FIELD slug ON TABLE firm TYPE string;
DEFINE FIELD metadata ON TABLE firm TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE firm TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_firm_slug ON TABLE firm COLUMNS slug UNIQUE;

-- =======================================================================
-- Employees (firm scope — staff directory slice)
-- =======================================================================
DEFINE TABLE employee SCHEMAFULL;
DEFINE FIELD firm_id ON TABLE employee TYPE string;
DEFINE FIELD display_name ON TABLE employee TYPE string;
DEFINE FIELD email ON TABLE employee TYPE string;
DEFINE FIELD role ON TABLE employee TYPE string \
    ASSERT $value IN ['Admin', 'Manager', 'Agent'];
DEFINE FIELD status ON TABLE employee TYPE string \
    ASSERT $value IN ['Active', 'Inactive'];
DEFINE FIELD created_at ON TABLE employee TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE employee TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_employee_firm_email ON TABLE employee \
    COLUMNS firm_id, email UNIQUE;

-- =======================================================================
-- Cases (firm scope)
-- =======================================================================
DEFINE TABLE compliance_case SCHEMAFULL;
DEFINE FIELD firm_id ON TABLE compliance_case TYPE string;
DEFINE FIELD organization_id ON TABLE compliance_case TYPE string;
DEFINE FIELD service_id ON TABLE compliance_case TYPE string;
DEFINE FIELD case_number ON TABLE compliance_case TYPE string;
DEFINE FIELD status ON TABLE compliance_case TYPE string \
    ASSERT $value IN ['Draft', 'Submitted', 'UnderReview', \
    'DocsRequired', 'Processing', 'Completed', 'Rejected'];
DEFINE FIELD priority ON TABLE compliance_case TYPE string \
    ASSERT $value IN ['Low', 'Normal', 'High', 'Urgent'];
DEFINE FIELD assignee_id ON TABLE compliance_case TYPE option<string>;
DEFINE FIELD flags ON TABLE compliance_case TYPE array DEFAULT [];
DEFINE FIELD flags.* ON TABLE compliance_case TYPE string;
DEFINE FIELD vault_pin_hash ON TABLE compliance_case TYPE string;
DEFINE FIELD version ON TABLE compliance_case TYPE int;
DEFINE FIELD created_at ON TABLE compliance_case TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE compliance_case TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_case_firm_number ON TABLE compliance_case \
    COLUMNS firm_id, case_number UNIQUE;
DEFINE INDEX idx_case_firm ON TABLE compliance_case COLUMNS firm_id;

-- =======================================================================
-- Case transition history (firm scope, append-only)
-- =======================================================================
DEFINE TABLE case_transition SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD case_id ON TABLE case_transition TYPE string;
DEFINE FIELD firm_id ON TABLE case_transition TYPE string;
DEFINE FIELD from_status ON TABLE case_transition TYPE string \
    ASSERT $value IN ['Draft', 'Submitted', 'UnderReview', \
    'DocsRequired', 'Processing', 'Completed', 'Rejected'];
DEFINE FIELD to_status ON TABLE case_transition TYPE string \
    ASSERT $value IN ['Draft', 'Submitted', 'UnderReview', \
    'DocsRequired', 'Processing', 'Completed', 'Rejected'];
DEFINE FIELD actor_id ON TABLE case_transition TYPE string;
DEFINE FIELD actor_role ON TABLE case_transition TYPE string;
DEFINE FIELD reason ON TABLE case_transition TYPE option<string>;
DEFINE FIELD timestamp ON TABLE case_transition TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_transition_case ON TABLE case_transition \
    COLUMNS firm_id, case_id;

-- =======================================================================
-- Case transfer history (firm scope, append-only)
-- =======================================================================
DEFINE TABLE case_transfer SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD case_id ON TABLE case_transfer TYPE string;
DEFINE FIELD firm_id ON TABLE case_transfer TYPE string;
DEFINE FIELD from_employee_id ON TABLE case_transfer \
    TYPE option<string>;
DEFINE FIELD to_employee_id ON TABLE case_transfer TYPE string;
DEFINE FIELD reason ON TABLE case_transfer TYPE string;
DEFINE FIELD actor_id ON TABLE case_transfer TYPE string;
DEFINE FIELD timestamp ON TABLE case_transfer TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_transfer_case ON TABLE case_transfer \
    COLUMNS firm_id, case_id;

-- =======================================================================
-- Vault sessions (firm scope, exclusive lease per case)
-- =======================================================================
DEFINE TABLE vault_session SCHEMAFULL;
DEFINE FIELD firm_id ON TABLE vault_session TYPE string;
DEFINE FIELD case_id ON TABLE vault_session TYPE string;
DEFINE FIELD holder_id ON TABLE vault_session TYPE string;
DEFINE FIELD state ON TABLE vault_session TYPE string \
    ASSERT $value IN ['Unlocked', 'Locked', 'Expired'];
DEFINE FIELD created_at ON TABLE vault_session TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD last_heartbeat_at ON TABLE vault_session TYPE datetime;
DEFINE INDEX idx_vault_case_state ON TABLE vault_session \
    COLUMNS case_id, state;

-- =======================================================================
-- Audit log (firm scope, append-only)
-- =======================================================================
DEFINE TABLE audit_log SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD firm_id ON TABLE audit_log TYPE string;
DEFINE FIELD entity_type ON TABLE audit_log TYPE string;
DEFINE FIELD entity_id ON TABLE audit_log TYPE string;
DEFINE FIELD action ON TABLE audit_log TYPE string \
    ASSERT $value IN ['Create', 'Update', 'Delete', 'StatusChange', \
    'Assignment', 'Transfer', 'Unlock', 'Lock', 'Access', 'Download'];
DEFINE FIELD actor_id ON TABLE audit_log TYPE string;
DEFINE FIELD actor_role ON TABLE audit_log TYPE string;
DEFINE FIELD outcome ON TABLE audit_log TYPE string \
    ASSERT $value IN ['Success', 'Denied'];
DEFINE FIELD metadata ON TABLE audit_log TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD timestamp ON TABLE audit_log TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_audit_firm_time ON TABLE audit_log \
    COLUMNS firm_id, timestamp;
DEFINE INDEX idx_audit_firm_actor ON TABLE audit_log \
    COLUMNS firm_id, actor_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
