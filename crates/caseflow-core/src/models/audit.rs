//! Audit log domain model.
//!
//! Audit entries are append-only: never updated, never deleted, and
//! always scoped to a firm. Every mutating operation commits exactly
//! one entry atomically with the business state it describes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    StatusChange,
    Assignment,
    Transfer,
    Unlock,
    Lock,
    Access,
    Download,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::StatusChange => "StatusChange",
            Self::Assignment => "Assignment",
            Self::Transfer => "Transfer",
            Self::Unlock => "Unlock",
            Self::Lock => "Lock",
            Self::Access => "Access",
            Self::Download => "Download",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Create" => Some(Self::Create),
            "Update" => Some(Self::Update),
            "Delete" => Some(Self::Delete),
            "StatusChange" => Some(Self::StatusChange),
            "Assignment" => Some(Self::Assignment),
            "Transfer" => Some(Self::Transfer),
            "Unlock" => Some(Self::Unlock),
            "Lock" => Some(Self::Lock),
            "Access" => Some(Self::Access),
            "Download" => Some(Self::Download),
            _ => None,
        }
    }
}

/// Whether the recorded attempt was allowed. Denied attempts (for
/// example a wrong vault PIN) are audited too, to support abuse
/// detection downstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditOutcome {
    Success,
    Denied,
}

impl AuditOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Denied => "Denied",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Success" => Some(Self::Success),
            "Denied" => Some(Self::Denied),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub firm_id: Uuid,
    /// Kind of entity the action targeted, e.g. `case`, `vault_session`.
    pub entity_type: String,
    pub entity_id: Uuid,
    pub action: AuditAction,
    pub actor_id: Uuid,
    pub actor_role: String,
    pub outcome: AuditOutcome,
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateAuditLogEntry {
    pub firm_id: Uuid,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub action: AuditAction,
    pub actor_id: Uuid,
    pub actor_role: String,
    pub outcome: AuditOutcome,
    pub metadata: serde_json::Value,
}
