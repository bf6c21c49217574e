//! Firm domain model.
//!
//! The firm is the top-level isolation boundary: every other entity
//! carries a `firm_id` and is invisible outside its firm's request
//! context. Firm management itself lives in an external system; only
//! creation and lookup exist here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Firm {
    pub id: Uuid,
    pub name: String,
    /// URL-safe unique identifier (e.g. `acme-compliance`).
    pub slug: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFirm {
    pub name: String,
    pub slug: String,
    pub metadata: Option<serde_json::Value>,
}
