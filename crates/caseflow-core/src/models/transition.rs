//! Case transition history — one immutable row per accepted status
//! change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::case::CaseStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseTransitionRecord {
    pub id: Uuid,
    pub case_id: Uuid,
    pub firm_id: Uuid,
    pub from_status: CaseStatus,
    pub to_status: CaseStatus,
    pub actor_id: Uuid,
    pub actor_role: String,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}
