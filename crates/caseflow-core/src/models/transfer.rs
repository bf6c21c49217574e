//! Case transfer history — one immutable row per accepted
//! reassignment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseTransferRecord {
    pub id: Uuid,
    pub case_id: Uuid,
    pub firm_id: Uuid,
    /// `None` when the case was previously unassigned.
    pub from_employee_id: Option<Uuid>,
    pub to_employee_id: Uuid,
    /// Mandatory justification for the reassignment.
    pub reason: String,
    pub actor_id: Uuid,
    pub timestamp: DateTime<Utc>,
}
