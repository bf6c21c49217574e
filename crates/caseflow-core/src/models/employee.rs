//! Employee directory entry.
//!
//! The staff directory is owned by an external system; this is the
//! slice Caseflow needs to validate transfer targets and attribute
//! actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff capability level within a firm.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StaffRole {
    Admin,
    Manager,
    Agent,
}

impl StaffRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Agent => "Agent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Admin" => Some(Self::Admin),
            "Manager" => Some(Self::Manager),
            "Agent" => Some(Self::Agent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Active" => Some(Self::Active),
            "Inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub firm_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub role: StaffRole,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmployee {
    pub firm_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub role: StaffRole,
}
