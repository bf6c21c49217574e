//! Case domain model and the fixed status state machine.
//!
//! A case is a unit of compliance work owned by a firm. Its status only
//! ever moves along an edge of the compile-time transition table below,
//! and its `version` counter strictly increases on every mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Case lifecycle status.
///
/// `Draft` is the initial status; `Completed` and `Rejected` are
/// terminal and accept no further transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CaseStatus {
    Draft,
    Submitted,
    UnderReview,
    DocsRequired,
    Processing,
    Completed,
    Rejected,
}

impl CaseStatus {
    /// Direct successors of this status in the fixed transition table.
    pub fn allowed_targets(self) -> &'static [CaseStatus] {
        use CaseStatus::*;
        match self {
            Draft => &[Submitted],
            Submitted => &[UnderReview, Rejected],
            UnderReview => &[DocsRequired, Processing, Rejected],
            DocsRequired => &[UnderReview],
            Processing => &[Completed, DocsRequired],
            Completed | Rejected => &[],
        }
    }

    /// Whether `target` is a direct successor of this status.
    pub fn can_transition_to(self, target: CaseStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Terminal statuses have no outgoing edges.
    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// All statuses, for exhaustive table checks.
    pub fn all() -> &'static [CaseStatus] {
        use CaseStatus::*;
        &[
            Draft,
            Submitted,
            UnderReview,
            DocsRequired,
            Processing,
            Completed,
            Rejected,
        ]
    }

    /// String form stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::UnderReview => "UnderReview",
            Self::DocsRequired => "DocsRequired",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Rejected => "Rejected",
        }
    }

    /// Parse the database string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Draft" => Some(Self::Draft),
            "Submitted" => Some(Self::Submitted),
            "UnderReview" => Some(Self::UnderReview),
            "DocsRequired" => Some(Self::DocsRequired),
            "Processing" => Some(Self::Processing),
            "Completed" => Some(Self::Completed),
            "Rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Case priority, set at creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CasePriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl CasePriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(Self::Low),
            "Normal" => Some(Self::Normal),
            "High" => Some(Self::High),
            "Urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// A unit of compliance work.
///
/// `firm_id` never changes after creation. `version` backs the
/// optimistic-concurrency check on every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: Uuid,
    /// The firm that owns this case. Immutable.
    pub firm_id: Uuid,
    /// The client organization the case concerns.
    pub organization_id: Uuid,
    /// The service being delivered.
    pub service_id: Uuid,
    /// Human-readable case number, unique within the firm.
    pub case_number: String,
    pub status: CaseStatus,
    pub priority: CasePriority,
    /// Responsible staff member, if assigned.
    pub assignee_id: Option<Uuid>,
    pub flags: Vec<String>,
    /// Hash of the vault PIN credential. Never serialized outward.
    #[serde(skip_serializing)]
    pub vault_pin_hash: String,
    /// Strictly increasing on every mutation.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new case. New cases start in `Draft`
/// with version 1. The raw vault PIN is hashed by the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCase {
    pub firm_id: Uuid,
    pub organization_id: Uuid,
    pub service_id: Uuid,
    pub case_number: String,
    pub priority: CasePriority,
    pub assignee_id: Option<Uuid>,
    pub flags: Vec<String>,
    pub vault_pin: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_matches_allowed_edges() {
        use CaseStatus::*;
        let edges = [
            (Draft, Submitted),
            (Submitted, UnderReview),
            (Submitted, Rejected),
            (UnderReview, DocsRequired),
            (UnderReview, Processing),
            (UnderReview, Rejected),
            (DocsRequired, UnderReview),
            (Processing, Completed),
            (Processing, DocsRequired),
        ];

        for &from in CaseStatus::all() {
            for &to in CaseStatus::all() {
                let expected = edges.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "edge {from:?} -> {to:?}"
                );
            }
        }
    }

    #[test]
    fn completed_and_rejected_are_terminal() {
        assert!(CaseStatus::Completed.is_terminal());
        assert!(CaseStatus::Rejected.is_terminal());
        for &s in CaseStatus::all() {
            if s != CaseStatus::Completed && s != CaseStatus::Rejected {
                assert!(!s.is_terminal(), "{s:?} should not be terminal");
            }
        }
    }

    #[test]
    fn status_string_round_trip() {
        for &s in CaseStatus::all() {
            assert_eq!(CaseStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(CaseStatus::parse("Unknown"), None);
    }
}
