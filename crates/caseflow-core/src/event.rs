//! Domain events emitted after a successful commit.
//!
//! Notification dispatch (email, push, in-app) lives outside this
//! system; the contract here is fire-and-forget after the business
//! state and audit entry are durable. A failing sink must never fail
//! the operation that produced the event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::case::CaseStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub event_name: String,
    pub firm_id: Uuid,
    pub actor_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl DomainEvent {
    pub fn case_status_changed(
        firm_id: Uuid,
        actor_id: Uuid,
        case_id: Uuid,
        from: CaseStatus,
        to: CaseStatus,
    ) -> Self {
        Self {
            event_name: "case.status_changed".into(),
            firm_id,
            actor_id,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "case_id": case_id,
                "from": from,
                "to": to,
            }),
        }
    }

    pub fn case_transferred(
        firm_id: Uuid,
        actor_id: Uuid,
        case_id: Uuid,
        from_employee_id: Option<Uuid>,
        to_employee_id: Uuid,
    ) -> Self {
        Self {
            event_name: "case.transferred".into(),
            firm_id,
            actor_id,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "case_id": case_id,
                "from_employee_id": from_employee_id,
                "to_employee_id": to_employee_id,
            }),
        }
    }
}

/// Outbound sink for domain events, called after commit.
pub trait DomainEventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);
}

/// Default sink: structured log line per event. Deployments wire a
/// real fan-out (queue, webhook dispatcher) behind the same trait.
#[derive(Debug, Clone, Default)]
pub struct TracingEventSink;

impl DomainEventSink for TracingEventSink {
    fn emit(&self, event: DomainEvent) {
        tracing::info!(
            event_name = %event.event_name,
            firm_id = %event.firm_id,
            actor_id = %event.actor_id,
            "domain event"
        );
    }
}
