//! Audit trail query endpoint.

use axum::Json;
use axum::extract::{Query, State};
use caseflow_core::context::TenantContext;
use caseflow_core::error::CaseflowError;
use caseflow_core::models::audit::{AuditAction, AuditLogEntry};
use caseflow_core::repository::{AuditLogFilter, Pagination};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::Connection;
use uuid::Uuid;

use crate::identity::Identity;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQueryParams {
    pub entity_type: Option<String>,
    pub actor_id: Option<Uuid>,
    pub action: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditPage {
    pub items: Vec<AuditLogEntry>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

pub async fn query<C: Connection>(
    State(state): State<AppState<C>>,
    Identity(identity): Identity,
    Query(params): Query<AuditQueryParams>,
) -> Result<Json<ApiResponse<AuditPage>>, ApiError> {
    let ctx = TenantContext::resolve(&identity)?;

    let action = params
        .action
        .as_deref()
        .map(|raw| {
            AuditAction::parse(raw).ok_or_else(|| {
                ApiError(CaseflowError::Validation {
                    message: format!("unknown audit action: {raw}"),
                })
            })
        })
        .transpose()?;

    let filter = AuditLogFilter {
        entity_type: params.entity_type,
        actor_id: params.actor_id,
        action,
        from: params.from,
        to: params.to,
    };

    let page = params.page.unwrap_or(0);
    let limit = params.limit.unwrap_or(Pagination::default().limit);
    let result = state
        .audit
        .query(
            &ctx,
            filter,
            Pagination {
                offset: page.saturating_mul(limit),
                limit,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(AuditPage {
        items: result.items,
        total: result.total,
        page,
        limit: result.limit,
    })))
}
