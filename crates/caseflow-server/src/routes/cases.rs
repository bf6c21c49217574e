//! Case endpoints: status transition, transfer, history.

use axum::Json;
use axum::extract::{Path, State};
use caseflow_core::context::TenantContext;
use caseflow_core::models::case::{Case, CaseStatus};
use caseflow_engine::CaseHistoryEntry;
use serde::Deserialize;
use surrealdb::Connection;
use uuid::Uuid;

use crate::identity::Identity;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: CaseStatus,
    pub reason: Option<String>,
    pub expected_version: u64,
}

pub async fn update_status<C: Connection>(
    State(state): State<AppState<C>>,
    Identity(identity): Identity,
    Path(case_id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Case>>, ApiError> {
    let ctx = TenantContext::resolve(&identity)?;
    let case = state
        .lifecycle
        .transition(&ctx, case_id, body.status, body.reason, body.expected_version)
        .await?;
    Ok(Json(ApiResponse::ok(case)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub to_employee_id: Uuid,
    pub reason: String,
    pub expected_version: u64,
}

pub async fn transfer<C: Connection>(
    State(state): State<AppState<C>>,
    Identity(identity): Identity,
    Path(case_id): Path<Uuid>,
    Json(body): Json<TransferRequest>,
) -> Result<Json<ApiResponse<Case>>, ApiError> {
    let ctx = TenantContext::resolve(&identity)?;
    let case = state
        .transfer
        .transfer(
            &ctx,
            case_id,
            body.to_employee_id,
            body.reason,
            body.expected_version,
        )
        .await?;
    Ok(Json(ApiResponse::ok(case)))
}

pub async fn history<C: Connection>(
    State(state): State<AppState<C>>,
    Identity(identity): Identity,
    Path(case_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CaseHistoryEntry>>>, ApiError> {
    let ctx = TenantContext::resolve(&identity)?;
    let entries = state.lifecycle.history(&ctx, case_id).await?;
    Ok(Json(ApiResponse::ok(entries)))
}
