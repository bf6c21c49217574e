//! Vault endpoints: unlock, heartbeat, lock.
//!
//! Heartbeat and lock identify the session via the `x-vault-session`
//! header rather than the body, so beat requests stay body-free.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use caseflow_core::context::TenantContext;
use caseflow_core::error::CaseflowError;
use serde::{Deserialize, Serialize};
use surrealdb::Connection;
use uuid::Uuid;

use crate::identity::Identity;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

pub const VAULT_SESSION_HEADER: &str = "x-vault-session";

fn session_id(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    headers
        .get(VAULT_SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or_else(|| {
            ApiError(CaseflowError::Validation {
                message: format!("missing or invalid {VAULT_SESSION_HEADER} header"),
            })
        })
}

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub pin: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockResponse {
    pub session_id: Uuid,
}

pub async fn unlock<C: Connection>(
    State(state): State<AppState<C>>,
    Identity(identity): Identity,
    Path(case_id): Path<Uuid>,
    Json(body): Json<UnlockRequest>,
) -> Result<Json<ApiResponse<UnlockResponse>>, ApiError> {
    let ctx = TenantContext::resolve(&identity)?;
    let session = state.vault.unlock(&ctx, case_id, &body.pin).await?;
    Ok(Json(ApiResponse::ok(UnlockResponse {
        session_id: session.id,
    })))
}

pub async fn heartbeat<C: Connection>(
    State(state): State<AppState<C>>,
    Identity(identity): Identity,
    Path(case_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let ctx = TenantContext::resolve(&identity)?;
    let session_id = session_id(&headers)?;
    state.vault.heartbeat(&ctx, case_id, session_id).await?;
    Ok(Json(ApiResponse::message("heartbeat accepted")))
}

pub async fn lock<C: Connection>(
    State(state): State<AppState<C>>,
    Identity(identity): Identity,
    Path(case_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let ctx = TenantContext::resolve(&identity)?;
    let session_id = session_id(&headers)?;
    state.vault.lock(&ctx, case_id, session_id).await?;
    Ok(Json(ApiResponse::message("vault locked")))
}
