//! Identity extraction from upstream auth headers.
//!
//! Authentication itself lives in an upstream identity layer; it
//! attaches the caller's identity as headers. This extractor only
//! parses them — `TenantContext::resolve` still runs per request in
//! each handler.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use caseflow_core::context::{RequestIdentity, UserType};
use caseflow_core::error::CaseflowError;
use caseflow_core::models::employee::StaffRole;
use uuid::Uuid;

use crate::response::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const FIRM_ID_HEADER: &str = "x-firm-id";
pub const USER_TYPE_HEADER: &str = "x-user-type";
pub const STAFF_ROLE_HEADER: &str = "x-staff-role";

/// The authenticated caller, parsed from identity headers.
#[derive(Debug, Clone)]
pub struct Identity(pub RequestIdentity);

fn header<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn unauthorized() -> ApiError {
    ApiError(CaseflowError::TenantContext)
}

fn parse_identity(headers: &HeaderMap) -> Result<RequestIdentity, ApiError> {
    let user_id = header(headers, USER_ID_HEADER)
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or_else(unauthorized)?;

    let user_type = header(headers, USER_TYPE_HEADER)
        .and_then(UserType::parse)
        .ok_or_else(unauthorized)?;

    // Firm and role headers are optional, but when present they must
    // parse; a garbled identity is rejected, not downgraded.
    let firm_id = match header(headers, FIRM_ID_HEADER) {
        Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| unauthorized())?),
        None => None,
    };
    let staff_role = match header(headers, STAFF_ROLE_HEADER) {
        Some(raw) => Some(StaffRole::parse(raw).ok_or_else(unauthorized)?),
        None => None,
    };

    Ok(RequestIdentity {
        user_id,
        firm_id,
        user_type,
        staff_role,
    })
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_identity(&parts.headers).map(Identity)
    }
}
