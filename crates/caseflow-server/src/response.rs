//! Response envelope and error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use caseflow_core::error::CaseflowError;
use serde::Serialize;

/// Uniform response envelope. `error` carries the stable machine
/// code; `message` the human-readable detail.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }
}

/// Wrapper turning a [`CaseflowError`] into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub CaseflowError);

impl From<CaseflowError> for ApiError {
    fn from(err: CaseflowError) -> Self {
        Self(err)
    }
}

fn status_for(err: &CaseflowError) -> StatusCode {
    match err {
        CaseflowError::Validation { .. } => StatusCode::BAD_REQUEST,
        CaseflowError::TenantContext => StatusCode::UNAUTHORIZED,
        CaseflowError::UnauthorizedRole { .. }
        | CaseflowError::TenantMismatch
        | CaseflowError::VaultInvalidPin => StatusCode::FORBIDDEN,
        CaseflowError::NotFound { .. } => StatusCode::NOT_FOUND,
        CaseflowError::InvalidTransition { .. }
        | CaseflowError::ConcurrentModification { .. }
        | CaseflowError::VaultSessionActive => StatusCode::CONFLICT,
        CaseflowError::VaultSessionExpired => StatusCode::GONE,
        CaseflowError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(code = self.0.code(), error = %self.0, "request failed");
        }
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            message: Some(self.0.to_string()),
            error: Some(self.0.code().to_string()),
        };
        (status, Json(body)).into_response()
    }
}
