//! Error types for the Caseflow system.

use thiserror::Error;

use crate::models::case::CaseStatus;

#[derive(Debug, Error)]
pub enum CaseflowError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Tenant context missing or invalid")]
    TenantContext,

    #[error("Role not authorized: {reason}")]
    UnauthorizedRole { reason: String },

    #[error("Entity belongs to a different firm")]
    TenantMismatch,

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: CaseStatus, to: CaseStatus },

    #[error("Concurrent modification of {entity} with id {id}")]
    ConcurrentModification { entity: String, id: String },

    #[error("Vault PIN is incorrect")]
    VaultInvalidPin,

    #[error("Another vault session is already active for this case")]
    VaultSessionActive,

    #[error("Vault session has expired or is no longer active")]
    VaultSessionExpired,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl CaseflowError {
    /// Stable machine-readable error code, returned on the wire
    /// alongside the human-readable message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::TenantContext => "UNAUTHORIZED",
            Self::UnauthorizedRole { .. } => "UNAUTHORIZED_ROLE",
            Self::TenantMismatch => "TENANT_MISMATCH",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            Self::VaultInvalidPin => "VAULT_INVALID_PIN",
            Self::VaultSessionActive => "VAULT_SESSION_ACTIVE",
            Self::VaultSessionExpired => "VAULT_SESSION_EXPIRED",
            Self::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }
}

pub type CaseflowResult<T> = Result<T, CaseflowError>;
