//! Per-request tenant context.
//!
//! A [`TenantContext`] is created once at request entry from the
//! authenticated caller's identity and passed by reference to every
//! component entry point. It is immutable, never cached, and never
//! shared across requests; an identity without a firm association
//! resolves to an error, not to "no tenant filter".

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CaseflowError, CaseflowResult};
use crate::models::employee::StaffRole;

/// What kind of caller the identity layer authenticated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserType {
    /// Firm staff — may mutate cases.
    Staff,
    /// Client-organization user — read-only on cases.
    Client,
}

impl UserType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "staff" | "Staff" => Some(Self::Staff),
            "client" | "Client" => Some(Self::Client),
            _ => None,
        }
    }
}

/// The authenticated identity attached to an inbound request by the
/// upstream identity layer.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    pub user_id: Uuid,
    /// Absent for identities with no firm association (e.g. platform
    /// operators); such identities cannot execute tenant-scoped work.
    pub firm_id: Option<Uuid>,
    pub user_type: UserType,
    pub staff_role: Option<StaffRole>,
}

/// Ambient tenant identity for one request. Fields are private so the
/// context cannot be mutated or partially constructed after resolve.
#[derive(Debug, Clone)]
pub struct TenantContext {
    firm_id: Uuid,
    actor_id: Uuid,
    user_type: UserType,
    staff_role: Option<StaffRole>,
}

impl TenantContext {
    /// Resolve the caller's firm from their authenticated identity.
    ///
    /// Fails with [`CaseflowError::TenantContext`] when the identity
    /// carries no firm association.
    pub fn resolve(identity: &RequestIdentity) -> CaseflowResult<Self> {
        let firm_id = identity.firm_id.ok_or(CaseflowError::TenantContext)?;
        Ok(Self {
            firm_id,
            actor_id: identity.user_id,
            user_type: identity.user_type,
            staff_role: identity.staff_role,
        })
    }

    pub fn firm_id(&self) -> Uuid {
        self.firm_id
    }

    pub fn actor_id(&self) -> Uuid {
        self.actor_id
    }

    pub fn is_staff(&self) -> bool {
        self.user_type == UserType::Staff
    }

    /// Require staff capability; client-type callers may only read.
    pub fn require_staff(&self) -> CaseflowResult<()> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(CaseflowError::UnauthorizedRole {
                reason: "client users cannot mutate cases".into(),
            })
        }
    }

    /// Role label recorded on audit rows and history records.
    pub fn actor_role(&self) -> &'static str {
        match (self.user_type, self.staff_role) {
            (UserType::Client, _) => "Client",
            (UserType::Staff, Some(role)) => role.as_str(),
            (UserType::Staff, None) => "Staff",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(firm: Option<Uuid>) -> RequestIdentity {
        RequestIdentity {
            user_id: Uuid::new_v4(),
            firm_id: firm,
            user_type: UserType::Staff,
            staff_role: Some(StaffRole::Manager),
        }
    }

    #[test]
    fn resolve_requires_firm_association() {
        let err = TenantContext::resolve(&identity(None)).unwrap_err();
        assert!(matches!(err, CaseflowError::TenantContext));

        let firm = Uuid::new_v4();
        let ctx = TenantContext::resolve(&identity(Some(firm))).unwrap();
        assert_eq!(ctx.firm_id(), firm);
        assert_eq!(ctx.actor_role(), "Manager");
    }

    #[test]
    fn client_callers_fail_staff_requirement() {
        let ctx = TenantContext::resolve(&RequestIdentity {
            user_id: Uuid::new_v4(),
            firm_id: Some(Uuid::new_v4()),
            user_type: UserType::Client,
            staff_role: None,
        })
        .unwrap();

        assert!(matches!(
            ctx.require_staff(),
            Err(CaseflowError::UnauthorizedRole { .. })
        ));
        assert_eq!(ctx.actor_role(), "Client");
    }
}
