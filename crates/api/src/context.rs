use roombook_auth::{Principal, Role};
use roombook_core::UserId;

/// Principal context for a request (authenticated identity + roles).
///
/// Inserted by the gate middleware on admission; only present on routes that
/// declare at least one requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn username(&self) -> &str {
        &self.principal.username
    }

    pub fn is_admin(&self) -> bool {
        self.principal.is_admin
    }

    pub fn roles(&self) -> &[Role] {
        &self.principal.roles
    }
}
