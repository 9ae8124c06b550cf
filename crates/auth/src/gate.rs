//! Per-request access decision.
//!
//! Runs the verifier, the resolver and the evaluators for one request and
//! turns the outcome into a [`Decision`]. No state is shared between requests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::authorize::{has_any_role, has_permission};
use crate::{
    AccessError, FreezePolicy, JwtValidator, Principal, PrincipalResolver, Requirement,
    Requirements, UserStore,
};

pub const INSUFFICIENT_PERMISSION: &str = "insufficient permission";
pub const INSUFFICIENT_ROLE: &str = "insufficient role";
pub const NO_ROLE_CONTEXT: &str = "not authenticated with role context";

/// Terminal outcome of the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// `None` when the operation is public and no principal was resolved.
    Admitted(Option<Principal>),
    Denied(AccessError),
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted(_))
    }

    pub fn into_result(self) -> Result<Option<Principal>, AccessError> {
        match self {
            Self::Admitted(principal) => Ok(principal),
            Self::Denied(err) => Err(err),
        }
    }
}

#[derive(Clone)]
pub struct AccessGate {
    validator: Arc<dyn JwtValidator>,
    resolver: PrincipalResolver,
    store: Arc<dyn UserStore>,
}

impl AccessGate {
    pub fn new(
        validator: Arc<dyn JwtValidator>,
        store: Arc<dyn UserStore>,
        freeze_policy: FreezePolicy,
    ) -> Self {
        Self {
            validator,
            resolver: PrincipalResolver::new(store.clone(), freeze_policy),
            store,
        }
    }

    /// Decide whether a request carrying `bearer` may run an operation
    /// guarded by `requirements`.
    pub async fn decide(
        &self,
        requirements: &Requirements,
        bearer: Option<&str>,
        now: DateTime<Utc>,
    ) -> Decision {
        if requirements.is_public() {
            return Decision::Admitted(None);
        }

        match self.authorize(requirements, bearer, now).await {
            Ok(principal) => {
                debug!(user_id = %principal.user_id, "access admitted");
                Decision::Admitted(Some(principal))
            }
            Err(err) => {
                match &err {
                    AccessError::AuthorizationCheckFailed(detail) => {
                        error!(detail = %detail, "authorization check failed");
                    }
                    denied => info!(code = denied.code(), reason = denied.reason(), "access denied"),
                }
                Decision::Denied(err)
            }
        }
    }

    async fn authorize(
        &self,
        requirements: &Requirements,
        bearer: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Principal, AccessError> {
        let token = bearer.ok_or_else(|| AccessError::unauthenticated("missing bearer token"))?;
        let claims = self.validator.validate(token, now)?;
        let principal = self.resolver.resolve(&claims).await?;

        for requirement in requirements.iter() {
            self.check(&principal, requirement).await?;
        }
        Ok(principal)
    }

    async fn check(&self, principal: &Principal, requirement: &Requirement) -> Result<(), AccessError> {
        match requirement {
            Requirement::Authenticated => Ok(()),
            Requirement::Permission(code) => {
                if has_permission(self.store.as_ref(), principal, code).await? {
                    Ok(())
                } else {
                    debug!(user_id = %principal.user_id, permission = %code, "permission missing");
                    Err(AccessError::forbidden(INSUFFICIENT_PERMISSION))
                }
            }
            Requirement::AnyRole(required) => {
                if required.is_empty() || has_any_role(principal, required) {
                    Ok(())
                } else if principal.roles.is_empty() {
                    Err(AccessError::forbidden(NO_ROLE_CONTEXT))
                } else {
                    Err(AccessError::forbidden(INSUFFICIENT_ROLE))
                }
            }
        }
    }
}
