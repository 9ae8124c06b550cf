//! Claims → principal resolution.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{AccessError, Principal, TokenClaims, UserStore};

/// Whether a frozen account may keep using tokens issued before the freeze.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreezePolicy {
    /// Frozen accounts are rejected on every request.
    #[default]
    Enforce,
    /// Freezing only blocks new logins; outstanding tokens stay valid until expiry.
    LoginOnly,
}

impl core::str::FromStr for FreezePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enforce" => Ok(Self::Enforce),
            "login_only" | "login-only" => Ok(Self::LoginOnly),
            other => Err(format!("unknown freeze policy '{other}' (expected enforce | login_only)")),
        }
    }
}

/// Maps verified claims onto the current state of the account.
#[derive(Clone)]
pub struct PrincipalResolver {
    store: Arc<dyn UserStore>,
    freeze_policy: FreezePolicy,
}

impl PrincipalResolver {
    pub fn new(store: Arc<dyn UserStore>, freeze_policy: FreezePolicy) -> Self {
        Self {
            store,
            freeze_policy,
        }
    }

    /// Identity and admin flag come from the claims; roles are always re-read.
    pub async fn resolve(&self, claims: &TokenClaims) -> Result<Principal, AccessError> {
        let user = self
            .store
            .find_user_with_roles(claims.sub)
            .await?
            .ok_or_else(|| AccessError::unauthenticated("subject no longer exists"))?;

        if user.is_frozen && self.freeze_policy == FreezePolicy::Enforce {
            return Err(AccessError::unauthenticated("account is frozen"));
        }

        let mut roles = Vec::with_capacity(user.roles.len());
        for role in user.roles {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }

        Ok(Principal {
            user_id: claims.sub,
            username: claims.username.clone(),
            is_admin: claims.is_admin,
            roles,
        })
    }
}
