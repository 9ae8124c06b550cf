//! Role and permission evaluators, and the access error taxonomy.

use std::collections::HashSet;

use thiserror::Error;

use crate::{Permission, Principal, Role, StoreError, TokenError, UserStore};

/// Why a request was not admitted.
///
/// `Unauthenticated` and `Forbidden` are access decisions; a failed check is a
/// server fault and must not be reported as either.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("authorization check failed: {0}")]
    AuthorizationCheckFailed(String),
}

impl AccessError {
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::Unauthenticated(reason.into())
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn check_failed(detail: impl Into<String>) -> Self {
        Self::AuthorizationCheckFailed(detail.into())
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::AuthorizationCheckFailed(_) => "authorization_check_failed",
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::Unauthenticated(r) | Self::Forbidden(r) | Self::AuthorizationCheckFailed(r) => r,
        }
    }
}

impl From<TokenError> for AccessError {
    fn from(value: TokenError) -> Self {
        Self::Unauthenticated(value.to_string())
    }
}

impl From<StoreError> for AccessError {
    fn from(value: StoreError) -> Self {
        Self::AuthorizationCheckFailed(value.to_string())
    }
}

/// True iff the principal holds at least one of `required`.
///
/// An empty requirement is satisfied by anyone.
pub fn has_any_role(principal: &Principal, required: &[Role]) -> bool {
    if required.is_empty() {
        return true;
    }
    let held: HashSet<&str> = principal.roles.iter().map(|r| r.as_str()).collect();
    required.iter().any(|r| held.contains(r.as_str()))
}

/// Check a single permission code.
///
/// Administrators pass without touching the store. Everyone else is checked
/// against the union of the permission codes granted by their roles.
pub async fn has_permission<S>(
    store: &S,
    principal: &Principal,
    required: &Permission,
) -> Result<bool, AccessError>
where
    S: UserStore + ?Sized,
{
    if principal.is_admin {
        return Ok(true);
    }
    if principal.roles.is_empty() {
        return Ok(false);
    }

    let granted = store.expand_permissions(&principal.roles).await?;
    Ok(granted.contains(required))
}
