//! User store boundary consumed by the authorization pipeline.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use roombook_core::UserId;

use crate::{Permission, Role, UserRecord};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or the query failed.
    #[error("user store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with rows that do not map onto the user model.
    #[error("user store returned invalid data: {0}")]
    InvalidData(String),
}

/// Read-only access to the persisted user/role/permission graph.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Load a user together with the names of its assigned roles.
    async fn find_user_with_roles(&self, user_id: UserId) -> Result<Option<UserRecord>, StoreError>;

    /// Union of the permission codes granted by `roles`.
    ///
    /// Unknown role names contribute nothing.
    async fn expand_permissions(&self, roles: &[Role]) -> Result<HashSet<Permission>, StoreError>;
}

#[async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn find_user_with_roles(&self, user_id: UserId) -> Result<Option<UserRecord>, StoreError> {
        (**self).find_user_with_roles(user_id).await
    }

    async fn expand_permissions(&self, roles: &[Role]) -> Result<HashSet<Permission>, StoreError> {
        (**self).expand_permissions(roles).await
    }
}

/// An account's login material.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user: UserRecord,
    /// PHC-format argon2 hash.
    pub password_hash: String,
}

/// Login-time lookup by username.
///
/// Kept apart from [`UserStore`]: the gate never sees password hashes.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `None` when no account has this username or it has no password set.
    async fn find_credentials(&self, username: &str) -> Result<Option<StoredCredentials>, StoreError>;
}

#[async_trait]
impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    async fn find_credentials(&self, username: &str) -> Result<Option<StoredCredentials>, StoreError> {
        (**self).find_credentials(username).await
    }
}
