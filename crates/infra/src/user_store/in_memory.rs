use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use roombook_auth::permissions::{role, user};
use roombook_auth::roles::builtin;
use roombook_auth::{
    CredentialStore, PasswordError, Permission, Role, StoreError, StoredCredentials, UserRecord,
    UserStore, hash_password,
};
use roombook_core::{Entity, UserId};

/// In-memory user/role/permission graph.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, UserRecord>>,
    grants: RwLock<HashMap<Role, HashSet<Permission>>>,
    password_hashes: RwLock<HashMap<UserId, String>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the stock permissions and roles.
    ///
    /// `admin` holds every stock permission; `user` holds `user:view` and
    /// `role:view`. No accounts are created.
    pub fn with_default_seed() -> Self {
        let store = Self::new();
        store.define_role(
            builtin::ADMIN,
            [
                user::VIEW,
                user::CREATE,
                user::UPDATE,
                user::DELETE,
                role::VIEW,
                role::CREATE,
                role::UPDATE,
                role::DELETE,
            ],
        );
        store.define_role(builtin::USER, [user::VIEW, role::VIEW]);
        store
    }

    /// Create or replace a role and its permission codes.
    pub fn define_role<I>(&self, role: Role, permissions: I)
    where
        I: IntoIterator<Item = Permission>,
    {
        if let Ok(mut grants) = self.grants.write() {
            grants.insert(role, permissions.into_iter().collect());
        }
    }

    /// Create or replace an account.
    pub fn insert_user(&self, user: UserRecord) {
        if let Ok(mut users) = self.users.write() {
            users.insert(*user.id(), user);
        }
    }

    pub fn remove_user(&self, id: UserId) -> Option<UserRecord> {
        self.users.write().ok()?.remove(&id)
    }

    /// Hash and store `password` for account `id`.
    ///
    /// Accounts without a password cannot log in.
    pub fn set_password(&self, id: UserId, password: &str) -> Result<(), PasswordError> {
        let hash = hash_password(password)?;
        if let Ok(mut hashes) = self.password_hashes.write() {
            hashes.insert(id, hash);
        }
        Ok(())
    }

    /// Returns `false` if the account does not exist.
    pub fn set_frozen(&self, id: UserId, frozen: bool) -> bool {
        let Ok(mut users) = self.users.write() else {
            return false;
        };
        match users.get_mut(&id) {
            Some(user) => {
                user.is_frozen = frozen;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_user_with_roles(&self, user_id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(users.get(&user_id).cloned())
    }

    async fn expand_permissions(&self, roles: &[Role]) -> Result<HashSet<Permission>, StoreError> {
        let grants = self
            .grants
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(roles
            .iter()
            .filter_map(|r| grants.get(r))
            .flatten()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CredentialStore for InMemoryUserStore {
    async fn find_credentials(&self, username: &str) -> Result<Option<StoredCredentials>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        let hashes = self
            .password_hashes
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(users
            .values()
            .find(|u| u.username == username)
            .and_then(|user| {
                hashes.get(&user.id).map(|hash| StoredCredentials {
                    user: user.clone(),
                    password_hash: hash.clone(),
                })
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: i64, roles: Vec<Role>) -> UserRecord {
        UserRecord {
            id: UserId::new(id),
            username: format!("user{id}"),
            roles,
            is_frozen: false,
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn finds_inserted_user() {
        let store = InMemoryUserStore::new();
        store.insert_user(account(3, vec![builtin::USER]));

        let found = store.find_user_with_roles(UserId::new(3)).await.unwrap().unwrap();
        assert_eq!(found.roles, vec![builtin::USER]);
        assert!(store.find_user_with_roles(UserId::new(4)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn default_seed_grants() {
        let store = InMemoryUserStore::with_default_seed();

        let basic = store.expand_permissions(&[builtin::USER]).await.unwrap();
        assert_eq!(basic, HashSet::from([user::VIEW, role::VIEW]));

        let admin = store.expand_permissions(&[builtin::ADMIN]).await.unwrap();
        assert_eq!(admin.len(), 8);
    }

    #[tokio::test]
    async fn expansion_is_union_and_ignores_unknown_roles() {
        let store = InMemoryUserStore::new();
        store.define_role(Role::new("viewer"), [user::VIEW]);
        store.define_role(Role::new("editor"), [user::UPDATE, user::VIEW]);

        let perms = store
            .expand_permissions(&[Role::new("viewer"), Role::new("editor"), Role::new("ghost")])
            .await
            .unwrap();
        assert_eq!(perms, HashSet::from([user::VIEW, user::UPDATE]));
    }

    #[tokio::test]
    async fn freeze_and_remove() {
        let store = InMemoryUserStore::new();
        store.insert_user(account(8, vec![]));

        assert!(store.set_frozen(UserId::new(8), true));
        assert!(!store.set_frozen(UserId::new(99), true));
        let frozen = store.find_user_with_roles(UserId::new(8)).await.unwrap().unwrap();
        assert!(frozen.is_frozen);

        assert!(store.remove_user(UserId::new(8)).is_some());
        assert!(store.find_user_with_roles(UserId::new(8)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn credentials_are_found_by_username_once_a_password_is_set() {
        let store = InMemoryUserStore::new();
        store.insert_user(account(5, vec![builtin::USER]));

        assert!(store.find_credentials("user5").await.unwrap().is_none());

        store.set_password(UserId::new(5), "secret99").unwrap();
        let found = store.find_credentials("user5").await.unwrap().unwrap();
        assert_eq!(found.user.id, UserId::new(5));
        assert_eq!(roombook_auth::verify_password("secret99", &found.password_hash), Ok(true));

        assert!(store.find_credentials("user6").await.unwrap().is_none());
    }
}
