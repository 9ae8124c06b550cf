//! Scriptable in-crate store for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use roombook_core::UserId;

use crate::{CredentialStore, Permission, Role, StoreError, StoredCredentials, UserRecord, UserStore};

#[derive(Default)]
pub(crate) struct StubStore {
    pub(crate) users: Mutex<HashMap<UserId, UserRecord>>,
    pub(crate) grants: Mutex<HashMap<Role, Vec<Permission>>>,
    pub(crate) password_hashes: Mutex<HashMap<UserId, String>>,
    pub(crate) fail_lookups: bool,
    pub(crate) fail_expansion: bool,
    pub(crate) expansion_calls: AtomicUsize,
}

impl StubStore {
    pub(crate) fn user(self, id: i64, username: &str, is_admin: bool, roles: &[&str]) -> Self {
        let record = UserRecord {
            id: UserId::new(id),
            username: username.to_string(),
            roles: roles.iter().map(|r| Role::new(r.to_string())).collect(),
            is_frozen: false,
            is_admin,
        };
        self.users.lock().unwrap().insert(record.id, record);
        self
    }

    pub(crate) fn frozen(self, id: i64) -> Self {
        if let Some(u) = self.users.lock().unwrap().get_mut(&UserId::new(id)) {
            u.is_frozen = true;
        }
        self
    }

    pub(crate) fn grant(self, role: &str, codes: &[&str]) -> Self {
        self.grants.lock().unwrap().insert(
            Role::new(role.to_string()),
            codes.iter().map(|c| Permission::new(c.to_string())).collect(),
        );
        self
    }

    pub(crate) fn password(self, id: i64, plain: &str) -> Self {
        let hash = crate::password::hash_password(plain).unwrap();
        self.password_hashes.lock().unwrap().insert(UserId::new(id), hash);
        self
    }

    pub(crate) fn expansions(&self) -> usize {
        self.expansion_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for StubStore {
    async fn find_user_with_roles(&self, user_id: UserId) -> Result<Option<UserRecord>, StoreError> {
        if self.fail_lookups {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }

    async fn expand_permissions(&self, roles: &[Role]) -> Result<HashSet<Permission>, StoreError> {
        self.expansion_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_expansion {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        let grants = self.grants.lock().unwrap();
        Ok(roles
            .iter()
            .filter_map(|r| grants.get(r))
            .flatten()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CredentialStore for StubStore {
    async fn find_credentials(&self, username: &str) -> Result<Option<StoredCredentials>, StoreError> {
        if self.fail_lookups {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        let users = self.users.lock().unwrap();
        let Some(user) = users.values().find(|u| u.username == username) else {
            return Ok(None);
        };
        Ok(self
            .password_hashes
            .lock()
            .unwrap()
            .get(&user.id)
            .map(|hash| StoredCredentials {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }
}
