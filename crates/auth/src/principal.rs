use serde::{Deserialize, Serialize};

use roombook_core::{Entity, UserId};

use crate::Role;

/// A user account as the [`UserStore`](crate::UserStore) returns it.
///
/// The authorization pipeline only ever reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub roles: Vec<Role>,
    pub is_frozen: bool,
    pub is_admin: bool,
}

impl Entity for UserRecord {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A fully resolved principal for authorization decisions.
///
/// Built fresh per request from verified claims plus a store lookup, and
/// dropped with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub is_admin: bool,
    /// Role names in store order, without duplicates.
    pub roles: Vec<Role>,
}
