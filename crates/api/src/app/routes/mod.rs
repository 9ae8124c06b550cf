use axum::routing::{get, post};

use roombook_auth::permissions::user;
use roombook_auth::roles::builtin;
use roombook_auth::Requirements;

use crate::authz::GuardedRouter;

pub mod auth;
pub mod system;
pub mod users;

/// Every route, with the access requirements the gate enforces for it.
pub fn router() -> GuardedRouter {
    GuardedRouter::new()
        .route("/health", get(system::health), Requirements::public())
        .route("/auth/login", post(auth::login), Requirements::public())
        .route("/whoami", get(system::whoami), Requirements::authenticated())
        .route("/users/:id", get(users::get_user), Requirements::permission(user::VIEW))
        .route(
            "/admin/users/:id/permissions",
            get(users::effective_permissions),
            Requirements::any_role([builtin::ADMIN]),
        )
}
