use std::sync::Arc;

use roombook_auth::{LoginService, UserStore};

/// Handles shared by all handlers.
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<dyn UserStore>,
    pub login: LoginService,
}

impl AppServices {
    pub fn new(users: Arc<dyn UserStore>, login: LoginService) -> Self {
        Self { users, login }
    }
}
