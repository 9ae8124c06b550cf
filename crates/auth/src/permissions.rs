use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission code.
///
/// Permission codes are opaque strings following the `resource:action`
/// convention (e.g. `user:create`). Nothing in the pipeline interprets them
/// beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        Self(code.into())
    }

    pub const fn from_static(code: &'static str) -> Self {
        Self(Cow::Borrowed(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stock permission codes.
pub mod user {
    use super::Permission;

    pub const VIEW: Permission = Permission::from_static("user:view");
    pub const CREATE: Permission = Permission::from_static("user:create");
    pub const UPDATE: Permission = Permission::from_static("user:update");
    pub const DELETE: Permission = Permission::from_static("user:delete");
}

pub mod role {
    use super::Permission;

    pub const VIEW: Permission = Permission::from_static("role:view");
    pub const CREATE: Permission = Permission::from_static("role:create");
    pub const UPDATE: Permission = Permission::from_static("role:update");
    pub const DELETE: Permission = Permission::from_static("role:delete");
}
