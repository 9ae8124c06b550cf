//! Access requirements registered per operation.

use crate::{Permission, Role};

/// A single predicate an authenticated principal must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Any valid token that resolves to an existing account.
    Authenticated,
    /// The principal must hold this permission code (administrators always do).
    Permission(Permission),
    /// The principal must hold at least one of these roles.
    ///
    /// Roles are always re-read from the store, so a principal never lacks
    /// role information outright; an account with no roles assigned is
    /// denied with "not authenticated with role context" rather than
    /// "insufficient role".
    AnyRole(Vec<Role>),
}

/// Ordered list of requirements attached to one operation.
///
/// Empty means public: the gate admits without looking at credentials.
/// Otherwise every entry must pass, evaluated in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements(Vec<Requirement>);

impl Requirements {
    pub fn public() -> Self {
        Self(Vec::new())
    }

    pub fn authenticated() -> Self {
        Self(vec![Requirement::Authenticated])
    }

    pub fn permission(code: Permission) -> Self {
        Self(vec![Requirement::Permission(code)])
    }

    pub fn any_role<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = Role>,
    {
        Self(vec![Requirement::AnyRole(roles.into_iter().collect())])
    }

    /// Append another predicate (AND).
    pub fn and(mut self, requirement: Requirement) -> Self {
        self.0.push(requirement);
        self
    }

    pub fn is_public(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.0.iter()
    }
}

impl FromIterator<Requirement> for Requirements {
    fn from_iter<T: IntoIterator<Item = Requirement>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
