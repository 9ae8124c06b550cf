//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Records owned by a store (users, roles) are entities; derived values such as
/// a request principal are not.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
