//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Ledgers look entities up by this id; it never changes after creation.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
