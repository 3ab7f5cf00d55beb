//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Items and packing slips are plain records keyed by id; stores use this
/// trait to key them without knowing the concrete type.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
