//! Entity trait: identity + continuity across edits.

/// Entity marker + minimal interface.
///
/// Products, variations, photos and reference records (brand, caliber, category,
/// action) are entities: two records with the same id are the same record
/// even if an operator has edited their fields.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
