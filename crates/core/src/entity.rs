//! Entity trait: a record with a stable typed identity.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Lower-case noun used when the entity is named in audit entries.
    const NOUN: &'static str;

    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Human-readable label, e.g. `course LU3IN005/TD/1` or `pack 4`.
    fn label(&self) -> String {
        format!("{} {}", Self::NOUN, self.id())
    }
}
