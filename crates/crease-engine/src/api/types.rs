/// Unique identifier for an entity in the scene.
///
/// Physics bodies carry the same id in their user data, so collision
/// pairs can be mapped back to scene models without a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Raw value as stored in rapier's `user_data`.
    pub fn as_u128(self) -> u128 {
        self.0 as u128
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
