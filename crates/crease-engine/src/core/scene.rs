use glam::{Quat, Vec3};

use crate::api::types::EntityId;
use crate::components::entity::Entity;

/// Simple entity storage using a flat Vec.
/// Designed for small-to-medium entity counts (hundreds, not millions).
///
/// Doubles as the model registry: presentation code looks models up by tag
/// and writes transforms; a missing tag is never an error, the write is skipped.
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(32),
        }
    }

    /// Add an entity to the scene. Tag lookups resolve to the first entity
    /// spawned with a tag, so a repeated non-empty tag is logged.
    pub fn spawn(&mut self, entity: Entity) {
        if !entity.tag.is_empty() && self.find_by_tag(&entity.tag).is_some() {
            log::warn!("model tag '{}' already registered; {} is unreachable by tag", entity.tag, entity.id);
        }
        self.entities.push(entity);
    }

    /// Remove an entity by ID. Returns the removed entity if found.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        if let Some(idx) = self.entities.iter().position(|e| e.id == id) {
            Some(self.entities.swap_remove(idx))
        } else {
            None
        }
    }

    /// Get a reference to an entity by ID.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Iterate over all entities.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Find the first entity with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.tag == tag)
    }

    /// Find the first entity with the given tag (mutable).
    pub fn find_by_tag_mut(&mut self, tag: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.tag == tag)
    }

    /// Move the model named `tag`. Returns `false` if no such model exists.
    pub fn set_position(&mut self, tag: &str, pos: Vec3) -> bool {
        match self.find_by_tag_mut(tag) {
            Some(e) => {
                e.pos = pos;
                true
            }
            None => false,
        }
    }

    /// Orient the model named `tag`. Returns `false` if no such model exists.
    pub fn set_rotation(&mut self, tag: &str, rotation: Quat) -> bool {
        match self.find_by_tag_mut(tag) {
            Some(e) => {
                e.rotation = rotation;
                true
            }
            None => false,
        }
    }

    /// Number of entities in the scene.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Clear all entities.
    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
