// Entities: named pairings of a physics body with a visual descriptor

use std::collections::HashMap;

use super::physics::RigidBodyHandle;

/// Shape used to draw an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisualShape {
    Circle { diameter: f32 },
    Rect { width: f32, height: f32 },
}

/// What a renderer needs to know to draw an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visual {
    pub shape: VisualShape,
    /// RGBA, 0.0 - 1.0
    pub color: [f32; 4],
}

impl Visual {
    pub fn circle(diameter: f32) -> Self {
        Self {
            shape: VisualShape::Circle { diameter },
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    pub fn rect(width: f32, height: f32) -> Self {
        Self {
            shape: VisualShape::Rect { width, height },
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}

/// A simulated object: one body plus how it looks
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Handle to the entity's rigid body in the physics world
    pub body: RigidBodyHandle,
    pub visual: Visual,
}

impl Entity {
    pub fn new(body: RigidBodyHandle, visual: Visual) -> Self {
        Self { body, visual }
    }
}

/// Entities keyed by name, iterated in insertion order
#[derive(Debug, Clone, Default)]
pub struct EntityMap {
    entries: Vec<(String, Entity)>,
    index: HashMap<String, usize>,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, returning the one it replaced
    ///
    /// Replacing an existing key keeps that key's original position.
    pub fn insert(&mut self, key: impl Into<String>, entity: Entity) -> Option<Entity> {
        let key = key.into();
        if let Some(&slot) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[slot].1, entity));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, entity));
        None
    }

    /// Remove an entity; later entities keep their relative order
    pub fn remove(&mut self, key: &str) -> Option<Entity> {
        let slot = self.index.remove(key)?;
        let (_, entity) = self.entries.remove(slot);
        for position in self.index.values_mut() {
            if *position > slot {
                *position -= 1;
            }
        }
        Some(entity)
    }

    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.entries
            .iter()
            .map(|(key, entity)| (key.as_str(), entity))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}
