//! Component Storage
//!
//! `ComponentStorage<T>` is a sparse array indexed by entity slot. Lookups
//! check the handle's generation, so a stale handle never reaches the data
//! stored by whoever reused the slot.

use super::entity::Entity;

struct Slot<T> {
    generation: u32,
    value: T,
}

/// Sparse per-entity storage
pub struct ComponentStorage<T> {
    data: Vec<Option<Slot<T>>>,
}

impl<T> ComponentStorage<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Insert or replace the component for `entity`
    pub fn insert(&mut self, entity: Entity, value: T) {
        let idx = entity.index() as usize;
        if idx >= self.data.len() {
            self.data.resize_with(idx + 1, || None);
        }
        self.data[idx] = Some(Slot {
            generation: entity.generation(),
            value,
        });
    }

    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        if !self.contains(entity) {
            return None;
        }
        self.data[entity.index() as usize].take().map(|s| s.value)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        match self.data.get(entity.index() as usize) {
            Some(Some(s)) if s.generation == entity.generation() => Some(&s.value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self.data.get_mut(entity.index() as usize) {
            Some(Some(s)) if s.generation == entity.generation() => Some(&mut s.value),
            _ => None,
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    /// Iterate over live (entity, component) pairs
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.data.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref()
                .map(|s| (Entity::new(i as u32, s.generation), &s.value))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.data.iter_mut().enumerate().filter_map(|(i, slot)| {
            slot.as_mut()
                .map(|s| (Entity::new(i as u32, s.generation), &mut s.value))
        })
    }

    pub fn len(&self) -> usize {
        self.data.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}
