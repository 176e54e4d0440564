//! Entity handles
//!
//! An `Entity` is a generational index. Enemies keep one for their target:
//! the handle does not own the target, and once the target's slot is freed
//! (or reused) the old handle simply stops resolving.

/// Non-owning reference to an entity slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Handle that never resolves
    pub const NULL: Entity = Entity {
        index: u32::MAX,
        generation: 0,
    };

    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Entity::NULL
    }
}

/// Hands out entity slots and tracks which handles are still live
#[derive(Debug, Default)]
pub struct EntityAllocator {
    /// Current generation of each slot
    generations: Vec<u32>,
    /// Freed slots, reused LIFO
    free_indices: Vec<u32>,
    alive_count: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> Entity {
        self.alive_count += 1;
        match self.free_indices.pop() {
            Some(index) => Entity::new(index, self.generations[index as usize]),
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                Entity::new(index, 0)
            }
        }
    }

    /// Free a slot. Bumping the generation invalidates every outstanding handle.
    /// Returns false if the handle was already stale.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.generations[entity.index as usize] += 1;
        self.free_indices.push(entity.index);
        self.alive_count -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        !entity.is_null()
            && self
                .generations
                .get(entity.index as usize)
                .is_some_and(|&generation| generation == entity.generation)
    }

    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }
}
