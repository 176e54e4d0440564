//! Game World
//!
//! Owns every body and enemy in play. Plain bodies (the player, anything an
//! enemy can target) live in a generational component storage so enemies can
//! refer to them by handle; enemies live in a list and are dropped as soon as
//! they die.

use super::body::Body;
use super::collision::collide_floor;
use super::component::ComponentStorage;
use super::enemy::Enemy;
use super::entity::{Entity, EntityAllocator};

pub struct World {
    entities: EntityAllocator,
    /// Bodies enemies can target
    pub bodies: ComponentStorage<Body>,
    enemies: Vec<Enemy>,
    /// Flat floor height (None = no floor)
    pub floor_y: Option<f32>,
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            bodies: ComponentStorage::new(),
            enemies: Vec::new(),
            floor_y: None,
        }
    }

    pub fn with_floor(floor_y: f32) -> Self {
        Self {
            floor_y: Some(floor_y),
            ..Self::new()
        }
    }

    pub fn spawn_body(&mut self, body: Body) -> Entity {
        let entity = self.entities.allocate();
        self.bodies.insert(entity, body);
        entity
    }

    /// Remove a body; handles to it stop resolving
    pub fn despawn(&mut self, entity: Entity) -> Option<Body> {
        let body = self.bodies.remove(entity);
        self.entities.free(entity);
        body
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn body(&self, entity: Entity) -> Option<&Body> {
        self.bodies.get(entity)
    }

    pub fn body_mut(&mut self, entity: Entity) -> Option<&mut Body> {
        self.bodies.get_mut(entity)
    }

    pub fn spawn_enemy(&mut self, enemy: Enemy) {
        self.enemies.push(enemy);
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Advance everything by one tick
    ///
    /// Living bodies integrate first, then enemies step against them. Floor
    /// contact is resolved after movement, so it feeds the next tick. Dead
    /// enemies are removed at the end; dead bodies stay until despawned.
    pub fn step(&mut self, time_step: f32) {
        for (_, body) in self.bodies.iter_mut() {
            if !body.alive {
                continue;
            }
            body.integrate(time_step);
            if let Some(floor) = self.floor_y {
                collide_floor(body, floor);
            }
        }

        for enemy in &mut self.enemies {
            enemy.step(time_step, &mut self.bodies);
            if let Some(floor) = self.floor_y {
                collide_floor(enemy.body_mut(), floor);
            }
        }

        let before = self.enemies.len();
        self.enemies.retain(|enemy| enemy.is_alive());
        let removed = before - self.enemies.len();
        if removed > 0 {
            log::debug!("Despawned {} enemies", removed);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
