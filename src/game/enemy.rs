//! Pursuit Enemy
//!
//! Every tick the enemy falls under its own gravity, accelerates flat out
//! toward its target, hops whenever it is on the ground, kills the target
//! when it gets within `radius` on both axes, and despawns itself once the
//! target is more than `RANGE` away on either axis.
//!
//! Tunables come from a key-value parameter resource (see
//! `content::params`) merged over fixed defaults. `entity` and `animation`
//! name sibling resources loaded by the underlying articulated entity; both
//! are mandatory.

use serde::{Deserialize, Serialize};

use super::articulated::{Articulated, ArticulatedEntity};
use super::body::Body;
use super::component::ComponentStorage;
use super::entity::Entity;
use super::LoadError;
use crate::content::params::{merge_key_value_tokens, read_file_tokens, ParameterMap};
use crate::content::{ContentProvider, ContentUri};

/// Distance on either axis past which an abandoned enemy despawns
pub const RANGE: f32 = 500.0;

/// Sentinel for parameters without a usable default
pub const UNSET: &str = "none";

pub const DEFAULT_ACCELERATION: f32 = 40.0;
pub const DEFAULT_DRAWING_SCALE: f32 = 1.0;
pub const DEFAULT_JUMP_VELOCITY: f32 = 100.0;
pub const DEFAULT_GRAVITY: f32 = 100.0;
pub const DEFAULT_LIFE: f32 = 1.0;
pub const DEFAULT_RADIUS: f32 = 32.0;

const PARAM_ACCELERATION: &str = "acceleration";
const PARAM_ANIMATION: &str = "animation";
const PARAM_DRAWING_SCALE: &str = "drawing_scale";
const PARAM_ENTITY: &str = "entity";
const PARAM_JUMP_VELOCITY: &str = "jump_velocity";
const PARAM_GRAVITY: &str = "gravity";
const PARAM_LIFE: &str = "life";
const PARAM_RADIUS: &str = "radius";

/// Every accepted enemy parameter with its default
pub fn default_parameters() -> ParameterMap {
    ParameterMap::new()
        .with_float(PARAM_ACCELERATION, DEFAULT_ACCELERATION)
        .with_float(PARAM_DRAWING_SCALE, DEFAULT_DRAWING_SCALE)
        .with_text(PARAM_ANIMATION, UNSET)
        .with_text(PARAM_ENTITY, UNSET)
        .with_float(PARAM_JUMP_VELOCITY, DEFAULT_JUMP_VELOCITY)
        .with_float(PARAM_GRAVITY, DEFAULT_GRAVITY)
        .with_float(PARAM_LIFE, DEFAULT_LIFE)
        .with_float(PARAM_RADIUS, DEFAULT_RADIUS)
}

/// Typed view of a merged parameter map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyParameters {
    pub acceleration: f32,
    pub drawing_scale: f32,
    pub jump_velocity: f32,
    pub gravity: f32,
    pub life: f32,
    pub radius: f32,
    pub animation: String,
    pub entity: String,
}

impl Default for EnemyParameters {
    fn default() -> Self {
        Self::from_map(&default_parameters())
    }
}

impl EnemyParameters {
    /// Read the typed values out of `map`, falling back to defaults
    pub fn from_map(map: &ParameterMap) -> Self {
        let float = |key: &str, default: f32| map.float(key).unwrap_or(default);
        let text = |key: &str| map.text(key).unwrap_or(UNSET).to_string();
        Self {
            acceleration: float(PARAM_ACCELERATION, DEFAULT_ACCELERATION),
            drawing_scale: float(PARAM_DRAWING_SCALE, DEFAULT_DRAWING_SCALE),
            jump_velocity: float(PARAM_JUMP_VELOCITY, DEFAULT_JUMP_VELOCITY),
            gravity: float(PARAM_GRAVITY, DEFAULT_GRAVITY),
            life: float(PARAM_LIFE, DEFAULT_LIFE),
            radius: float(PARAM_RADIUS, DEFAULT_RADIUS),
            animation: text(PARAM_ANIMATION),
            entity: text(PARAM_ENTITY),
        }
    }
}

/// An entity that chases a target
pub struct Enemy<A: Articulated = ArticulatedEntity> {
    base: A,
    acceleration: f32,
    gravity: f32,
    jump_velocity: f32,
    life: f32,
    /// Not owned; the target may disappear at any time
    target: Entity,
}

impl Enemy<ArticulatedEntity> {
    pub fn new(target: Entity) -> Self {
        Self::with_base(ArticulatedEntity::new(), target)
    }
}

impl<A: Articulated> Enemy<A> {
    pub fn with_base(base: A, target: Entity) -> Self {
        Self {
            base,
            acceleration: DEFAULT_ACCELERATION,
            gravity: DEFAULT_GRAVITY,
            jump_velocity: DEFAULT_JUMP_VELOCITY,
            life: DEFAULT_LIFE,
            target,
        }
    }

    pub fn base(&self) -> &A {
        &self.base
    }

    pub fn body(&self) -> &Body {
        self.base.body()
    }

    pub fn body_mut(&mut self) -> &mut Body {
        self.base.body_mut()
    }

    pub fn target(&self) -> Entity {
        self.target
    }

    pub fn is_alive(&self) -> bool {
        self.base.body().alive
    }

    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn jump_velocity(&self) -> f32 {
        self.jump_velocity
    }

    pub fn life(&self) -> f32 {
        self.life
    }

    /// Advance one tick
    ///
    /// `targets` holds the bodies the target handle may refer to. If the
    /// handle no longer resolves there is nothing left to chase and the enemy
    /// marks itself dead.
    pub fn step(&mut self, time_step: f32, targets: &mut ComponentStorage<Body>) {
        self.base.body_mut().acceleration.y = self.gravity;
        self.base.step(time_step);
        self.base.step_animation(time_step);

        let body = self.base.body_mut();
        let Some(target) = targets.get_mut(self.target) else {
            if body.alive {
                log::debug!("Enemy target {:?} is gone, despawning", self.target);
            }
            body.alive = false;
            return;
        };

        let dx = (target.position.x - body.position.x).abs();
        let dy = (target.position.y - body.position.y).abs();

        if dx < body.radius && dy < body.radius {
            if target.alive {
                log::debug!("Enemy caught target {:?}", self.target);
            }
            target.alive = false;
        }

        if dx > RANGE || dy > RANGE {
            if body.alive {
                log::debug!("Enemy left behind (dx={:.0}, dy={:.0}), despawning", dx, dy);
            }
            body.alive = false;
        }

        if target.position.x < body.position.x {
            body.sprite_flipped_horizontal = true;
            body.acceleration.x = -self.acceleration;
        } else {
            body.sprite_flipped_horizontal = false;
            body.acceleration.x = self.acceleration;
        }

        // Re-applied on every grounded tick, not only on landing
        if body.has_ground_contact {
            body.velocity.y = -self.jump_velocity;
        }
    }

    /// Configure this enemy from a parameter resource
    ///
    /// # Panics
    /// Panics if the resource leaves `entity` or `animation` unset; a
    /// content bug, not a runtime condition.
    pub fn load_from_uri(
        &mut self,
        content: &ContentProvider,
        uri: &ContentUri,
    ) -> Result<EnemyParameters, LoadError> {
        let mut parameters = default_parameters();

        let file_path = content
            .temporary_file_path(uri)
            .ok_or_else(|| LoadError::Unresolved(uri.to_string()))?;
        let tokens = read_file_tokens(&file_path)?;
        merge_key_value_tokens(&tokens, &mut parameters);
        let params = EnemyParameters::from_map(&parameters);

        self.acceleration = params.acceleration;
        self.gravity = params.gravity;
        self.jump_velocity = params.jump_velocity;
        self.life = params.life;
        let body = self.base.body_mut();
        body.drawing_scale = params.drawing_scale;
        body.radius = params.radius;

        assert!(params.entity != UNSET, "Enemy entity must be specified.");
        self.base.load_from_uri(content, &uri.sibling(&params.entity)?)?;

        assert!(params.animation != UNSET, "Enemy animation must be specified.");
        self.base
            .load_animation_from_uri(content, &uri.sibling(&params.animation)?)?;

        log::info!("Loaded enemy {}", uri);
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::test_support::build_package;
    use crate::game::articulated::tests::{CRAWLER, WALK};
    use crate::game::entity::EntityAllocator;
    use macroquad::math::{vec2, Vec2};
    use std::io::Cursor;
    use tempfile::TempDir;

    /// Articulated stand-in that records what it was asked to load
    #[derive(Default)]
    struct Recorder {
        body: Body,
        steps: Vec<f32>,
        animation_steps: Vec<f32>,
        entity_uri: Option<String>,
        animation_uri: Option<String>,
    }

    impl Articulated for Recorder {
        fn body(&self) -> &Body {
            &self.body
        }
        fn body_mut(&mut self) -> &mut Body {
            &mut self.body
        }
        fn step(&mut self, time_step: f32) {
            self.steps.push(time_step);
            self.body.integrate(time_step);
        }
        fn step_animation(&mut self, time_step: f32) {
            self.animation_steps.push(time_step);
        }
        fn load_from_uri(
            &mut self,
            _: &ContentProvider,
            uri: &ContentUri,
        ) -> Result<(), LoadError> {
            self.entity_uri = Some(uri.to_string());
            Ok(())
        }
        fn load_animation_from_uri(
            &mut self,
            _: &ContentProvider,
            uri: &ContentUri,
        ) -> Result<(), LoadError> {
            self.animation_uri = Some(uri.to_string());
            Ok(())
        }
    }

    /// One target body at `target_pos`, one enemy at `enemy_pos`, gravity off
    fn scene(
        enemy_pos: Vec2,
        target_pos: Vec2,
    ) -> (ComponentStorage<Body>, Entity, Enemy<Recorder>) {
        let mut alloc = EntityAllocator::new();
        let mut bodies = ComponentStorage::new();
        let target = alloc.allocate();
        bodies.insert(target, Body::at(target_pos));

        let mut enemy = Enemy::with_base(Recorder::default(), target);
        enemy.gravity = 0.0;
        enemy.acceleration = 0.0;
        enemy.body_mut().position = enemy_pos;
        enemy.body_mut().radius = DEFAULT_RADIUS;
        (bodies, target, enemy)
    }

    fn provider(entries: &[(&str, &[u8])]) -> (TempDir, ContentProvider) {
        let dir = TempDir::new().unwrap();
        let bytes = build_package("content_package", entries);
        let provider = ContentProvider::initialize_from_reader(
            &mut Cursor::new(bytes),
            dir.path(),
            "content_package",
        );
        (dir, provider)
    }

    fn uri(s: &str) -> ContentUri {
        ContentUri::parse(s).unwrap()
    }

    #[test]
    fn test_step_order() {
        let (mut bodies, _, mut enemy) = scene(vec2(0.0, 0.0), vec2(100.0, 0.0));
        enemy.gravity = 50.0;
        enemy.step(0.5, &mut bodies);

        assert_eq!(enemy.base().steps, vec![0.5]);
        assert_eq!(enemy.base().animation_steps, vec![0.5]);
        assert_eq!(enemy.body().acceleration.y, 50.0);
        // Gravity was in place before integrating
        assert_eq!(enemy.body().velocity.y, 25.0);
    }

    #[test]
    fn test_catch_uses_strict_radius() {
        let r = DEFAULT_RADIUS;
        let (mut bodies, target, mut enemy) = scene(vec2(0.0, 0.0), vec2(r, r));
        enemy.step(0.0, &mut bodies);
        assert!(bodies.get(target).unwrap().alive);

        let (mut bodies, target, mut enemy) = scene(vec2(0.0, 0.0), vec2(r - 0.01, r - 0.01));
        enemy.step(0.0, &mut bodies);
        assert!(!bodies.get(target).unwrap().alive);
        // Catching does not kill the enemy
        assert!(enemy.is_alive());
    }

    #[test]
    fn test_catch_needs_both_axes() {
        let (mut bodies, target, mut enemy) = scene(vec2(0.0, 0.0), vec2(1.0, 40.0));
        enemy.step(0.0, &mut bodies);
        assert!(bodies.get(target).unwrap().alive);
    }

    #[test]
    fn test_despawn_past_range() {
        let (mut bodies, _, mut enemy) = scene(vec2(0.0, 0.0), vec2(RANGE, 0.0));
        enemy.step(0.0, &mut bodies);
        assert!(enemy.is_alive());

        let (mut bodies, _, mut enemy) = scene(vec2(0.0, 0.0), vec2(0.0, -(RANGE + 0.5)));
        enemy.step(0.0, &mut bodies);
        assert!(!enemy.is_alive());

        let (mut bodies, target, mut enemy) = scene(vec2(0.0, 0.0), vec2(RANGE + 0.5, 0.0));
        enemy.step(0.0, &mut bodies);
        assert!(!enemy.is_alive());
        assert!(bodies.get(target).unwrap().alive);
    }

    #[test]
    fn test_missing_target_despawns() {
        let (mut bodies, target, mut enemy) = scene(vec2(0.0, 0.0), vec2(10.0, 0.0));
        bodies.remove(target);
        enemy.step(0.1, &mut bodies);
        assert!(!enemy.is_alive());
    }

    #[test]
    fn test_steering() {
        let (mut bodies, _, mut enemy) = scene(vec2(0.0, 0.0), vec2(-100.0, 0.0));
        enemy.acceleration = 40.0;
        enemy.step(0.0, &mut bodies);
        assert_eq!(enemy.body().acceleration.x, -40.0);
        assert!(enemy.body().sprite_flipped_horizontal);

        let (mut bodies, _, mut enemy) = scene(vec2(0.0, 0.0), vec2(100.0, 0.0));
        enemy.acceleration = 40.0;
        enemy.body_mut().sprite_flipped_horizontal = true;
        enemy.step(0.0, &mut bodies);
        assert_eq!(enemy.body().acceleration.x, 40.0);
        assert!(!enemy.body().sprite_flipped_horizontal);

        // Directly above or below counts as "not to the left"
        let (mut bodies, _, mut enemy) = scene(vec2(0.0, 0.0), vec2(0.0, 100.0));
        enemy.acceleration = 40.0;
        enemy.step(0.0, &mut bodies);
        assert_eq!(enemy.body().acceleration.x, 40.0);
    }

    #[test]
    fn test_jumps_on_every_grounded_tick() {
        let (mut bodies, _, mut enemy) = scene(vec2(0.0, 0.0), vec2(100.0, 0.0));
        enemy.step(0.0, &mut bodies);
        assert_eq!(enemy.body().velocity.y, 0.0);

        enemy.body_mut().has_ground_contact = true;
        for _ in 0..3 {
            enemy.body_mut().velocity.y = 0.0;
            enemy.step(0.0, &mut bodies);
            assert_eq!(enemy.body().velocity.y, -DEFAULT_JUMP_VELOCITY);
        }
    }

    #[test]
    fn test_load_defaults_and_sub_loads() {
        let (_dir, content) = provider(&[(
            "enemies/crawler.txt",
            b"entity crawler.ron\nanimation crawler_walk.ron\n",
        )]);
        let mut enemy = Enemy::with_base(Recorder::default(), Entity::NULL);
        let params = enemy
            .load_from_uri(&content, &uri("content:///enemies/crawler.txt"))
            .unwrap();

        assert_eq!(enemy.acceleration(), 40.0);
        assert_eq!(enemy.gravity(), 100.0);
        assert_eq!(enemy.life(), 1.0);
        assert_eq!(enemy.jump_velocity(), 100.0);
        assert_eq!(enemy.body().radius, 32.0);
        assert_eq!(enemy.body().drawing_scale, 1.0);
        assert_eq!(params.entity, "crawler.ron");

        assert_eq!(
            enemy.base().entity_uri.as_deref(),
            Some("content:///enemies/crawler.ron")
        );
        assert_eq!(
            enemy.base().animation_uri.as_deref(),
            Some("content:///enemies/crawler_walk.ron")
        );
    }

    #[test]
    fn test_load_overrides() {
        let (_dir, content) = provider(&[(
            "fast.txt",
            b"# quick one\n\
              acceleration 90 gravity 250.5\n\
              radius 12 drawing_scale 2\n\
              life 3 jump_velocity 60\n\
              entity e.ron animation a.ron\n",
        )]);
        let mut enemy = Enemy::with_base(Recorder::default(), Entity::NULL);
        enemy.load_from_uri(&content, &uri("content:///fast.txt")).unwrap();

        assert_eq!(enemy.acceleration(), 90.0);
        assert_eq!(enemy.gravity(), 250.5);
        assert_eq!(enemy.life(), 3.0);
        assert_eq!(enemy.jump_velocity(), 60.0);
        assert_eq!(enemy.body().radius, 12.0);
        assert_eq!(enemy.body().drawing_scale, 2.0);
        assert_eq!(enemy.base().entity_uri.as_deref(), Some("content:///e.ron"));
    }

    #[test]
    fn test_unknown_key_has_no_effect() {
        let (_dir, content) = provider(&[(
            "e.txt",
            b"color red entity e.ron animation a.ron",
        )]);
        let mut enemy = Enemy::with_base(Recorder::default(), Entity::NULL);
        let params = enemy.load_from_uri(&content, &uri("content:///e.txt")).unwrap();

        let defaults = EnemyParameters::default();
        assert_eq!(
            params,
            EnemyParameters {
                entity: "e.ron".into(),
                animation: "a.ron".into(),
                ..defaults
            }
        );
    }

    #[test]
    fn test_load_from_file_scheme() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("e.txt"), "entity body.ron animation walk.ron").unwrap();
        let (_data, content) = provider(&[]);

        let file_uri = ContentUri::file(dir.path().join("e.txt").to_string_lossy());
        let mut enemy = Enemy::with_base(Recorder::default(), Entity::NULL);
        enemy.load_from_uri(&content, &file_uri).unwrap();

        let expected = format!("file://{}", dir.path().join("body.ron").display());
        assert_eq!(enemy.base().entity_uri.as_deref(), Some(expected.as_str()));
    }

    #[test]
    #[should_panic(expected = "Enemy entity must be specified.")]
    fn test_missing_entity_is_fatal() {
        let (_dir, content) = provider(&[("e.txt", b"animation a.ron")]);
        let mut enemy = Enemy::with_base(Recorder::default(), Entity::NULL);
        let _ = enemy.load_from_uri(&content, &uri("content:///e.txt"));
    }

    #[test]
    #[should_panic(expected = "Enemy animation must be specified.")]
    fn test_missing_animation_is_fatal() {
        let (_dir, content) = provider(&[("e.txt", b"entity e.ron animation none")]);
        let mut enemy = Enemy::with_base(Recorder::default(), Entity::NULL);
        let _ = enemy.load_from_uri(&content, &uri("content:///e.txt"));
    }

    #[test]
    fn test_unresolved_resource() {
        let (_dir, content) = provider(&[]);
        let mut enemy = Enemy::new(Entity::NULL);
        assert_eq!(
            enemy.load_from_uri(&content, &uri("content:///missing.txt")),
            Err(LoadError::Unresolved("content:///missing.txt".into()))
        );
    }

    #[test]
    fn test_full_load_through_package() {
        let (_dir, content) = provider(&[
            ("enemies/crawler.txt", b"entity crawler.ron animation walk.ron radius 20"),
            ("enemies/crawler.ron", CRAWLER.as_bytes()),
            ("enemies/walk.ron", WALK.as_bytes()),
        ]);
        let mut enemy = Enemy::new(Entity::NULL);
        enemy
            .load_from_uri(&content, &uri("content:///enemies/crawler.txt"))
            .unwrap();

        assert_eq!(enemy.base().parts().len(), 2);
        assert!(enemy.base().animation().clip().is_some());
        assert_eq!(enemy.body().radius, 20.0);
    }
}
