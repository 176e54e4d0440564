//! Play Runtime
//!
//! Drives the demo: one player body steered from the keyboard, any number of
//! enemies chasing it, simulated at a fixed rate regardless of frame rate.

use macroquad::prelude::*;

use super::articulated::PartPose;
use super::body::Body;
use super::enemy::Enemy;
use super::entity::Entity;
use super::{LoadError, World};
use crate::content::{ContentProvider, ContentUri};

/// Simulation tick (seconds)
pub const FIXED_TIME_STEP: f32 = 1.0 / 60.0;

/// Ticks run per frame at most; the rest of a long frame is dropped
const MAX_TICKS_PER_FRAME: u32 = 8;

pub const PLAYER_SPEED: f32 = 160.0;
pub const PLAYER_JUMP_VELOCITY: f32 = 260.0;
pub const PLAYER_GRAVITY: f32 = 600.0;
pub const PLAYER_RADIUS: f32 = 14.0;
pub const FLOOR_Y: f32 = 400.0;

/// Player controls sampled once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl PlayerInput {
    /// Arrow keys (or A/D) to walk, Space/Up to jump
    pub fn from_keyboard() -> Self {
        Self {
            left: is_key_down(KeyCode::Left) || is_key_down(KeyCode::A),
            right: is_key_down(KeyCode::Right) || is_key_down(KeyCode::D),
            jump: is_key_down(KeyCode::Space) || is_key_down(KeyCode::Up),
        }
    }
}

pub struct PlayState {
    pub world: World,
    player: Entity,
    spawn_point: Vec2,
    accumulator: f32,
    ticks: u64,
}

impl PlayState {
    pub fn new(spawn_point: Vec2) -> Self {
        let mut world = World::with_floor(FLOOR_Y);
        let player = world.spawn_body(Self::player_body(spawn_point));
        Self {
            world,
            player,
            spawn_point,
            accumulator: 0.0,
            ticks: 0,
        }
    }

    fn player_body(position: Vec2) -> Body {
        let mut body = Body::at(position);
        body.radius = PLAYER_RADIUS;
        body.acceleration.y = PLAYER_GRAVITY;
        body
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn player_body_ref(&self) -> Option<&Body> {
        self.world.body(self.player)
    }

    pub fn player_alive(&self) -> bool {
        self.player_body_ref().is_some_and(|b| b.alive)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Replace the player with a fresh body; enemies chasing the old one despawn
    pub fn respawn_player(&mut self) {
        self.world.despawn(self.player);
        self.player = self.world.spawn_body(Self::player_body(self.spawn_point));
        log::info!("Player respawned");
    }

    /// Load an enemy chasing the player and place it at `position`
    pub fn spawn_enemy(
        &mut self,
        content: &ContentProvider,
        uri: &ContentUri,
        position: Vec2,
    ) -> Result<(), LoadError> {
        let mut enemy = Enemy::new(self.player);
        enemy.load_from_uri(content, uri)?;
        enemy.body_mut().position = position;
        self.world.spawn_enemy(enemy);
        Ok(())
    }

    fn apply_input(&mut self, input: PlayerInput) {
        let Some(body) = self.world.body_mut(self.player) else {
            return;
        };
        if !body.alive {
            body.velocity.x = 0.0;
            return;
        }
        body.velocity.x = match (input.left, input.right) {
            (true, false) => -PLAYER_SPEED,
            (false, true) => PLAYER_SPEED,
            _ => 0.0,
        };
        if input.left != input.right {
            body.sprite_flipped_horizontal = input.left;
        }
        if input.jump && body.has_ground_contact {
            body.velocity.y = -PLAYER_JUMP_VELOCITY;
        }
    }

    /// Feed one frame's worth of time; returns the number of ticks run
    pub fn update(&mut self, input: PlayerInput, frame_time: f32) -> u32 {
        self.apply_input(input);
        self.accumulator += frame_time.max(0.0);

        let mut ticks = 0;
        while self.accumulator >= FIXED_TIME_STEP && ticks < MAX_TICKS_PER_FRAME {
            self.world.step(FIXED_TIME_STEP);
            self.accumulator -= FIXED_TIME_STEP;
            ticks += 1;
        }
        if ticks == MAX_TICKS_PER_FRAME {
            self.accumulator = 0.0;
        }
        self.ticks += ticks as u64;
        ticks
    }

    pub fn draw(&self) {
        clear_background(Color::from_rgba(24, 20, 37, 255));
        draw_line(0.0, FLOOR_Y, screen_width(), FLOOR_Y, 2.0, GRAY);

        if let Some(body) = self.player_body_ref() {
            let color = if body.alive { SKYBLUE } else { DARKGRAY };
            draw_circle(body.position.x, body.position.y, body.radius, color);
        }

        for enemy in self.world.enemies() {
            let poses = enemy.base().poses();
            if poses.is_empty() {
                let body = enemy.body();
                draw_circle_lines(body.position.x, body.position.y, body.radius, 1.0, RED);
            }
            for pose in &poses {
                draw_part(pose);
            }
        }

        let status = if self.player_alive() { "" } else { "  caught! press R" };
        draw_text(
            &format!("enemies: {}{}", self.world.enemy_count(), status),
            12.0,
            24.0,
            20.0,
            WHITE,
        );
    }
}

fn draw_part(pose: &PartPose) {
    draw_rectangle_ex(
        pose.position.x,
        pose.position.y,
        pose.size.x,
        pose.size.y,
        DrawRectangleParams {
            offset: vec2(0.5, 0.5),
            rotation: pose.rotation,
            color: ORANGE,
        },
    );
}
