//! Articulated entities
//!
//! An articulated entity is a body drawn as a small tree of sprite parts,
//! posed by an animation clip. Both the part layout and the clip are loaded
//! from RON resources through the content provider:
//!
//! ```ron
//! (
//!     parts: [
//!         (name: "torso", sprite: "crawler_torso", offset: (0.0, 0.0), size: (28.0, 18.0)),
//!         (name: "head", sprite: "crawler_head", parent: Some(0),
//!             offset: (12.0, -8.0), size: (14.0, 14.0)),
//!     ],
//! )
//! ```
//!
//! Part offsets are relative to the parent part (or the body centre for root
//! parts) and are rotated by the parent's animated rotation.

use macroquad::math::{vec2, Vec2};
use serde::{Deserialize, Serialize};

use super::animation::{AnimationClip, AnimationPlayer};
use super::body::Body;
use super::LoadError;
use crate::content::{ContentProvider, ContentUri};

/// A steppable, animatable physics entity that can be loaded from content
pub trait Articulated {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    /// Advance position and velocity from acceleration
    fn step(&mut self, time_step: f32);

    /// Advance animation playback
    fn step_animation(&mut self, time_step: f32);

    /// Load the part layout
    fn load_from_uri(
        &mut self,
        content: &ContentProvider,
        uri: &ContentUri,
    ) -> Result<(), LoadError>;

    /// Load the animation clip
    fn load_animation_from_uri(
        &mut self,
        content: &ContentProvider,
        uri: &ContentUri,
    ) -> Result<(), LoadError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub name: String,
    pub sprite: String,
    /// Index of an earlier part, None for parts attached to the body
    #[serde(default)]
    pub parent: Option<usize>,
    #[serde(default)]
    pub offset: (f32, f32),
    pub size: (f32, f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub parts: Vec<Part>,
}

impl EntityDefinition {
    pub fn from_ron(contents: &str) -> Result<Self, LoadError> {
        let def: EntityDefinition =
            ron::from_str(contents).map_err(|e| LoadError::Parse(e.to_string()))?;
        if def.parts.is_empty() {
            return Err(LoadError::Invalid("entity has no parts".into()));
        }
        for (i, part) in def.parts.iter().enumerate() {
            if let Some(parent) = part.parent {
                if parent >= i {
                    return Err(LoadError::Invalid(format!(
                        "part '{}' has parent {} which is not an earlier part",
                        part.name, parent
                    )));
                }
            }
        }
        Ok(def)
    }
}

fn read_resource(content: &ContentProvider, uri: &ContentUri) -> Result<String, LoadError> {
    content
        .read_to_string(uri)
        .ok_or_else(|| LoadError::Unresolved(uri.to_string()))
}

fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    vec2(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Resolved placement of one part for drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartPose {
    /// World position of the part's anchor
    pub position: Vec2,
    /// Accumulated rotation (radians)
    pub rotation: f32,
    /// Scaled size
    pub size: Vec2,
}

/// Default articulated entity: a body, its parts and an animation player
#[derive(Debug, Clone, Default)]
pub struct ArticulatedEntity {
    pub body: Body,
    parts: Vec<Part>,
    animation: AnimationPlayer,
}

impl ArticulatedEntity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn animation(&self) -> &AnimationPlayer {
        &self.animation
    }

    /// World placement of every part, honouring sprite flip and drawing scale
    pub fn poses(&self) -> Vec<PartPose> {
        let flip = if self.body.sprite_flipped_horizontal { -1.0 } else { 1.0 };
        let scale = self.body.drawing_scale;
        let mut poses: Vec<PartPose> = Vec::with_capacity(self.parts.len());
        for (i, part) in self.parts.iter().enumerate() {
            let local = vec2(part.offset.0 * flip, part.offset.1) * scale;
            let own = self.animation.rotation(i) * flip;
            let pose = match part.parent.and_then(|p| poses.get(p)) {
                Some(parent) => PartPose {
                    position: parent.position + rotate(local, parent.rotation),
                    rotation: parent.rotation + own,
                    size: vec2(part.size.0, part.size.1) * scale,
                },
                None => PartPose {
                    position: self.body.position + local,
                    rotation: own,
                    size: vec2(part.size.0, part.size.1) * scale,
                },
            };
            poses.push(pose);
        }
        poses
    }

    fn check_part_count(&self, clip: &AnimationClip) -> Result<(), LoadError> {
        if !self.parts.is_empty() && clip.part_count() != self.parts.len() {
            return Err(LoadError::Invalid(format!(
                "animation drives {} parts but the entity has {}",
                clip.part_count(),
                self.parts.len()
            )));
        }
        Ok(())
    }
}

impl Articulated for ArticulatedEntity {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn step(&mut self, time_step: f32) {
        self.body.integrate(time_step);
    }

    fn step_animation(&mut self, time_step: f32) {
        self.animation.advance(time_step);
    }

    fn load_from_uri(
        &mut self,
        content: &ContentProvider,
        uri: &ContentUri,
    ) -> Result<(), LoadError> {
        let def = EntityDefinition::from_ron(&read_resource(content, uri)?)?;
        self.parts = def.parts;
        if let Some(clip) = self.animation.clip() {
            self.check_part_count(clip)?;
        }
        log::debug!("Loaded entity {} ({} parts)", uri, self.parts.len());
        Ok(())
    }

    fn load_animation_from_uri(
        &mut self,
        content: &ContentProvider,
        uri: &ContentUri,
    ) -> Result<(), LoadError> {
        let clip = AnimationClip::from_ron(&read_resource(content, uri)?)?;
        self.check_part_count(&clip)?;
        log::debug!("Loaded animation {} ({} frames)", uri, clip.frames.len());
        self.animation.set_clip(clip)
    }
}
