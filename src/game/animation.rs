//! Animation clips
//!
//! A clip is a list of keyframes, each holding one rotation (radians) per
//! entity part, played back at a fixed frame duration. Rotations are
//! interpolated linearly between neighbouring frames.
//!
//! ```ron
//! (
//!     frame_duration: 0.15,
//!     looping: true,
//!     frames: [
//!         (rotations: [0.0, 0.2, -0.2]),
//!         (rotations: [0.0, -0.2, 0.2]),
//!     ],
//! )
//! ```

use serde::{Deserialize, Serialize};

use super::LoadError;

fn default_looping() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub rotations: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    /// Seconds per keyframe
    pub frame_duration: f32,
    #[serde(default = "default_looping")]
    pub looping: bool,
    pub frames: Vec<Keyframe>,
}

impl AnimationClip {
    /// Parse and validate a clip
    pub fn from_ron(contents: &str) -> Result<Self, LoadError> {
        let clip: AnimationClip =
            ron::from_str(contents).map_err(|e| LoadError::Parse(e.to_string()))?;
        clip.validate()?;
        Ok(clip)
    }

    fn validate(&self) -> Result<(), LoadError> {
        if !(self.frame_duration > 0.0) {
            return Err(LoadError::Invalid(format!(
                "frame_duration must be positive, got {}",
                self.frame_duration
            )));
        }
        let Some(first) = self.frames.first() else {
            return Err(LoadError::Invalid("animation has no frames".into()));
        };
        let parts = first.rotations.len();
        if let Some(i) = self.frames.iter().position(|f| f.rotations.len() != parts) {
            return Err(LoadError::Invalid(format!(
                "frame {} has {} rotations, expected {}",
                i,
                self.frames[i].rotations.len(),
                parts
            )));
        }
        Ok(())
    }

    /// Number of parts each frame animates
    pub fn part_count(&self) -> usize {
        self.frames.first().map_or(0, |f| f.rotations.len())
    }

    pub fn duration(&self) -> f32 {
        self.frames.len() as f32 * self.frame_duration
    }
}

/// Playback state for one clip
#[derive(Debug, Clone, Default)]
pub struct AnimationPlayer {
    clip: Option<AnimationClip>,
    time: f32,
}

impl AnimationPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clip and rewind
    ///
    /// The clip is validated first; on error the current clip is kept.
    pub fn set_clip(&mut self, clip: AnimationClip) -> Result<(), LoadError> {
        clip.validate()?;
        self.clip = Some(clip);
        self.time = 0.0;
        Ok(())
    }

    pub fn clip(&self) -> Option<&AnimationClip> {
        self.clip.as_ref()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn advance(&mut self, time_step: f32) {
        let Some(clip) = &self.clip else {
            return;
        };
        let duration = clip.duration();
        self.time += time_step;
        if clip.looping {
            self.time = self.time.rem_euclid(duration);
        } else {
            self.time = self.time.clamp(0.0, duration);
        }
    }

    /// Non-looping clip has reached its last frame
    pub fn is_finished(&self) -> bool {
        match &self.clip {
            Some(clip) => !clip.looping && self.time >= clip.duration(),
            None => true,
        }
    }

    /// (current frame, next frame, blend factor)
    fn cursor(&self, clip: &AnimationClip) -> (usize, usize, f32) {
        let count = clip.frames.len();
        let t = self.time / clip.frame_duration;
        let index = t.floor() as usize;
        let blend = t - t.floor();
        if clip.looping {
            let index = index % count;
            (index, (index + 1) % count, blend)
        } else if index + 1 >= count {
            (count - 1, count - 1, 0.0)
        } else {
            (index, index + 1, blend)
        }
    }

    pub fn frame_index(&self) -> Option<usize> {
        self.clip.as_ref().map(|clip| self.cursor(clip).0)
    }

    /// Interpolated rotation of `part` (0.0 without a clip)
    pub fn rotation(&self, part: usize) -> f32 {
        let Some(clip) = &self.clip else {
            return 0.0;
        };
        let (current, next, blend) = self.cursor(clip);
        let a = clip.frames[current].rotations.get(part).copied().unwrap_or(0.0);
        let b = clip.frames[next].rotations.get(part).copied().unwrap_or(0.0);
        a + (b - a) * blend
    }
}
