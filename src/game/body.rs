//! Physics body shared by every moving entity

use macroquad::math::Vec2;

/// Motion state, liveness and contact flags of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Collision radius (also the catch distance for enemies)
    pub radius: f32,
    pub alive: bool,
    /// Set by floor collision, cleared when airborne
    pub has_ground_contact: bool,
    pub sprite_flipped_horizontal: bool,
    pub drawing_scale: f32,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            radius: 16.0,
            alive: true,
            has_ground_contact: false,
            sprite_flipped_horizontal: false,
            drawing_scale: 1.0,
        }
    }
}

impl Body {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Advance velocity then position (semi-implicit Euler)
    pub fn integrate(&mut self, time_step: f32) {
        self.velocity += self.acceleration * time_step;
        self.position += self.velocity * time_step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroquad::math::vec2;

    #[test]
    fn test_integrate() {
        let mut body = Body::at(vec2(10.0, 0.0));
        body.velocity = vec2(2.0, 0.0);
        body.acceleration = vec2(0.0, 10.0);

        body.integrate(0.5);
        assert_eq!(body.velocity, vec2(2.0, 5.0));
        assert_eq!(body.position, vec2(11.0, 2.5));
    }

    #[test]
    fn test_zero_step_is_noop() {
        let mut body = Body::at(vec2(1.0, 2.0));
        body.acceleration = vec2(3.0, 4.0);
        let before = body.clone();
        body.integrate(0.0);
        assert_eq!(body, before);
    }
}
