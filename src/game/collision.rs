//! Floor Collision
//!
//! Levels are out of scope here, so the only solid surface is a flat floor
//! at a fixed height. Bodies are circles of `radius` centred on `position`.

use super::body::Body;

/// Resolve `body` against a floor at `floor_y`
///
/// A body reaching the floor is pushed back onto it. It only counts as
/// grounded while it is not moving upward, so a jump impulse applied this
/// tick carries it off the floor. Returns the new contact state.
pub fn collide_floor(body: &mut Body, floor_y: f32) -> bool {
    let feet = body.position.y + body.radius;
    if feet >= floor_y {
        body.position.y = floor_y - body.radius;
        if body.velocity.y > 0.0 {
            body.velocity.y = 0.0;
        }
        body.has_ground_contact = body.velocity.y >= 0.0;
    } else {
        body.has_ground_contact = false;
    }
    body.has_ground_contact
}
