//! Collision primitives
//!
//! Every sub-game uses special-cased geometry: axis-aligned boxes for the
//! runner, a circle against a gap window for the flyer, and a box test plus
//! reflection for the ball. This module holds the shared pieces.

use glam::Vec2;

/// Axis-aligned box in playfield coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box from its top-left corner and size
    pub fn from_corner(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap; boxes that merely touch do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        spans_overlap(self.min.x, self.max.x, other.min.x, other.max.x)
            && spans_overlap(self.min.y, self.max.y, other.min.y, other.max.y)
    }
}

/// Open-interval overlap of `[a_min, a_max]` and `[b_min, b_max]`
#[inline]
pub fn spans_overlap(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> bool {
    a_max > b_min && a_min < b_max
}

/// Whether a circle's vertical span (shrunk by `padding`) leaves the gap
/// window `[gap_top, gap_bottom]`
#[inline]
pub fn circle_outside_gap(center_y: f32, radius: f32, padding: f32, gap_top: f32, gap_bottom: f32) -> bool {
    center_y - radius + padding < gap_top || center_y + radius - padding > gap_bottom
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}
