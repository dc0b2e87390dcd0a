use crate::{ARENA_HEIGHT, ARENA_WIDTH};
use serde::{Deserialize, Serialize};

///Represents a point or direction in arena space.
/// Positive x is to the right, positive y is down (canvas coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Vector2 { x, y }
    }

    ///Returns the unit vector pointing along `angle` (radians).
    pub fn from_angle(angle: f32) -> Self {
        Vector2 {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    ///Returns the magnitude of the vector.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    ///Returns the normalized vector. The zero vector stays zero.
    pub fn normalize(&self) -> Vector2 {
        let mag = self.magnitude();
        if mag == 0.0 {
            Vector2::ZERO
        } else {
            Vector2 {
                x: self.x / mag,
                y: self.y / mag,
            }
        }
    }

    ///Returns the scaled vector.
    pub fn scale(&self, scalar: f32) -> Vector2 {
        Vector2 {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    ///Returns the sum of two vectors.
    pub fn add(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    ///Returns `self - other`.
    pub fn sub(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn distance(&self, other: &Vector2) -> f32 {
        self.sub(other).magnitude()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Clamps the centre of a circle so the whole circle stays inside the arena.
pub fn clamp_to_arena(position: Vector2, radius: f32) -> Vector2 {
    Vector2 {
        x: position.x.max(radius).min(ARENA_WIDTH - radius),
        y: position.y.max(radius).min(ARENA_HEIGHT - radius),
    }
}

/// True when any part of the circle lies beyond an arena edge.
pub fn is_outside_arena(position: Vector2, radius: f32) -> bool {
    position.x - radius < 0.0
        || position.x + radius > ARENA_WIDTH
        || position.y - radius < 0.0
        || position.y + radius > ARENA_HEIGHT
}

/// True when the circle is further than `margin` outside every arena edge it crossed.
pub fn is_beyond_margin(position: Vector2, margin: f32) -> bool {
    position.x < -margin
        || position.x > ARENA_WIDTH + margin
        || position.y < -margin
        || position.y > ARENA_HEIGHT + margin
}

pub fn circles_overlap(a: Vector2, radius_a: f32, b: Vector2, radius_b: f32) -> bool {
    a.distance(&b) < radius_a + radius_b
}
