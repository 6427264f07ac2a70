//! Planar positions and the isometric projection used by the track art

use serde::{Deserialize, Serialize};

/// A point in world units (pixels; the meter scale lives in `PhysicsConfig`)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to_xy(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn distance(&self, other: Position) -> f32 {
        self.distance_to_xy(other.x, other.y)
    }

    pub fn to_isometric(self) -> Self {
        Self::new(self.x / 2.0 - self.y, self.x / 4.0 + self.y / 2.0)
    }

    pub fn to_orthogonal(self) -> Self {
        Self::new(self.y - self.x / 2.0, self.x + 2.0 * self.y)
    }
}
