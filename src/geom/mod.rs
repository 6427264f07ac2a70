//! Angles and planar positions shared by every simulation module

pub mod angle;
pub mod position;

pub use angle::{Angle, Rotation};
pub use position::Position;
