//! Racing Sim - headless top-down arcade racing simulation
//!
//! The crate is split into:
//! - `geom`: whole-degree headings and planar positions
//! - `sim`: vehicle dynamics, collisions and the waypoint-following AI
//! - `race`: race setup, tick ordering and the real-time session loop
//! - `config`: environment-driven configuration for the binary

pub mod config;
pub mod geom;
pub mod race;
pub mod sim;
pub mod util;
