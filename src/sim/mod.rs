//! Race simulation: vehicles, scenery, collisions and AI drivers

pub mod collision;
pub mod controls;
pub mod navigation;
pub mod params;
pub mod physics;
pub mod scene;
pub mod vehicle;
pub mod waypoint;

pub use collision::{CollisionSystem, Contact};
pub use controls::ControlFlags;
pub use navigation::{NavigationController, NavigationEvent, NavigationState, PacingConfig};
pub use params::{ParamsError, VehicleParameters};
pub use physics::{PhysicsConfig, PhysicsSystem};
pub use scene::{Entity, EntityId, Footprint, Obstacle, Scene};
pub use vehicle::Vehicle;
pub use waypoint::Waypoint;
