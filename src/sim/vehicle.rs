//! Driveable vehicles and their collision correction

use crate::geom::{Angle, Position, Rotation};

use super::controls::ControlFlags;
use super::params::{ParamsError, VehicleParameters};
use super::physics::{PhysicsConfig, PhysicsSystem};
use super::scene::{Footprint, DEFAULT_FOOTPRINT};

/// Gear a vehicle starts in
pub const DEFAULT_GEAR: usize = 4;

/// Steering position limit in either direction
pub const STEER_LIMIT: f32 = 0.5;

/// Heading change applied on every contact (degrees)
pub const CONTACT_NUDGE_DEGREES: i32 = 15;

/// A vehicle driven either by player input or by the navigation controller
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub position: Position,
    pub heading: Angle,
    pub footprint: Footprint,
    pub params: VehicleParameters,
    pub controls: ControlFlags,

    pub(crate) gear: usize,
    pub(crate) throttle: f32,
    pub(crate) brake: f32,
    pub(crate) steer: f32,
    pub(crate) yaw_velocity: f32,
    pub(crate) speed_x: f32,
    pub(crate) speed_y: f32,
    pub(crate) l_slope: f32,
    pub(crate) w_slope: f32,
    pub(crate) speed: f32,
}

impl Vehicle {
    pub fn new(position: Position, heading: Angle, params: VehicleParameters) -> Self {
        let gear = DEFAULT_GEAR.min(params.gear_count().saturating_sub(1));
        Self {
            position,
            heading,
            footprint: DEFAULT_FOOTPRINT,
            params,
            controls: ControlFlags::NONE,
            gear,
            throttle: 0.0,
            brake: 0.0,
            steer: 0.0,
            yaw_velocity: 0.0,
            speed_x: 0.0,
            speed_y: 0.0,
            l_slope: 0.0,
            w_slope: 0.0,
            speed: 0.0,
        }
    }

    pub fn with_footprint(mut self, footprint: Footprint) -> Self {
        self.footprint = footprint;
        self
    }

    /// Advance one frame of `elapsed_ms`; zero elapsed time does nothing
    pub fn update(&mut self, elapsed_ms: u32, config: &PhysicsConfig) {
        if elapsed_ms == 0 {
            return;
        }

        let seconds = elapsed_ms as f32 / 1000.0;
        PhysicsSystem::apply_controls(self, seconds, config);
        PhysicsSystem::advance(self, seconds, config);
    }

    pub fn gear(&self) -> usize {
        self.gear
    }

    pub fn set_gear(&mut self, gear: usize) -> Result<(), ParamsError> {
        let count = self.params.gear_count();
        if gear >= count {
            return Err(ParamsError::GearOutOfRange { gear, count });
        }
        self.gear = gear;
        Ok(())
    }

    /// Throttle pedal position in [0, 1]
    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    /// Brake pedal position in [0, 1]
    pub fn brake(&self) -> f32 {
        self.brake
    }

    /// Steering position in [-0.5, 0.5]
    pub fn steer(&self) -> f32 {
        self.steer
    }

    pub fn yaw_velocity(&self) -> f32 {
        self.yaw_velocity
    }

    /// World-frame velocity in pixels per second
    pub fn velocity(&self) -> (f32, f32) {
        (self.speed_x, self.speed_y)
    }

    pub fn set_velocity(&mut self, speed_x: f32, speed_y: f32) {
        self.speed_x = speed_x;
        self.speed_y = speed_y;
    }

    /// Speed in meters per second as of the last integration step
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Smoothed (longitudinal, lateral) suspension load
    pub fn suspension_slopes(&self) -> (f32, f32) {
        (self.l_slope, self.w_slope)
    }

    /// Bounce off an entity positioned at `other`.
    ///
    /// Turns the heading 15 degrees toward the direction pointing away from
    /// `other`, pushes the vehicle half a meter that way and halves its
    /// velocity.
    pub fn resolve_contact(&mut self, other: Position, config: &PhysicsConfig) {
        let dy = other.y - self.position.y;
        let dx = other.x - self.position.x;
        let distance = self.position.distance(other);

        let arc = Angle::from_radians((dy.abs() / distance).acos() as f64);
        let away = match (dy > 0.0, dx > 0.0) {
            (true, true) => arc + 180,
            (true, false) => Angle::new(180 - arc.degrees() as i32),
            (false, true) => Angle::new(360 - arc.degrees() as i32),
            (false, false) => arc,
        };

        if away.min_rotation(self.heading) == Rotation::Clockwise {
            self.heading += CONTACT_NUDGE_DEGREES;
        } else {
            self.heading -= CONTACT_NUDGE_DEGREES;
        }

        let (sin, cos) = away.to_radians().sin_cos();
        let push = config.pixels_per_meter * 0.5;
        self.position.x += sin as f32 * push;
        self.position.y += cos as f32 * push;

        self.speed_x /= 2.0;
        self.speed_y /= 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_gear_fits_short_tables() {
        let params = VehicleParameters {
            gears_acceleration: vec![-0.2, 0.5],
            ..VehicleParameters::default()
        };
        let mut vehicle = Vehicle::new(Position::default(), Angle::new(0), params);
        assert_eq!(vehicle.gear(), 1);
        assert!(vehicle.set_gear(0).is_ok());
        assert!(matches!(
            vehicle.set_gear(2),
            Err(ParamsError::GearOutOfRange { gear: 2, count: 2 })
        ));
    }

    #[test]
    fn contact_pushes_away_and_halves_velocity() {
        let config = PhysicsConfig::default();
        let mut vehicle = Vehicle::new(
            Position::new(100.0, 100.0),
            Angle::new(0),
            VehicleParameters::default(),
        );
        vehicle.set_velocity(40.0, 80.0);

        // obstacle straight ahead along +y
        vehicle.resolve_contact(Position::new(100.0, 150.0), &config);

        assert_eq!(vehicle.velocity(), (20.0, 40.0));
        assert!(vehicle.position.y < 100.0);
        assert!((vehicle.position.y - 92.5).abs() < 1e-3);
        assert!((vehicle.position.x - 100.0).abs() < 1e-3);
        assert!(vehicle.heading == Angle::new(15) || vehicle.heading == Angle::new(345));
    }

    #[test]
    fn contact_turns_toward_escape_direction() {
        let config = PhysicsConfig::default();
        let mut vehicle = Vehicle::new(
            Position::new(100.0, 100.0),
            Angle::new(90),
            VehicleParameters::default(),
        );

        // obstacle to the right (+x); escape direction is 270
        vehicle.resolve_contact(Position::new(150.0, 100.0), &config);
        assert!(vehicle.position.x < 100.0);
        assert!(vehicle.heading == Angle::new(75) || vehicle.heading == Angle::new(105));
    }
}
