//! Vehicle dynamics: control shaping and the tire-force integrator

use std::f32::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::geom::Angle;

use super::vehicle::{Vehicle, STEER_LIMIT};

/// Forward velocity below this magnitude is treated as zero when resolving
/// the drift angle
const LOCAL_SCALE: f32 = 0.0000001;

/// Gear whose motive force is always zero
pub const NO_DRIVE_GEAR: usize = 1;

/// Gear without acceleration coupling in the yaw torque
pub const REVERSE_GEAR: usize = 0;

/// World constants shared by every vehicle in a race
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Number of pixels in a meter
    pub pixels_per_meter: f32,
    /// Rolling friction force
    pub friction: f32,
    /// Maximum lateral (sideways) grip force
    pub lateral_friction_max: f32,
    /// Maximum longitudinal (forward) grip force
    pub longitudinal_friction_max: f32,
    /// Maximum yaw torque at standstill
    pub yaw_friction_max: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            pixels_per_meter: 15.0,
            friction: 10.0,
            lateral_friction_max: 30.0,
            longitudinal_friction_max: 30.0,
            yaw_friction_max: 2.0,
        }
    }
}

/// Sign with `sign(0) == 0`
pub(crate) fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn clamp_magnitude(value: f32, max: f32) -> f32 {
    if value.abs() > max {
        max * sign(value)
    } else {
        value
    }
}

/// Stateless integrator over [`Vehicle`] state
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Move pedals, steering and gear toward the held control flags.
    ///
    /// Holding both flags of an opposing pair freezes that axis.
    pub fn apply_controls(vehicle: &mut Vehicle, seconds: f32, config: &PhysicsConfig) {
        let rate = vehicle.params.control_sensitivity * config.pixels_per_meter;
        let step = seconds * rate;
        let controls = vehicle.controls;

        if !(controls.gas && controls.brake) {
            vehicle.throttle = if controls.gas {
                (vehicle.throttle + step).min(1.0)
            } else {
                (vehicle.throttle - step).max(0.0)
            };

            vehicle.brake = if controls.brake {
                (vehicle.brake + step).min(1.0)
            } else {
                (vehicle.brake - step).max(0.0)
            };
        }

        if !(controls.left && controls.right) {
            vehicle.steer = if controls.left {
                (vehicle.steer - step).max(-STEER_LIMIT)
            } else if controls.right {
                (vehicle.steer + step).min(STEER_LIMIT)
            } else if vehicle.steer.abs() < rate {
                0.0
            } else {
                vehicle.steer - step * sign(vehicle.steer)
            };
        }

        if !(controls.gear_up && controls.gear_down) {
            if controls.gear_up {
                if vehicle.gear + 1 < vehicle.params.gear_count() {
                    vehicle.gear += 1;
                }
            } else if controls.gear_down && vehicle.gear > 0 {
                vehicle.gear -= 1;
            }
        }
    }

    /// Integrate forces over `seconds`, which must be positive.
    ///
    /// Does nothing while the current gear is neutral (multiplier exactly 0):
    /// velocity, heading and position all stay frozen.
    pub fn advance(vehicle: &mut Vehicle, seconds: f32, config: &PhysicsConfig) {
        let gear = vehicle.gear;
        let gear_acceleration = vehicle.params.gear_acceleration(gear);
        if gear_acceleration == 0.0 {
            return;
        }

        let ppm = config.pixels_per_meter;
        let heading = vehicle.heading.to_radians() as f32;
        let speed_max = vehicle.params.speed_max * ppm;
        let friction = config.friction * ppm;
        let lateral_max = config.lateral_friction_max * ppm;
        let longitudinal_max = config.longitudinal_friction_max * ppm;
        let yaw_max = config.yaw_friction_max * ppm;
        let turning_radius = vehicle.params.turning_radius * ppm;
        let distance_racg = vehicle.params.distance_racg * ppm;
        let damper_stiffness = vehicle.params.damper_stiffness * ppm;
        let engine_power = vehicle.params.engine_power;

        let (speed_x, speed_y) = (vehicle.speed_x, vehicle.speed_y);

        // Velocity direction relative to the heading
        let mut drift = if speed_y > LOCAL_SCALE {
            (speed_x / speed_y).atan()
        } else if speed_y < -LOCAL_SCALE {
            PI + (speed_x / speed_y).atan()
        } else {
            FRAC_PI_2 * sign(speed_x)
        };
        drift -= heading;

        let speed = (speed_x * speed_x + speed_y * speed_y).sqrt();
        let local_speed_x = -speed * drift.sin();
        let local_speed_y = speed * drift.cos();

        let mut local_force_y = if gear == NO_DRIVE_GEAR {
            0.0
        } else {
            (gear_acceleration * speed_max * vehicle.throttle - local_speed_y) * engine_power
                / gear_acceleration.powi(2)
        };
        local_force_y -= (vehicle.brake / seconds * local_force_y.powi(2) + friction)
            * sign(local_speed_y);

        let local_force_x = (-local_speed_y * vehicle.steer * distance_racg / turning_radius
            - local_speed_x)
            / seconds;

        let local_force_x = clamp_magnitude(local_force_x, lateral_max);
        let local_force_y = clamp_magnitude(local_force_y, longitudinal_max);

        let coupling = if gear == REVERSE_GEAR {
            0.0
        } else {
            2.0 / (gear_acceleration.abs() * speed_max)
        };

        let mut torque = (vehicle.steer * local_speed_y / turning_radius - vehicle.yaw_velocity
            + local_speed_x * vehicle.throttle * coupling)
            / seconds;
        // Fast vehicles turn less sharply
        let torque_max = yaw_max * (speed_max - local_speed_y) / speed_max;
        if torque.abs() > torque_max {
            torque = sign(torque) * torque_max;
        }

        let k = seconds * vehicle.params.l_slope;
        vehicle.l_slope = vehicle.l_slope * (1.0 - k)
            + local_force_y / (longitudinal_max * damper_stiffness * vehicle.params.height) * k;
        let k = seconds * vehicle.params.w_slope;
        vehicle.w_slope = vehicle.w_slope * (1.0 - k)
            + local_force_x / (lateral_max * damper_stiffness * vehicle.params.width) * k;

        let (sin, cos) = heading.sin_cos();
        let force_y = local_force_y * cos + local_force_x * sin;
        let force_x = local_force_y * sin - local_force_x * cos;

        vehicle.yaw_velocity += torque * seconds;
        vehicle.speed_x += force_x * seconds;
        vehicle.speed_y += force_y * seconds;

        vehicle.heading = Angle::from_radians((heading + vehicle.yaw_velocity * seconds) as f64);

        vehicle.position.x += vehicle.speed_x * seconds;
        vehicle.position.y += vehicle.speed_y * seconds;

        vehicle.speed = speed / ppm;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Position;
    use crate::sim::controls::ControlFlags;
    use crate::sim::params::VehicleParameters;

    const TICK: f32 = 0.033;

    fn car() -> Vehicle {
        Vehicle::new(Position::new(500.0, 500.0), Angle::new(90), VehicleParameters::default())
    }

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(3.0), 1.0);
        assert_eq!(sign(-0.1), -1.0);
    }

    #[test]
    fn gas_and_brake_together_freeze_pedals() {
        let config = PhysicsConfig::default();
        let mut vehicle = car();
        vehicle.controls = ControlFlags::GAS;
        PhysicsSystem::apply_controls(&mut vehicle, 0.01, &config);
        let throttle = vehicle.throttle();
        assert!(throttle > 0.0);

        vehicle.controls = ControlFlags::GAS | ControlFlags::BRAKE;
        PhysicsSystem::apply_controls(&mut vehicle, TICK, &config);
        assert_eq!(vehicle.throttle(), throttle);
        assert_eq!(vehicle.brake(), 0.0);
    }

    #[test]
    fn pedals_and_steering_stay_clamped() {
        let config = PhysicsConfig::default();
        let mut vehicle = car();
        vehicle.controls = ControlFlags::GAS | ControlFlags::LEFT;
        for _ in 0..10 {
            PhysicsSystem::apply_controls(&mut vehicle, TICK, &config);
        }
        assert_eq!(vehicle.throttle(), 1.0);
        assert_eq!(vehicle.steer(), -STEER_LIMIT);

        vehicle.controls = ControlFlags::BRAKE | ControlFlags::RIGHT;
        for _ in 0..10 {
            PhysicsSystem::apply_controls(&mut vehicle, TICK, &config);
        }
        assert_eq!(vehicle.throttle(), 0.0);
        assert_eq!(vehicle.brake(), 1.0);
        assert_eq!(vehicle.steer(), STEER_LIMIT);
    }

    #[test]
    fn left_and_right_together_freeze_steering() {
        let config = PhysicsConfig::default();
        let mut vehicle = car();
        vehicle.controls = ControlFlags::RIGHT;
        PhysicsSystem::apply_controls(&mut vehicle, 0.01, &config);
        let steer = vehicle.steer();

        vehicle.controls = ControlFlags::LEFT | ControlFlags::RIGHT;
        PhysicsSystem::apply_controls(&mut vehicle, TICK, &config);
        assert_eq!(vehicle.steer(), steer);

        // released steering recentres
        vehicle.controls = ControlFlags::NONE;
        PhysicsSystem::apply_controls(&mut vehicle, TICK, &config);
        assert_eq!(vehicle.steer(), 0.0);
    }

    #[test]
    fn gear_shifts_stay_in_table() {
        let config = PhysicsConfig::default();
        let mut vehicle = car();
        assert_eq!(vehicle.gear(), 4);

        vehicle.controls = ControlFlags::GEAR_UP;
        for _ in 0..5 {
            PhysicsSystem::apply_controls(&mut vehicle, TICK, &config);
        }
        assert_eq!(vehicle.gear(), 5);

        vehicle.controls = ControlFlags::GEAR_UP | ControlFlags::GEAR_DOWN;
        PhysicsSystem::apply_controls(&mut vehicle, TICK, &config);
        assert_eq!(vehicle.gear(), 5);

        vehicle.controls = ControlFlags::GEAR_DOWN;
        for _ in 0..10 {
            PhysicsSystem::apply_controls(&mut vehicle, TICK, &config);
        }
        assert_eq!(vehicle.gear(), 0);
    }

    #[test]
    fn neutral_gear_freezes_motion() {
        let config = PhysicsConfig::default();
        let mut params = VehicleParameters::default();
        params.gears_acceleration[4] = 0.0;
        let mut vehicle = Vehicle::new(Position::new(10.0, 10.0), Angle::new(45), params);
        vehicle.set_velocity(120.0, -40.0);
        vehicle.controls = ControlFlags::GAS | ControlFlags::LEFT;

        for _ in 0..20 {
            vehicle.update(33, &config);
        }

        assert_eq!(vehicle.position, Position::new(10.0, 10.0));
        assert_eq!(vehicle.heading, Angle::new(45));
        assert_eq!(vehicle.velocity(), (120.0, -40.0));
        // controls are still shaped
        assert_eq!(vehicle.throttle(), 1.0);
    }

    #[test]
    fn throttle_accelerates_along_heading() {
        let config = PhysicsConfig::default();
        let mut vehicle = car();
        vehicle.controls = ControlFlags::GAS;

        let mut previous_x = vehicle.position.x;
        for _ in 0..30 {
            vehicle.update(33, &config);
            assert!(vehicle.position.x > previous_x);
            previous_x = vehicle.position.x;
        }

        // heading 90 drives along +x
        assert!((vehicle.position.y - 500.0).abs() < 1.0);
        assert!(vehicle.speed() > 0.0);
        assert_eq!(vehicle.heading, Angle::new(90));
    }

    #[test]
    fn friction_brings_coasting_vehicle_to_rest_direction() {
        let config = PhysicsConfig::default();
        let mut vehicle = car();
        vehicle.controls = ControlFlags::GAS;
        for _ in 0..30 {
            vehicle.update(33, &config);
        }
        let (cruise, _) = vehicle.velocity();

        vehicle.controls = ControlFlags::BRAKE;
        for _ in 0..5 {
            vehicle.update(33, &config);
        }
        let (braked, _) = vehicle.velocity();
        assert!(braked < cruise);
    }

    #[test]
    fn steering_turns_a_moving_vehicle() {
        let config = PhysicsConfig::default();
        let mut vehicle = car();
        vehicle.controls = ControlFlags::GAS;
        for _ in 0..30 {
            vehicle.update(33, &config);
        }

        vehicle.controls = ControlFlags::GAS | ControlFlags::RIGHT;
        for _ in 0..30 {
            vehicle.update(33, &config);
        }
        assert_ne!(vehicle.heading, Angle::new(90));
    }

    #[test]
    fn suspension_slopes_follow_load() {
        let config = PhysicsConfig::default();
        let mut vehicle = car();
        assert_eq!(vehicle.suspension_slopes(), (0.0, 0.0));

        vehicle.controls = ControlFlags::GAS;
        vehicle.update(33, &config);
        let (longitudinal, _) = vehicle.suspension_slopes();
        assert!(longitudinal > 0.0);
    }

    #[test]
    fn zero_elapsed_time_is_a_no_op() {
        let config = PhysicsConfig::default();
        let mut vehicle = car();
        vehicle.controls = ControlFlags::GAS;
        vehicle.update(0, &config);
        assert_eq!(vehicle.throttle(), 0.0);
        assert_eq!(vehicle.position, Position::new(500.0, 500.0));
    }
}
