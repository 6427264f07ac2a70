//! Race layouts: scenery, starting grid and waypoint loop

use crate::geom::{Angle, Position};
use crate::sim::navigation::PacingConfig;
use crate::sim::params::VehicleParameters;
use crate::sim::scene::Obstacle;
use crate::sim::waypoint::Waypoint;

/// Where a vehicle starts and how it is tuned
#[derive(Debug, Clone)]
pub struct VehicleSpawn {
    pub position: Position,
    pub heading: Angle,
    pub params: VehicleParameters,
}

impl VehicleSpawn {
    pub fn new(position: Position, heading: Angle, params: VehicleParameters) -> Self {
        Self {
            position,
            heading,
            params,
        }
    }
}

/// Everything needed to (re)build a race
#[derive(Debug, Clone)]
pub struct RaceSetup {
    pub obstacles: Vec<Obstacle>,
    pub player: Option<VehicleSpawn>,
    pub rivals: Vec<VehicleSpawn>,
    pub waypoints: Vec<Waypoint>,
    pub pacing: PacingConfig,
    /// Milliseconds before the race goes live; zero starts immediately
    pub start_delay_ms: u32,
}

impl RaceSetup {
    /// An empty layout with default pacing and no start delay
    pub fn new() -> Self {
        Self {
            obstacles: Vec::new(),
            player: None,
            rivals: Vec::new(),
            waypoints: Vec::new(),
            pacing: PacingConfig::default(),
            start_delay_ms: 0,
        }
    }

    pub fn with_start_delay(mut self, start_delay_ms: u32) -> Self {
        self.start_delay_ms = start_delay_ms;
        self
    }

    pub fn with_lap_count(mut self, lap_count: u8) -> Self {
        self.pacing.lap_count = lap_count;
        self
    }

    /// Walled rectangular arena with an inner island, a player and three
    /// rivals on the grid and a four-waypoint loop around the island.
    pub fn default_circuit(params: VehicleParameters) -> Self {
        let mut obstacles = Vec::new();
        let wall = |x: i32, y: i32, heading: i32| {
            Obstacle::new(Position::new(x as f32, y as f32), Angle::new(heading))
        };

        // outer walls
        for i in 1..12 {
            obstacles.push(wall(30, i * 80 + 60, 0));
        }
        for i in 1..12 {
            obstacles.push(wall(1430, i * 80 + 60, 0));
        }
        for i in 1..17 {
            obstacles.push(wall(i * 80 + 40, 30, 90));
        }
        for i in 1..17 {
            obstacles.push(wall(i * 80 + 40, 1070, 90));
        }

        // corners
        obstacles.push(wall(50, 60, 135));
        obstacles.push(wall(1400, 60, 45));
        obstacles.push(wall(50, 1020, 45));
        obstacles.push(wall(1400, 1020, 135));

        // island
        for i in 1..5 {
            obstacles.push(wall(400, i * 80 + 340, 0));
        }
        for i in 1..5 {
            obstacles.push(wall(1070, i * 80 + 340, 0));
        }
        for i in 1..9 {
            obstacles.push(wall(i * 80 + 380, 350, 90));
        }
        for i in 1..9 {
            obstacles.push(wall(i * 80 + 380, 730, 90));
        }

        let grid = Angle::new(90);
        let player = VehicleSpawn::new(Position::new(700.0, 850.0), grid, params.clone());
        let rivals = vec![
            VehicleSpawn::new(
                Position::new(850.0, 950.0),
                grid,
                params.clone().with_engine_power(0.4),
            ),
            VehicleSpawn::new(
                Position::new(850.0, 850.0),
                grid,
                params.clone().with_engine_power(0.2),
            ),
            VehicleSpawn::new(Position::new(700.0, 950.0), grid, params),
        ];

        let waypoints = [(1210.0, 860.0), (1210.0, 220.0), (260.0, 220.0), (260.0, 860.0)]
            .into_iter()
            .map(|(x, y)| Waypoint::new(Position::new(x, y), 190, 100.0).with_speed_min(10.0))
            .collect();

        Self {
            obstacles,
            player: Some(player),
            rivals,
            waypoints,
            pacing: PacingConfig::default(),
            start_delay_ms: 1_000,
        }
    }
}

impl Default for RaceSetup {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_circuit_layout() {
        let setup = RaceSetup::default_circuit(VehicleParameters::default());

        assert_eq!(setup.obstacles.len(), 11 * 2 + 16 * 2 + 4 + 4 * 2 + 8 * 2);
        assert_eq!(setup.rivals.len(), 3);
        assert_eq!(setup.waypoints.len(), 4);
        assert_eq!(setup.start_delay_ms, 1_000);
        assert_eq!(setup.pacing, PacingConfig::default());

        let engines: Vec<f32> = setup.rivals.iter().map(|r| r.params.engine_power).collect();
        assert_eq!(engines, vec![0.4, 0.2, 0.3]);
        assert!(setup.waypoints.iter().all(|w| w.speed_min == Some(10.0)));
    }

    #[test]
    fn builders_override_defaults() {
        let setup = RaceSetup::new().with_start_delay(250).with_lap_count(2);
        assert_eq!(setup.start_delay_ms, 250);
        assert_eq!(setup.pacing.lap_count, 2);
        assert!(setup.player.is_none());
    }
}
