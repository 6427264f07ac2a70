//! Waypoint-following AI drivers with rubber-band pacing against the player

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geom::{Angle, Position, Rotation};

use super::controls::ControlFlags;
use super::scene::{EntityId, Scene};
use super::vehicle::Vehicle;
use super::waypoint::Waypoint;

/// Distance subtracted from the remaining approach length in braking zones
const APPROACH_BUFFER: f32 = 100.0;

/// Race-wide pacing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Laps to complete before a vehicle finishes
    pub lap_count: u8,
    /// Lead distance at which pacing saturates
    pub distance_max: f32,
    /// Speed cap for a vehicle leading by `distance_max` or more
    pub speed_min: f32,
    /// Speed cap when level with the player
    pub speed_middle: f32,
    /// Speed cap for a vehicle trailing by `distance_max` or more
    pub speed_max: f32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            lap_count: 5,
            distance_max: 2000.0,
            speed_min: 20.0,
            speed_middle: 100.0,
            speed_max: 220.0,
        }
    }
}

impl PacingConfig {
    /// Target top speed for a vehicle `lead` units ahead of the player
    /// (negative when behind).
    ///
    /// Leaders are slowed toward `speed_min`, trailers sped up toward
    /// `speed_max`, both saturating at `distance_max`.
    pub fn target_speed(&self, lead: f32) -> f32 {
        let ratio = (lead.abs() / self.distance_max).min(1.0);

        if lead == 0.0 || ratio <= 0.0 {
            self.speed_middle
        } else if lead > 0.0 {
            if ratio >= 1.0 {
                self.speed_min
            } else {
                self.speed_middle - ratio * (self.speed_middle - self.speed_min)
            }
        } else if ratio >= 1.0 {
            self.speed_max
        } else {
            self.speed_middle + ratio * (self.speed_max - self.speed_middle)
        }
    }
}

/// Progress of one vehicle around the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NavigationState {
    /// Index of the waypoint being driven to; `None` once finished
    pub waypoint: Option<usize>,
    pub lap: u8,
}

impl NavigationState {
    pub fn starting_at(waypoint: Option<usize>) -> Self {
        Self { waypoint, lap: 0 }
    }

    pub fn is_finished(&self) -> bool {
        self.waypoint.is_none()
    }

    /// Waypoints passed in total, counting full laps
    pub fn progress(&self, waypoint_count: usize) -> Option<usize> {
        self.waypoint
            .map(|index| index + self.lap as usize * waypoint_count)
    }
}

/// What happened to a vehicle's navigation state during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationEvent {
    WaypointReached { vehicle: EntityId, next: usize },
    LapCompleted { vehicle: EntityId, lap: u8 },
    Finished { vehicle: EntityId },
}

enum Progress {
    Holding,
    Reached(usize),
    LapCompleted(u8),
    Finished,
}

/// Check containment and move on to the next waypoint.
///
/// Runs at most once per tick, so a vehicle never skips a waypoint even when
/// several overlap its position.
fn advance_waypoint(
    state: &mut NavigationState,
    position: Position,
    waypoints: &[Waypoint],
    lap_count: u8,
) -> Progress {
    let Some(index) = state.waypoint else {
        return Progress::Holding;
    };
    let Some(waypoint) = waypoints.get(index) else {
        return Progress::Holding;
    };
    if !waypoint.contains(position) {
        return Progress::Holding;
    }

    if state.lap > lap_count {
        state.waypoint = None;
        return Progress::Finished;
    }

    let next = index + 1;
    if next >= waypoints.len() {
        state.lap = state.lap.saturating_add(1);
        state.waypoint = Some(0);
        Progress::LapCompleted(state.lap)
    } else {
        state.waypoint = Some(next);
        Progress::Reached(next)
    }
}

fn progress_event(vehicle: EntityId, progress: Progress) -> Option<NavigationEvent> {
    match progress {
        Progress::Holding => None,
        Progress::Reached(next) => Some(NavigationEvent::WaypointReached { vehicle, next }),
        Progress::LapCompleted(lap) => Some(NavigationEvent::LapCompleted { vehicle, lap }),
        Progress::Finished => Some(NavigationEvent::Finished { vehicle }),
    }
}

/// Path distance by which a vehicle leads the player (negative when it
/// trails).
///
/// Sums waypoint-to-waypoint lengths between the two targets, then corrects
/// both ends by each side's remaining distance to its target. A vehicle on
/// the same waypoint and lap as the player scores 0, as does a vehicle when
/// either side has finished.
pub fn lead_distance(
    waypoints: &[Waypoint],
    vehicle: &NavigationState,
    vehicle_position: Position,
    player: &NavigationState,
    player_position: Position,
) -> f32 {
    let count = waypoints.len();
    let (Some(vehicle_index), Some(player_index)) = (vehicle.waypoint, player.waypoint) else {
        return 0.0;
    };
    let (Some(progress), Some(player_progress)) =
        (vehicle.progress(count), player.progress(count))
    else {
        return 0.0;
    };

    if progress == player_progress {
        return 0.0;
    }

    let vehicle_leads = progress > player_progress;
    let (trailer, leader) = if vehicle_leads {
        (
            (player_index, player_position, player_progress),
            (vehicle_index, vehicle_position, progress),
        )
    } else {
        (
            (vehicle_index, vehicle_position, progress),
            (player_index, player_position, player_progress),
        )
    };

    let path: f32 = (trailer.2..leader.2)
        .map(|i| {
            waypoints[i % count]
                .position
                .distance(waypoints[(i + 1) % count].position)
        })
        .sum();

    let lead = path + waypoints[trailer.0].position.distance(trailer.1)
        - waypoints[leader.0].position.distance(leader.1);

    if vehicle_leads {
        lead
    } else {
        -lead
    }
}

/// Target speed inside a braking zone, or `None` when the waypoint has no
/// minimum speed.
///
/// Interpolates from the waypoint's `speed_max` at the previous waypoint
/// down to `speed_min` close to it; not clamped.
pub fn approach_speed(waypoints: &[Waypoint], index: usize, position: Position) -> Option<f32> {
    let waypoint = waypoints.get(index)?;
    let speed_min = waypoint.speed_min?;

    let previous = if index == 0 {
        waypoints.len() - 1
    } else {
        index - 1
    };
    let segment = waypoint.position.distance(waypoints[previous].position);
    let remaining = waypoint.position.distance(position) - APPROACH_BUFFER;

    Some(speed_min + (waypoint.speed_max - speed_min) * remaining / segment)
}

/// Heading from `from` toward `to`; 0 points along +y, 90 along +x
pub fn bearing(from: Position, to: Position) -> Angle {
    let dy = (to.y - from.y) as f64;
    let dx = (to.x - from.x) as f64;
    Angle::new((90.0 - dy.atan2(dx).to_degrees()) as i32)
}

/// Steering flag that turns `heading` toward `target` the short way
pub fn steer_towards(heading: Angle, target: Angle) -> ControlFlags {
    match heading.min_rotation(target) {
        Rotation::Clockwise => ControlFlags::LEFT,
        Rotation::Counterclockwise => ControlFlags::RIGHT,
        Rotation::None => ControlFlags::NONE,
    }
}

/// Drives every registered AI vehicle around the waypoint loop.
///
/// The player is tracked the same way but only serves as the pacing
/// reference; its controls are never written.
#[derive(Debug, Clone)]
pub struct NavigationController {
    config: PacingConfig,
    waypoints: Vec<Waypoint>,
    vehicles: BTreeMap<EntityId, NavigationState>,
    player: Option<EntityId>,
    player_state: NavigationState,
}

impl NavigationController {
    pub fn new(config: PacingConfig, waypoints: Vec<Waypoint>) -> Self {
        Self {
            config,
            waypoints,
            vehicles: BTreeMap::new(),
            player: None,
            player_state: NavigationState::default(),
        }
    }

    pub fn config(&self) -> &PacingConfig {
        &self.config
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Track an AI vehicle, starting at `start` or the first waypoint.
    ///
    /// With no waypoints the vehicle starts finished and only ever brakes.
    pub fn add_vehicle(&mut self, id: EntityId, start: Option<usize>) {
        let waypoint = start
            .filter(|&index| index < self.waypoints.len())
            .or_else(|| self.first_waypoint());
        self.vehicles.insert(id, NavigationState::starting_at(waypoint));
    }

    pub fn add_player(&mut self, id: EntityId) {
        self.player = Some(id);
        self.player_state = NavigationState::starting_at(self.first_waypoint());
    }

    pub fn remove_vehicle(&mut self, id: EntityId) -> bool {
        self.vehicles.remove(&id).is_some()
    }

    pub fn vehicles(&self) -> Vec<EntityId> {
        self.vehicles.keys().copied().collect()
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    pub fn state(&self, id: EntityId) -> Option<&NavigationState> {
        self.vehicles.get(&id)
    }

    pub fn player_state(&self) -> &NavigationState {
        &self.player_state
    }

    pub fn is_finished(&self, id: EntityId) -> bool {
        self.vehicles
            .get(&id)
            .is_some_and(NavigationState::is_finished)
    }

    pub fn all_finished(&self) -> bool {
        self.vehicles.values().all(NavigationState::is_finished)
    }

    fn first_waypoint(&self) -> Option<usize> {
        (!self.waypoints.is_empty()).then_some(0)
    }

    /// Run one tick: advance the player's progress, then pace and steer
    /// every tracked vehicle.
    pub fn update(&mut self, scene: &mut Scene) -> Vec<NavigationEvent> {
        let mut events = Vec::new();

        let player_position = self
            .player
            .and_then(|id| scene.vehicle(id))
            .map(|vehicle| vehicle.position);

        if let (Some(player), Some(position)) = (self.player, player_position) {
            let progress = advance_waypoint(
                &mut self.player_state,
                position,
                &self.waypoints,
                self.config.lap_count,
            );
            events.extend(progress_event(player, progress));
        }

        for (&id, state) in self.vehicles.iter_mut() {
            let Some(vehicle) = scene.vehicle_mut(id) else {
                warn!(vehicle = %id, "Tracked entity is not a vehicle");
                continue;
            };

            let lead = match player_position {
                Some(player_position) => lead_distance(
                    &self.waypoints,
                    state,
                    vehicle.position,
                    &self.player_state,
                    player_position,
                ),
                None => 0.0,
            };
            vehicle.params.speed_max = self.config.target_speed(lead);

            vehicle.controls = Self::drive(
                id,
                vehicle,
                state,
                &self.waypoints,
                self.config.lap_count,
                &mut events,
            );
        }

        events
    }

    fn drive(
        id: EntityId,
        vehicle: &Vehicle,
        state: &mut NavigationState,
        waypoints: &[Waypoint],
        lap_count: u8,
        events: &mut Vec<NavigationEvent>,
    ) -> ControlFlags {
        if state.is_finished() {
            return ControlFlags::BRAKE;
        }

        let progress = advance_waypoint(state, vehicle.position, waypoints, lap_count);
        events.extend(progress_event(id, progress));

        let Some(index) = state.waypoint else {
            return ControlFlags::BRAKE;
        };

        let accelerate = match approach_speed(waypoints, index, vehicle.position) {
            Some(target) => target > vehicle.speed(),
            None => true,
        };
        let pedal = if accelerate {
            ControlFlags::GAS
        } else {
            ControlFlags::BRAKE
        };

        pedal | steer_towards(vehicle.heading, bearing(vehicle.position, waypoints[index].position))
    }
}
