//! Race orchestration: start gate, tick ordering and session plumbing

pub mod message;
pub mod session;
pub mod snapshot;
pub mod track;

pub use message::{ClientMsg, ServerMsg};
pub use session::{RaceSession, SessionHandle, SessionOptions, SessionSummary};
pub use snapshot::{EntityKind, EntitySnapshot, RaceSnapshot, SnapshotBuilder};
pub use track::{RaceSetup, VehicleSpawn};

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::sim::collision::{CollisionSystem, Contact};
use crate::sim::controls::ControlFlags;
use crate::sim::navigation::{NavigationController, NavigationEvent};
use crate::sim::physics::PhysicsConfig;
use crate::sim::scene::{EntityId, Scene};
use crate::sim::vehicle::Vehicle;
use crate::util::trigger::PeriodicTrigger;

/// What happened during one call to [`Race::tick`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub tick: u64,
    /// The start gate opened on this tick
    pub started: bool,
    pub navigation: Vec<NavigationEvent>,
    pub contacts: Vec<Contact>,
}

impl TickReport {
    pub fn is_quiet(&self) -> bool {
        !self.started && self.navigation.is_empty() && self.contacts.is_empty()
    }
}

/// A single race: scenery, vehicles, AI drivers and the start gate
#[derive(Debug, Clone)]
pub struct Race {
    id: Uuid,
    setup: RaceSetup,
    physics: PhysicsConfig,
    scene: Scene,
    controller: NavigationController,
    player: Option<EntityId>,
    start_gate: Option<PeriodicTrigger>,
    tick: u64,
}

impl Race {
    pub fn new(setup: RaceSetup, physics: PhysicsConfig) -> Self {
        let (scene, controller, player) = Self::build(&setup);
        let start_gate = Self::start_gate(&setup);

        let race = Self {
            id: Uuid::new_v4(),
            setup,
            physics,
            scene,
            controller,
            player,
            start_gate,
            tick: 0,
        };

        info!(
            race_id = %race.id,
            entities = race.scene.len(),
            rivals = race.controller.vehicles().len(),
            waypoints = race.controller.waypoints().len(),
            laps = race.controller.config().lap_count,
            "Race created"
        );

        race
    }

    fn build(setup: &RaceSetup) -> (Scene, NavigationController, Option<EntityId>) {
        let mut scene = Scene::new();
        let mut controller =
            NavigationController::new(setup.pacing.clone(), setup.waypoints.clone());

        for obstacle in &setup.obstacles {
            scene.spawn_obstacle(obstacle.clone());
        }

        let player = setup.player.as_ref().map(|spawn| {
            let id = scene.spawn_vehicle(Vehicle::new(
                spawn.position,
                spawn.heading,
                spawn.params.clone(),
            ));
            controller.add_player(id);
            id
        });

        for spawn in &setup.rivals {
            let id = scene.spawn_vehicle(Vehicle::new(
                spawn.position,
                spawn.heading,
                spawn.params.clone(),
            ));
            controller.add_vehicle(id, None);
        }

        (scene, controller, player)
    }

    fn start_gate(setup: &RaceSetup) -> Option<PeriodicTrigger> {
        (setup.start_delay_ms > 0).then(|| PeriodicTrigger::new(setup.start_delay_ms as f32))
    }

    /// Advance the race by `elapsed_ms`.
    ///
    /// Order: start gate, player input, AI drivers, integration of every
    /// vehicle, then collision response. Nothing but the gate moves while
    /// the race is inactive.
    pub fn tick(&mut self, elapsed_ms: u32, input: ControlFlags) -> TickReport {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        if let Some(gate) = self.start_gate.as_mut() {
            if gate.advance(elapsed_ms) > 0 {
                self.start_gate = None;
                report.started = true;
                info!(race_id = %self.id, tick = self.tick, "Start gate open");
            }
        }

        if !self.is_active() {
            return report;
        }

        if let Some(player) = self.player.and_then(|id| self.scene.vehicle_mut(id)) {
            player.controls = input;
        }

        report.navigation = self.controller.update(&mut self.scene);
        for event in &report.navigation {
            self.log_navigation(event);
        }

        for vehicle in self.scene.vehicles_mut() {
            vehicle.update(elapsed_ms, &self.physics);
        }

        report.contacts = CollisionSystem::resolve(&mut self.scene, &self.physics);
        for contact in &report.contacts {
            debug!(
                race_id = %self.id,
                tick = self.tick,
                first = %contact.first,
                second = %contact.second,
                "Contact resolved"
            );
        }

        report
    }

    fn log_navigation(&self, event: &NavigationEvent) {
        match *event {
            NavigationEvent::WaypointReached { vehicle, next } => {
                debug!(race_id = %self.id, tick = self.tick, vehicle = %vehicle, next, "Waypoint reached");
            }
            NavigationEvent::LapCompleted { vehicle, lap } => {
                info!(race_id = %self.id, tick = self.tick, vehicle = %vehicle, lap, "Lap completed");
            }
            NavigationEvent::Finished { vehicle } => {
                info!(race_id = %self.id, tick = self.tick, vehicle = %vehicle, "Vehicle finished");
            }
        }
    }

    /// Rebuild the race from its setup and close the start gate again
    pub fn reset(&mut self) {
        let (scene, controller, player) = Self::build(&self.setup);
        self.scene = scene;
        self.controller = controller;
        self.player = player;
        self.start_gate = Self::start_gate(&self.setup);
        self.tick = 0;

        info!(race_id = %self.id, "Race reset");
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.start_gate.is_none()
    }

    /// Every AI driver and the player have finished
    pub fn is_finished(&self) -> bool {
        self.controller.all_finished() && self.controller.player_state().is_finished()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn controller(&self) -> &NavigationController {
        &self.controller
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    pub fn player_vehicle(&self) -> Option<&Vehicle> {
        self.player.and_then(|id| self.scene.vehicle(id))
    }

    pub fn snapshot(&self) -> RaceSnapshot {
        let entities = self
            .scene
            .iter()
            .map(|(id, entity)| {
                if Some(id) == self.player {
                    EntitySnapshot::capture(
                        id,
                        entity,
                        EntityKind::Player,
                        Some(self.controller.player_state()),
                    )
                } else if entity.is_vehicle() {
                    EntitySnapshot::capture(id, entity, EntityKind::Rival, self.controller.state(id))
                } else {
                    EntitySnapshot::capture(id, entity, EntityKind::Obstacle, None)
                }
            })
            .collect();

        RaceSnapshot {
            race_id: self.id,
            tick: self.tick,
            active: self.is_active(),
            entities,
        }
    }
}
