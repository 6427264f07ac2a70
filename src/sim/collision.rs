//! Pairwise contact detection over the whole scene

use serde::Serialize;

use super::physics::PhysicsConfig;
use crate::geom::Position;
use super::scene::{Entity, EntityId, Scene};

/// A detected contact between two entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub first: EntityId,
    pub second: EntityId,
}

/// Collision pass run once per tick after integration
pub struct CollisionSystem;

impl CollisionSystem {
    /// Bounding-circle test on footprint centres.
    ///
    /// Entities touch when the centre distance is strictly less than the
    /// taller of the two footprints.
    pub fn check_collision(a: &Entity, b: &Entity) -> bool {
        let reach = a.footprint().height.max(b.footprint().height);
        a.center().distance(b.center()) < reach
    }

    /// Resolve contacts for every entity.
    ///
    /// Each entity stops scanning at its first contact and is corrected at
    /// most once per pass. Both sides of a contact are corrected when they
    /// are vehicles, each against the other's position from before the pass
    /// began. Obstacles never move.
    pub fn resolve(scene: &mut Scene, config: &PhysicsConfig) -> Vec<Contact> {
        let mut contacts = Vec::new();
        let entities = scene.entities_mut();
        let mut resolved = vec![false; entities.len()];
        let start: Vec<Position> = entities.iter().map(Entity::position).collect();

        for i in 0..entities.len() {
            if resolved[i] {
                continue;
            }

            for j in 0..entities.len() {
                if i == j || !Self::check_collision(&entities[i], &entities[j]) {
                    continue;
                }

                if let Some(vehicle) = entities[i].as_vehicle_mut() {
                    vehicle.resolve_contact(start[j], config);
                }
                if !resolved[j] {
                    if let Some(vehicle) = entities[j].as_vehicle_mut() {
                        vehicle.resolve_contact(start[i], config);
                    }
                }

                resolved[i] = true;
                resolved[j] = true;

                contacts.push(Contact {
                    first: EntityId(i),
                    second: EntityId(j),
                });
                break;
            }
        }

        contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Angle;
    use crate::sim::params::VehicleParameters;
    use crate::sim::scene::{Footprint, Obstacle};
    use crate::sim::vehicle::Vehicle;

    fn vehicle_at(x: f32, y: f32) -> Vehicle {
        Vehicle::new(Position::new(x, y), Angle::new(0), VehicleParameters::default())
    }

    #[test]
    fn contact_requires_distance_strictly_below_reach() {
        let a = Entity::Vehicle(vehicle_at(0.0, 0.0));
        let touching = Entity::Obstacle(Obstacle::new(Position::new(0.0, 55.0), Angle::new(0)));
        let overlapping = Entity::Obstacle(Obstacle::new(Position::new(0.0, 54.9), Angle::new(0)));

        assert!(!CollisionSystem::check_collision(&a, &touching));
        assert!(CollisionSystem::check_collision(&a, &overlapping));
    }

    #[test]
    fn larger_footprint_sets_reach() {
        let a = Entity::Vehicle(vehicle_at(0.0, 0.0));
        let mut big = Obstacle::new(Position::new(0.0, 60.0), Angle::new(0));
        big.footprint = Footprint::new(32.0, 120.0);
        // centres are 92.5 apart, below the 120 reach
        assert!(CollisionSystem::check_collision(&a, &Entity::Obstacle(big)));
    }

    #[test]
    fn obstacles_never_move() {
        let config = PhysicsConfig::default();
        let mut scene = Scene::new();
        let wall = scene.spawn_obstacle(Obstacle::new(Position::new(0.0, 40.0), Angle::new(0)));
        let car = scene.spawn_vehicle(vehicle_at(0.0, 0.0));

        let contacts = CollisionSystem::resolve(&mut scene, &config);

        assert!(!contacts.is_empty());
        assert_eq!(scene.get(wall).map(Entity::position), Some(Position::new(0.0, 40.0)));
        let moved = scene.vehicle(car).map(|v| v.position.y);
        assert!(moved.is_some_and(|y| y < 0.0));
    }

    #[test]
    fn both_vehicles_bounce_apart() {
        let config = PhysicsConfig::default();
        let mut scene = Scene::new();
        let left = scene.spawn_vehicle(vehicle_at(0.0, 0.0));
        let right = scene.spawn_vehicle(vehicle_at(30.0, 0.0));

        CollisionSystem::resolve(&mut scene, &config);

        let left_x = scene.vehicle(left).map(|v| v.position.x).unwrap_or_default();
        let right_x = scene.vehicle(right).map(|v| v.position.x).unwrap_or_default();
        assert!(left_x < 0.0);
        assert!(right_x > 30.0);
    }

    #[test]
    fn chained_contacts_use_positions_from_before_the_pass() {
        let config = PhysicsConfig::default();
        let mut scene = Scene::new();
        let a = scene.spawn_vehicle(vehicle_at(0.0, 0.0));
        let b = scene.spawn_vehicle(vehicle_at(30.0, 0.0));
        let c = scene.spawn_vehicle(vehicle_at(0.0, 45.0));

        let contacts = CollisionSystem::resolve(&mut scene, &config);
        assert_eq!(contacts[0], Contact { first: a, second: b });
        assert_eq!(contacts[1], Contact { first: c, second: a });

        // a moved while resolving against b; c still bounces off a's old spot,
        // straight along +y
        let mut expected = vehicle_at(0.0, 45.0);
        expected.resolve_contact(Position::new(0.0, 0.0), &config);
        let moved = scene.vehicle(c);
        assert_eq!(moved.map(|v| v.position), Some(expected.position));
        assert_eq!(moved.map(|v| v.heading), Some(expected.heading));
        assert_eq!(expected.position, Position::new(0.0, 52.5));
        assert_eq!(expected.heading, Angle::new(345));
    }

    #[test]
    fn distant_entities_are_untouched() {
        let config = PhysicsConfig::default();
        let mut scene = Scene::new();
        scene.spawn_vehicle(vehicle_at(0.0, 0.0));
        scene.spawn_vehicle(vehicle_at(500.0, 500.0));

        assert!(CollisionSystem::resolve(&mut scene, &config).is_empty());
    }
}
