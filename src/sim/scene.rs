//! Entity arena shared by the integrator, the collision pass and the AI

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::{Angle, Position};

use super::vehicle::Vehicle;

/// Stable handle into a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub usize);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Axis-aligned body size in pixels, anchored at the entity position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: f32,
    pub height: f32,
}

impl Footprint {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self, position: Position) -> Position {
        Position::new(position.x + self.width / 2.0, position.y + self.height / 2.0)
    }
}

/// Footprint of the car and wall block sprites
pub const DEFAULT_FOOTPRINT: Footprint = Footprint::new(32.0, 55.0);

/// Static scenery that vehicles bounce off
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub position: Position,
    pub heading: Angle,
    pub footprint: Footprint,
}

impl Obstacle {
    pub fn new(position: Position, heading: Angle) -> Self {
        Self {
            position,
            heading,
            footprint: DEFAULT_FOOTPRINT,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Entity {
    Obstacle(Obstacle),
    Vehicle(Vehicle),
}

impl Entity {
    pub fn position(&self) -> Position {
        match self {
            Entity::Obstacle(o) => o.position,
            Entity::Vehicle(v) => v.position,
        }
    }

    pub fn heading(&self) -> Angle {
        match self {
            Entity::Obstacle(o) => o.heading,
            Entity::Vehicle(v) => v.heading,
        }
    }

    pub fn footprint(&self) -> Footprint {
        match self {
            Entity::Obstacle(o) => o.footprint,
            Entity::Vehicle(v) => v.footprint,
        }
    }

    pub fn center(&self) -> Position {
        self.footprint().center(self.position())
    }

    pub fn as_vehicle(&self) -> Option<&Vehicle> {
        match self {
            Entity::Vehicle(v) => Some(v),
            Entity::Obstacle(_) => None,
        }
    }

    pub fn as_vehicle_mut(&mut self) -> Option<&mut Vehicle> {
        match self {
            Entity::Vehicle(v) => Some(v),
            Entity::Obstacle(_) => None,
        }
    }

    pub fn is_vehicle(&self) -> bool {
        matches!(self, Entity::Vehicle(_))
    }
}

/// Every entity taking part in a race. Entities are never removed, so
/// handles stay valid until the scene is rebuilt.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        self.entities.push(entity);
        EntityId(self.entities.len() - 1)
    }

    pub fn spawn_obstacle(&mut self, obstacle: Obstacle) -> EntityId {
        self.spawn(Entity::Obstacle(obstacle))
    }

    pub fn spawn_vehicle(&mut self, vehicle: Vehicle) -> EntityId {
        self.spawn(Entity::Vehicle(vehicle))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.0)
    }

    pub fn vehicle(&self, id: EntityId) -> Option<&Vehicle> {
        self.get(id).and_then(Entity::as_vehicle)
    }

    pub fn vehicle_mut(&mut self, id: EntityId) -> Option<&mut Vehicle> {
        self.get_mut(id).and_then(Entity::as_vehicle_mut)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().enumerate().map(|(i, e)| (EntityId(i), e))
    }

    pub fn vehicles_mut(&mut self) -> impl Iterator<Item = &mut Vehicle> {
        self.entities.iter_mut().filter_map(Entity::as_vehicle_mut)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub(crate) fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::params::VehicleParameters;

    #[test]
    fn handles_address_variants() {
        let mut scene = Scene::new();
        let wall = scene.spawn_obstacle(Obstacle::new(Position::new(0.0, 0.0), Angle::new(90)));
        let car = scene.spawn_vehicle(Vehicle::new(
            Position::new(10.0, 20.0),
            Angle::new(0),
            VehicleParameters::default(),
        ));

        assert_eq!(scene.len(), 2);
        assert!(scene.vehicle(wall).is_none());
        assert_eq!(scene.vehicle(car).map(|v| v.position), Some(Position::new(10.0, 20.0)));
        assert_eq!(scene.get(wall).map(Entity::heading), Some(Angle::new(90)));
        assert!(scene.get(EntityId(7)).is_none());
        assert_eq!(scene.vehicles_mut().count(), 1);
    }

    #[test]
    fn footprint_center_is_offset_by_half_size() {
        let center = DEFAULT_FOOTPRINT.center(Position::new(100.0, 100.0));
        assert_eq!(center, Position::new(116.0, 127.5));
    }
}
