//! Snapshot building for renderers and other observers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geom::{Angle, Position};
use crate::sim::navigation::NavigationState;
use crate::sim::scene::{Entity, EntityId, Footprint};

/// What an entity is, as far as a renderer cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Obstacle,
    Player,
    Rival,
}

/// Per-entity view of one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Position,
    pub heading: Angle,
    pub footprint: Footprint,
    /// Meters per second; vehicles only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// Current top-speed cap; vehicles only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_max: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gear: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lap: Option<u8>,
    #[serde(default)]
    pub finished: bool,
}

/// Full race state at one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub race_id: Uuid,
    pub tick: u64,
    pub active: bool,
    pub entities: Vec<EntitySnapshot>,
}

impl RaceSnapshot {
    pub fn entity(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.entities.iter().find(|e| e.id == id)
    }
}

impl EntitySnapshot {
    pub(crate) fn capture(
        id: EntityId,
        entity: &Entity,
        kind: EntityKind,
        navigation: Option<&NavigationState>,
    ) -> Self {
        let vehicle = entity.as_vehicle();
        Self {
            id,
            kind,
            position: entity.position(),
            heading: entity.heading(),
            footprint: entity.footprint(),
            speed: vehicle.map(|v| v.speed()),
            speed_max: vehicle.map(|v| v.params.speed_max),
            gear: vehicle.map(|v| v.gear()),
            lap: navigation.map(|n| n.lap),
            finished: navigation.is_some_and(NavigationState::is_finished),
        }
    }
}

/// Decides which ticks publish a snapshot
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
        }
    }

    /// Interval matching a tick rate and a snapshot rate
    pub fn for_rates(tick_rate: u32, snapshot_rate: u32) -> Self {
        Self::new(tick_rate / snapshot_rate.max(1))
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (sent when the start gate opens)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sends_every_interval() {
        let mut builder = SnapshotBuilder::new(3);
        let sent: Vec<bool> = (0..6).map(|_| builder.should_send()).collect();
        assert_eq!(sent, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn forced_snapshot_goes_out_immediately() {
        let mut builder = SnapshotBuilder::for_rates(30, 10);
        assert!(!builder.should_send());
        builder.force_next();
        assert!(builder.should_send());
        assert!(!builder.should_send());
    }

    #[test]
    fn degenerate_rates_clamp_interval() {
        let mut builder = SnapshotBuilder::for_rates(30, 0);
        assert!(!builder.should_send());
        let mut builder = SnapshotBuilder::for_rates(5, 10);
        assert!(builder.should_send());
        assert!(builder.should_send());
    }
}
