//! Circular checkpoints along the racing line

use serde::{Deserialize, Serialize};

use crate::geom::Position;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Position,
    pub radius: u16,
    /// Target speed while far from the waypoint
    pub speed_max: f32,
    /// Target speed at the waypoint; marks a braking zone when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_min: Option<f32>,
}

impl Waypoint {
    pub fn new(position: Position, radius: u16, speed_max: f32) -> Self {
        Self {
            position,
            radius,
            speed_max,
            speed_min: None,
        }
    }

    pub fn with_speed_min(mut self, speed_min: f32) -> Self {
        self.speed_min = Some(speed_min);
        self
    }

    /// Inclusive containment test
    pub fn contains(&self, position: Position) -> bool {
        self.radius as f32 >= self.position.distance(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_inclusive() {
        let waypoint = Waypoint::new(Position::new(0.0, 0.0), 5, 100.0);
        assert!(waypoint.contains(Position::new(3.0, 4.0)));
        assert!(waypoint.contains(Position::new(0.0, 0.0)));
        assert!(!waypoint.contains(Position::new(3.0, 4.1)));
    }

    #[test]
    fn speed_min_is_optional_in_json() {
        let waypoint: Waypoint = serde_json::from_str(
            r#"{"position":{"x":1.0,"y":2.0},"radius":190,"speed_max":100.0}"#,
        )
        .unwrap();
        assert_eq!(waypoint.speed_min, None);

        let braking = waypoint.clone().with_speed_min(10.0);
        let json = serde_json::to_string(&braking).unwrap();
        assert!(json.contains("\"speed_min\":10.0"));
    }
}
