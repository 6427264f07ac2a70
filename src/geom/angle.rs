//! Whole-degree headings in the range [0, 360)

use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Direction of the rotation needed to reach one angle from another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    /// Angles are equal
    None,
    /// Decreasing degrees
    Clockwise,
    /// Increasing degrees
    Counterclockwise,
}

impl Rotation {
    /// The other direction; `None` has no opposite
    pub fn opposite(self) -> Self {
        match self {
            Rotation::None => Rotation::None,
            Rotation::Clockwise => Rotation::Counterclockwise,
            Rotation::Counterclockwise => Rotation::Clockwise,
        }
    }
}

/// Heading stored as whole degrees.
///
/// Values never leave [0, 360). Sub-degree headings are not representable:
/// every conversion from radians rounds to the nearest degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i32", into = "u16")]
pub struct Angle(u16);

impl Angle {
    pub const MIN_VALUE: i32 = 0;
    pub const MAX_VALUE: i32 = 360;

    /// Wrap an integer number of degrees into range
    pub fn new(degrees: i32) -> Self {
        Self::from_degrees(degrees as f64)
    }

    /// Normalize an arbitrary degree value.
    ///
    /// Non-negative input is anchored at 0 and negative input at 360 before
    /// adding the remainder, then the fraction is truncated.
    pub fn from_degrees(value: f64) -> Self {
        let anchor = if value >= Self::MIN_VALUE as f64 {
            Self::MIN_VALUE as f64
        } else {
            Self::MAX_VALUE as f64
        };
        let truncated = (anchor + value % Self::MAX_VALUE as f64) as i32;
        // negative multiples of 360 land on exactly 360
        Self(truncated.rem_euclid(Self::MAX_VALUE) as u16)
    }

    /// Round to the nearest degree (ties to even), then normalize
    pub fn from_degrees_rounded(value: f64) -> Self {
        Self::new(value.round_ties_even() as i32)
    }

    pub fn from_radians(value: f64) -> Self {
        Self::from_degrees_rounded(value * 180.0 / PI)
    }

    pub fn degrees(self) -> u16 {
        self.0
    }

    pub fn to_radians(self) -> f64 {
        self.0 as f64 * PI / 180.0
    }

    /// Shortest direction from `self` to `target`
    pub fn min_rotation(self, target: Angle) -> Rotation {
        if self == target {
            return Rotation::None;
        }

        let current = self.0 as i32;
        let target = target.0 as i32;
        let cw = Angle::new(Self::MAX_VALUE - target + current).0;
        let ccw = Angle::new(target - current).0;

        if cw < ccw {
            Rotation::Clockwise
        } else {
            Rotation::Counterclockwise
        }
    }

    /// Longest direction from `self` to `target`
    pub fn max_rotation(self, target: Angle) -> Rotation {
        self.min_rotation(target).opposite()
    }
}

impl From<Angle> for u16 {
    fn from(angle: Angle) -> Self {
        angle.0
    }
}

impl From<i32> for Angle {
    fn from(degrees: i32) -> Self {
        Angle::new(degrees)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

impl Add<i32> for Angle {
    type Output = Angle;

    fn add(self, rhs: i32) -> Angle {
        Angle::new(self.0 as i32 + rhs)
    }
}

impl Sub<i32> for Angle {
    type Output = Angle;

    fn sub(self, rhs: i32) -> Angle {
        Angle::new(self.0 as i32 - rhs)
    }
}

impl AddAssign<i32> for Angle {
    fn add_assign(&mut self, rhs: i32) {
        *self = *self + rhs;
    }
}

impl SubAssign<i32> for Angle {
    fn sub_assign(&mut self, rhs: i32) {
        *self = *self - rhs;
    }
}
