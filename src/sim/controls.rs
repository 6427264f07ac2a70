//! Per-tick driver inputs

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Control flags held by a vehicle for one tick.
///
/// Opposing pairs may both be set; the integrator then freezes that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlFlags {
    pub gas: bool,
    pub brake: bool,
    pub left: bool,
    pub right: bool,
    pub gear_up: bool,
    pub gear_down: bool,
}

impl ControlFlags {
    pub const NONE: Self = Self::decode(0);
    pub const GAS: Self = Self::decode(0x01);
    pub const BRAKE: Self = Self::decode(0x02);
    pub const LEFT: Self = Self::decode(0x04);
    pub const RIGHT: Self = Self::decode(0x08);
    pub const GEAR_UP: Self = Self::decode(0x10);
    pub const GEAR_DOWN: Self = Self::decode(0x20);

    #[inline]
    pub const fn encode(self) -> u8 {
        (if self.gas { 0x01 } else { 0 })
            | (if self.brake { 0x02 } else { 0 })
            | (if self.left { 0x04 } else { 0 })
            | (if self.right { 0x08 } else { 0 })
            | (if self.gear_up { 0x10 } else { 0 })
            | (if self.gear_down { 0x20 } else { 0 })
    }

    #[inline]
    pub const fn decode(byte: u8) -> Self {
        Self {
            gas: (byte & 0x01) != 0,
            brake: (byte & 0x02) != 0,
            left: (byte & 0x04) != 0,
            right: (byte & 0x08) != 0,
            gear_up: (byte & 0x10) != 0,
            gear_down: (byte & 0x20) != 0,
        }
    }

    pub fn is_empty(self) -> bool {
        self.encode() == 0
    }

    /// True when every flag set in `other` is also set here
    pub fn contains(self, other: ControlFlags) -> bool {
        self.encode() & other.encode() == other.encode()
    }
}

impl BitOr for ControlFlags {
    type Output = ControlFlags;

    fn bitor(self, rhs: ControlFlags) -> ControlFlags {
        ControlFlags::decode(self.encode() | rhs.encode())
    }
}

impl BitOrAssign for ControlFlags {
    fn bitor_assign(&mut self, rhs: ControlFlags) {
        *self = *self | rhs;
    }
}

impl fmt::Display for ControlFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.gas, "gas"),
            (self.brake, "brake"),
            (self.left, "left"),
            (self.right, "right"),
            (self.gear_up, "gear_up"),
            (self.gear_down, "gear_down"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect();

        if set.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", set.join("+"))
        }
    }
}

/// Unknown control name in a textual input line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown control: {0}")]
pub struct ControlParseError(pub String);

impl FromStr for ControlFlags {
    type Err = ControlParseError;

    /// Parses lines such as `gas+left`, `brake, right` or `none`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = ControlFlags::NONE;

        for token in s
            .split(|c: char| c == '+' || c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            flags |= match token.to_ascii_lowercase().as_str() {
                "none" => ControlFlags::NONE,
                "gas" | "throttle" | "up" => ControlFlags::GAS,
                "brake" | "down" => ControlFlags::BRAKE,
                "left" => ControlFlags::LEFT,
                "right" => ControlFlags::RIGHT,
                "gear_up" | "shift_up" => ControlFlags::GEAR_UP,
                "gear_down" | "shift_down" => ControlFlags::GEAR_DOWN,
                _ => return Err(ControlParseError(token.to_string())),
            };
        }

        Ok(flags)
    }
}
