//! Line-delimited JSON messages exchanged with a running race session

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sim::collision::Contact;
use crate::sim::controls::{ControlFlags, ControlParseError};
use crate::sim::navigation::NavigationEvent;

use super::snapshot::RaceSnapshot;

/// Messages sent from the driver to the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Player controls held until the next input
    Input { controls: ControlFlags },

    /// Rebuild the race and close the start gate
    Reset,

    /// End the session
    Quit,
}

impl ClientMsg {
    /// Parse one input line.
    ///
    /// Accepts a JSON message, `reset`, `quit`, or a bare control list such
    /// as `gas+left`.
    pub fn parse_line(line: &str) -> Result<Self, ControlParseError> {
        let line = line.trim();
        if line.starts_with('{') {
            return serde_json::from_str(line).map_err(|e| ControlParseError(e.to_string()));
        }

        match line.to_ascii_lowercase().as_str() {
            "reset" => Ok(ClientMsg::Reset),
            "quit" | "exit" => Ok(ClientMsg::Quit),
            _ => Ok(ClientMsg::Input {
                controls: line.parse()?,
            }),
        }
    }
}

/// Messages published by the session
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// The start gate opened
    RaceStarted { race_id: Uuid, tick: u64 },

    /// Full state, sent at the snapshot rate
    Snapshot {
        #[serde(flatten)]
        snapshot: RaceSnapshot,
    },

    /// A lap, finish or waypoint event
    Navigation { tick: u64, event: NavigationEvent },

    /// Two entities touched
    Contact { tick: u64, contact: Contact },

    /// The race was rebuilt
    RaceReset { race_id: Uuid },

    /// Every driver has finished
    RaceFinished { race_id: Uuid, tick: u64 },

    /// Rejected input
    Error { code: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_json_lines() {
        assert_eq!(
            ClientMsg::parse_line("gas+left\n"),
            Ok(ClientMsg::Input {
                controls: ControlFlags::GAS | ControlFlags::LEFT
            })
        );
        assert_eq!(ClientMsg::parse_line("RESET"), Ok(ClientMsg::Reset));
        assert_eq!(ClientMsg::parse_line("quit"), Ok(ClientMsg::Quit));
        assert_eq!(
            ClientMsg::parse_line(r#"{"type":"input","controls":{"brake":true}}"#),
            Ok(ClientMsg::Input {
                controls: ControlFlags::BRAKE
            })
        );
        assert!(ClientMsg::parse_line("jump").is_err());
        assert!(ClientMsg::parse_line("{not json").is_err());
    }

    #[test]
    fn empty_line_releases_controls() {
        assert_eq!(
            ClientMsg::parse_line(""),
            Ok(ClientMsg::Input {
                controls: ControlFlags::NONE
            })
        );
    }

    #[test]
    fn server_messages_are_tagged() {
        let msg = ServerMsg::RaceFinished {
            race_id: Uuid::nil(),
            tick: 7,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "race_finished");
        assert_eq!(json["tick"], 7);
    }
}
