//! Configuration module - environment variable parsing

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::sim::physics::PhysicsConfig;
use crate::util::time::{DEFAULT_SNAPSHOT_RATE, DEFAULT_TICK_RATE, MAX_TICK_RATE};

/// Application configuration loaded from environment variables
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Snapshots published per second
    pub snapshot_rate: u32,
    /// Stop the session after this many ticks
    pub max_ticks: Option<u64>,

    /// Delay before the race goes live (milliseconds)
    pub start_delay_ms: u32,
    /// Laps before a driver finishes
    pub lap_count: u8,
    /// JSON file with vehicle parameters; built-in values when unset
    pub car_params_path: Option<PathBuf>,

    /// World constants shared by every vehicle
    pub physics: PhysicsConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = PhysicsConfig::default();

        Ok(Self {
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            tick_rate: parse(&lookup, "TICK_RATE")?
                .map(|rate| validate_tick_rate(rate).ok_or(ConfigError::Invalid("TICK_RATE")))
                .transpose()?
                .unwrap_or(DEFAULT_TICK_RATE),
            snapshot_rate: parse(&lookup, "SNAPSHOT_RATE")?.unwrap_or(DEFAULT_SNAPSHOT_RATE),
            max_ticks: parse(&lookup, "MAX_TICKS")?,

            start_delay_ms: parse(&lookup, "START_DELAY_MS")?.unwrap_or(1_000),
            lap_count: parse(&lookup, "LAP_COUNT")?.unwrap_or(5),
            car_params_path: lookup("CAR_PARAMS_PATH")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),

            physics: PhysicsConfig {
                pixels_per_meter: parse(&lookup, "PIXELS_PER_METER")?
                    .unwrap_or(defaults.pixels_per_meter),
                friction: parse(&lookup, "FRICTION")?.unwrap_or(defaults.friction),
                lateral_friction_max: parse(&lookup, "FRICTION_LATERAL_MAX")?
                    .unwrap_or(defaults.lateral_friction_max),
                longitudinal_friction_max: parse(&lookup, "FRICTION_LONGITUDINAL_MAX")?
                    .unwrap_or(defaults.longitudinal_friction_max),
                yaw_friction_max: parse(&lookup, "FRICTION_YAW_MAX")?
                    .unwrap_or(defaults.yaw_friction_max),
            },
        })
    }
}

/// Parse an optional numeric variable; unset or blank means `None`
fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name)),
        _ => Ok(None),
    }
}

/// A tick must last at least one simulated millisecond
fn validate_tick_rate(rate: u32) -> Option<u32> {
    (1..=MAX_TICK_RATE).contains(&rate).then_some(rate)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.tick_rate, 30);
        assert_eq!(config.snapshot_rate, 10);
        assert_eq!(config.max_ticks, None);
        assert_eq!(config.start_delay_ms, 1_000);
        assert_eq!(config.lap_count, 5);
        assert_eq!(config.car_params_path, None);
        assert_eq!(config.physics, PhysicsConfig::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("TICK_RATE", "60"),
            ("MAX_TICKS", " 900 "),
            ("LAP_COUNT", "2"),
            ("FRICTION", "12.5"),
            ("CAR_PARAMS_PATH", "car.json"),
        ])
        .unwrap();

        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.max_ticks, Some(900));
        assert_eq!(config.lap_count, 2);
        assert_eq!(config.physics.friction, 12.5);
        assert_eq!(config.car_params_path, Some(PathBuf::from("car.json")));
    }

    #[test]
    fn invalid_numbers_name_the_variable() {
        let err = load(&[("LAP_COUNT", "900")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("LAP_COUNT")));

        let err = load(&[("PIXELS_PER_METER", "lots")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for environment variable: PIXELS_PER_METER"
        );
    }

    #[test]
    fn tick_rate_must_leave_whole_millisecond_ticks() {
        assert!(matches!(
            load(&[("TICK_RATE", "0")]),
            Err(ConfigError::Invalid("TICK_RATE"))
        ));
        assert!(matches!(
            load(&[("TICK_RATE", "1001")]),
            Err(ConfigError::Invalid("TICK_RATE"))
        ));
        assert_eq!(load(&[("TICK_RATE", "1000")]).unwrap().tick_rate, 1000);
    }
}
