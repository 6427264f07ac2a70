//! Utility modules

pub mod time;
pub mod trigger;

pub use trigger::PeriodicTrigger;
