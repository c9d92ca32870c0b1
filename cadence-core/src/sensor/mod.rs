//! Sensor poll service
//!
//! A two-byte register is read from one I2C device at a fixed interval. A
//! failed read triggers bus recovery and exactly one retry.

mod poll;
mod recovery;

pub use poll::SensorPoller;
pub use recovery::{recover_bus, RecoveryReport};

use cadence_hal::I2cErrorKind;

/// Outcome of the most recent poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorStatus {
    /// Last poll succeeded
    pub ok: bool,
    /// Last good reading, kept across failures
    pub value: i32,
    /// Reason of the last failure, sticky until a poll succeeds
    pub error: Option<I2cErrorKind>,
}

impl SensorStatus {
    /// `"NONE"` or the failure tag
    pub fn error_tag(&self) -> &'static str {
        self.error.map_or("NONE", |kind| kind.as_str())
    }
}

/// Poll counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorStats {
    pub polls: u32,
    pub failures: u32,
    pub recoveries: u32,
}
