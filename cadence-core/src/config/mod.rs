//! Configuration types
//!
//! Board-agnostic settings for every service. The firmware build script
//! deserializes the board TOML into [`Config`], runs [`Config::validate`]
//! and bakes the result into the binary, so nothing is parsed on target.

pub mod types;

pub use types::*;

use core::fmt;

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::display::MAX_CHUNK_BYTES;
use crate::ui::MAX_LINES;

/// Shortest allowed periodic log period
pub const MIN_LOG_PERIOD_MS: u32 = 200;

/// Longest allowed periodic log period
pub const MAX_LOG_PERIOD_MS: u32 = 60_000;

/// Complete board configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct Config {
    pub sensor: SensorConfig,
    pub display: DisplayConfig,
    pub telemetry: TelemetryConfig,
    pub snapshot: SnapshotConfig,
    pub console: ConsoleConfig,
    pub layout: StatusLayout,
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Sensor address outside the 7-bit range
    SensorAddress,
    /// Chunk size zero, odd, or larger than the transfer buffer
    ChunkSize,
    /// A periodic interval is zero
    ZeroInterval(&'static str),
    /// Collector address is not a dotted quad
    RemoteAddress,
    /// A port is zero
    ZeroPort,
    /// Log period outside the console's accepted range
    LogPeriod,
    /// A layout row does not exist on screen
    RowOutOfRange(u8),
    /// Two statuses share one row
    RowCollision(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::SensorAddress => write!(f, "sensor address must be 0x08..=0x77"),
            ConfigError::ChunkSize => write!(
                f,
                "chunk_bytes must be even and 2..={}",
                MAX_CHUNK_BYTES
            ),
            ConfigError::ZeroInterval(name) => write!(f, "{} must be nonzero", name),
            ConfigError::RemoteAddress => write!(f, "remote must be an IPv4 address"),
            ConfigError::ZeroPort => write!(f, "ports must be nonzero"),
            ConfigError::LogPeriod => write!(
                f,
                "log_period_ms must be {}..={}",
                MIN_LOG_PERIOD_MS, MAX_LOG_PERIOD_MS
            ),
            ConfigError::RowOutOfRange(row) => {
                write!(f, "layout row {} is past the last row ({})", row, MAX_LINES - 1)
            }
            ConfigError::RowCollision(row) => write!(f, "layout row {} used twice", row),
        }
    }
}

impl core::error::Error for ConfigError {}

impl Config {
    /// Check every section, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0x08..=0x77).contains(&self.sensor.address) {
            return Err(ConfigError::SensorAddress);
        }
        if self.sensor.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("sensor.poll_interval_ms"));
        }

        let chunk = self.display.chunk_bytes as usize;
        if chunk < 2 || chunk % 2 != 0 || chunk > MAX_CHUNK_BYTES {
            return Err(ConfigError::ChunkSize);
        }
        if self.display.ui_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("display.ui_interval_ms"));
        }

        let t = &self.telemetry;
        t.remote_addr()?;
        if t.udp_port == 0 || t.tcp_port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        for (value, name) in [
            (t.poll_interval_ms, "telemetry.poll_interval_ms"),
            (t.send_interval_ms, "telemetry.send_interval_ms"),
            (t.reconnect_delay_ms, "telemetry.reconnect_delay_ms"),
            (t.connect_timeout_ms, "telemetry.connect_timeout_ms"),
            (self.snapshot.freshness_ms, "snapshot.freshness_ms"),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval(name));
            }
        }

        if !(MIN_LOG_PERIOD_MS..=MAX_LOG_PERIOD_MS).contains(&self.console.log_period_ms) {
            return Err(ConfigError::LogPeriod);
        }

        let rows = self.layout.rows();
        for (i, row) in rows.iter().enumerate() {
            if *row as usize >= MAX_LINES {
                return Err(ConfigError::RowOutOfRange(*row));
            }
            if rows[..i].contains(row) {
                return Err(ConfigError::RowCollision(*row));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_remote() {
        let cfg = Config::default();
        assert_eq!(
            cfg.telemetry.remote_addr(),
            Ok(core::net::Ipv4Addr::new(192, 168, 1, 50))
        );
    }

    #[test]
    fn test_odd_chunk_rejected() {
        let mut cfg = Config::default();
        cfg.display.chunk_bytes = 511;
        assert_eq!(cfg.validate(), Err(ConfigError::ChunkSize));
    }

    #[test]
    fn test_oversized_chunk_rejected() {
        let mut cfg = Config::default();
        cfg.display.chunk_bytes = (MAX_CHUNK_BYTES + 2) as u16;
        assert_eq!(cfg.validate(), Err(ConfigError::ChunkSize));
    }

    #[test]
    fn test_bad_remote_rejected() {
        let mut cfg = Config::default();
        cfg.telemetry.remote.clear();
        cfg.telemetry.remote.push_str("192.168.1").unwrap();
        assert_eq!(cfg.validate(), Err(ConfigError::RemoteAddress));
    }

    #[test]
    fn test_zero_interval_named() {
        let mut cfg = Config::default();
        cfg.telemetry.reconnect_delay_ms = 0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroInterval("telemetry.reconnect_delay_ms"))
        );
    }

    #[test]
    fn test_row_collision() {
        let mut cfg = Config::default();
        cfg.layout.datagram_link_row = cfg.layout.sensor_row;
        assert_eq!(cfg.validate(), Err(ConfigError::RowCollision(0)));
    }

    #[test]
    fn test_row_out_of_range() {
        let mut cfg = Config::default();
        cfg.layout.stream_link_row = MAX_LINES as u8;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::RowOutOfRange(MAX_LINES as u8))
        );
    }
}
