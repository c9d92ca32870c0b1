//! Configuration section types
//!
//! Each section maps to a `[table]` in the board TOML. Every field has a
//! default so a board file only lists what it changes.

use core::net::Ipv4Addr;
use core::str::FromStr;

use heapless::String;

#[cfg(feature = "serde")]
use serde::Deserialize;

use super::ConfigError;

/// Longest dotted-quad address
pub const MAX_ADDR_LEN: usize = 15;

/// Sensor bus settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct SensorConfig {
    /// 7-bit device address
    pub address: u8,
    /// Time between reads
    pub poll_interval_ms: u32,
    /// Upper bound on SCL pulses during bus recovery
    pub recovery_pulses: u8,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: 0x28,
            poll_interval_ms: 500,
            recovery_pulses: 9,
        }
    }
}

/// Display and UI settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct DisplayConfig {
    /// Bytes pushed to the panel per render pump
    pub chunk_bytes: u16,
    /// Minimum time between UI line submissions
    pub ui_interval_ms: u32,
    /// Give up on an operation after this many failed writes in a row
    ///
    /// `None` retries forever.
    pub max_write_retries: Option<u32>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: 512,
            ui_interval_ms: 50,
            max_write_retries: None,
        }
    }
}

/// Telemetry link settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct TelemetryConfig {
    /// Collector IPv4 address, dotted quad
    pub remote: String<MAX_ADDR_LEN>,
    /// Datagram destination port
    pub udp_port: u16,
    /// Stream destination port
    pub tcp_port: u16,
    /// How often the network stack is polled
    pub poll_interval_ms: u32,
    /// How often a sample is published
    pub send_interval_ms: u32,
    /// Wait after a failed or dropped connection before the next attempt
    pub reconnect_delay_ms: u32,
    /// Give up on a handshake after this long
    pub connect_timeout_ms: u32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        let mut remote = String::new();
        // Fits: 12 bytes into a 15 byte buffer
        let _ = remote.push_str("192.168.1.50");
        Self {
            remote,
            udp_port: 5005,
            tcp_port: 6006,
            poll_interval_ms: 10,
            send_interval_ms: 1000,
            reconnect_delay_ms: 2000,
            connect_timeout_ms: 5000,
        }
    }
}

impl TelemetryConfig {
    /// Parsed collector address
    pub fn remote_addr(&self) -> Result<Ipv4Addr, ConfigError> {
        Ipv4Addr::from_str(&self.remote).map_err(|_| ConfigError::RemoteAddress)
    }
}

/// Bus-decoder snapshot settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct SnapshotConfig {
    /// Snapshots older than this read as "none"
    pub freshness_ms: u32,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self { freshness_ms: 2000 }
    }
}

/// Console settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct ConsoleConfig {
    /// Periodic status line enabled at boot
    pub log_enabled: bool,
    /// Time between periodic status lines
    pub log_period_ms: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            log_enabled: false,
            log_period_ms: 5000,
        }
    }
}

/// Which screen row shows which status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct StatusLayout {
    pub sensor_row: u8,
    pub snapshot_a_row: u8,
    pub snapshot_b_row: u8,
    pub stream_link_row: u8,
    pub stream_payload_row: u8,
    pub datagram_link_row: u8,
    pub datagram_payload_row: u8,
}

impl Default for StatusLayout {
    fn default() -> Self {
        Self {
            sensor_row: 0,
            snapshot_a_row: 1,
            snapshot_b_row: 2,
            stream_link_row: 6,
            stream_payload_row: 7,
            datagram_link_row: 8,
            datagram_payload_row: 9,
        }
    }
}

impl StatusLayout {
    /// All rows in a fixed order
    pub fn rows(&self) -> [u8; 7] {
        [
            self.sensor_row,
            self.snapshot_a_row,
            self.snapshot_b_row,
            self.stream_link_row,
            self.stream_payload_row,
            self.datagram_link_row,
            self.datagram_payload_row,
        ]
    }
}
