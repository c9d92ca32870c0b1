//! I2C bus abstractions
//!
//! Provides the blocking master read the sensor poll relies on, an error
//! classification shared by all chip HALs, and manual line control used to
//! unstick a bus that a peer is holding low.

use core::fmt;

use crate::gpio::{IoPin, OutputPin};

/// Bus-level failure reason
///
/// The poll service only needs to know *why* a transfer failed so it can
/// report it; chip HALs map their own error types onto this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cErrorKind {
    /// Address or data byte not acknowledged
    Nack,
    /// Transfer did not complete in time
    Timeout,
    /// Misplaced START/STOP detected
    Bus,
    /// Lost arbitration to another master
    ArbitrationLost,
    /// Data overrun or underrun
    Overrun,
    /// DMA transfer error
    Dma,
    /// Anything else
    Other,
}

impl I2cErrorKind {
    /// Short tag used in status lines and telemetry
    pub const fn as_str(&self) -> &'static str {
        match self {
            I2cErrorKind::Nack => "NACK",
            I2cErrorKind::Timeout => "TIMEOUT",
            I2cErrorKind::Bus => "BUS",
            I2cErrorKind::ArbitrationLost => "ARLO",
            I2cErrorKind::Overrun => "OVR",
            I2cErrorKind::Dma => "DMA",
            I2cErrorKind::Other => "UNKNOWN",
        }
    }
}

impl fmt::Display for I2cErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type that can be classified into an [`I2cErrorKind`]
pub trait BusError {
    /// Classify this error
    fn kind(&self) -> I2cErrorKind;
}

impl BusError for I2cErrorKind {
    fn kind(&self) -> I2cErrorKind {
        *self
    }
}

/// I2C bus master
pub trait I2cBus {
    /// Error type for I2C operations
    type Error: BusError;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// Blocks until `buf` is full or the transfer fails.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;
}

/// Manual control of the SCL/SDA lines
///
/// While detached the controller must not touch the pins; both lines are
/// open-drain outputs so `set_high` releases them.
pub trait BusLines {
    /// Clock line
    type Scl: OutputPin;
    /// Data line (driven and sampled)
    type Sda: IoPin;

    /// Hand the lines over to GPIO control, both released high
    fn detach(&mut self) -> (&mut Self::Scl, &mut Self::Sda);

    /// Give the lines back and reinitialize the controller
    fn reattach(&mut self);
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_tags() {
        assert_eq!(I2cErrorKind::Nack.as_str(), "NACK");
        assert_eq!(I2cErrorKind::ArbitrationLost.as_str(), "ARLO");
        assert_eq!(I2cErrorKind::Overrun.as_str(), "OVR");
        assert_eq!(I2cErrorKind::Other.as_str(), "UNKNOWN");
    }

    #[test]
    fn test_kind_is_identity() {
        assert_eq!(I2cErrorKind::Timeout.kind(), I2cErrorKind::Timeout);
    }
}
