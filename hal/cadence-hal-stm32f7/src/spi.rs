//! SPI display bus for STM32F7

use cadence_hal::SpiBus;
use embassy_stm32::spi::Error as SpiError;

/// Error from SPI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiFault {
    /// Frame format error
    Framing,
    /// CRC mismatch
    Crc,
    /// Mode fault (multi-master conflict)
    ModeFault,
    /// Overrun
    Overrun,
    /// Other error
    Other,
}

impl From<SpiError> for SpiFault {
    fn from(e: SpiError) -> Self {
        match e {
            SpiError::Framing => SpiFault::Framing,
            SpiError::Crc => SpiFault::Crc,
            SpiError::ModeFault => SpiFault::ModeFault,
            SpiError::Overrun => SpiFault::Overrun,
            _ => SpiFault::Other,
        }
    }
}

/// Transmit-only `cadence-hal` SPI bus over an `embedded-hal` bus
///
/// Every write is flushed before it returns, so the caller can move chip
/// select or data/command right after.
pub struct SpiWriter<S> {
    spi: S,
}

impl<S> SpiWriter<S>
where
    S: embedded_hal::spi::SpiBus<u8, Error = SpiError>,
{
    pub fn new(spi: S) -> Self {
        Self { spi }
    }
}

impl<S> SpiBus for SpiWriter<S>
where
    S: embedded_hal::spi::SpiBus<u8, Error = SpiError>,
{
    type Error = SpiFault;

    fn write(&mut self, data: &[u8]) -> Result<(), SpiFault> {
        self.spi.write(data)?;
        self.spi.flush()?;
        Ok(())
    }
}
