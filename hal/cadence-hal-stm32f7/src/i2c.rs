//! I2C sensor bus for STM32F7
//!
//! Wraps embassy's blocking I2C master and adds the manual line control the
//! recovery sequence needs.

use cadence_hal::{BusError, BusLines, I2cBus, I2cErrorKind};
use embassy_stm32::i2c::Error as I2cError;
use embassy_stm32::pac::i2c::I2c as I2cRegs;

use crate::gpio::PacPin;

/// Error from I2C operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cFault {
    /// Bus error
    Bus,
    /// Arbitration lost
    ArbitrationLost,
    /// NACK received
    Nack,
    /// Timeout
    Timeout,
    /// Overrun
    Overrun,
    /// Other error
    Other,
}

impl From<I2cError> for I2cFault {
    fn from(e: I2cError) -> Self {
        match e {
            I2cError::Bus => I2cFault::Bus,
            I2cError::Arbitration => I2cFault::ArbitrationLost,
            I2cError::Nack => I2cFault::Nack,
            I2cError::Timeout => I2cFault::Timeout,
            I2cError::Overrun => I2cFault::Overrun,
            _ => I2cFault::Other,
        }
    }
}

impl BusError for I2cFault {
    fn kind(&self) -> I2cErrorKind {
        match self {
            I2cFault::Bus => I2cErrorKind::Bus,
            I2cFault::ArbitrationLost => I2cErrorKind::ArbitrationLost,
            I2cFault::Nack => I2cErrorKind::Nack,
            I2cFault::Timeout => I2cErrorKind::Timeout,
            I2cFault::Overrun => I2cErrorKind::Overrun,
            I2cFault::Other => I2cErrorKind::Other,
        }
    }
}

/// Sensor bus: an embassy I2C master plus its two pins
pub struct SensorBus<I> {
    i2c: I,
    regs: I2cRegs,
    scl: PacPin,
    sda: PacPin,
}

impl<I> SensorBus<I>
where
    I: embedded_hal::i2c::I2c<Error = I2cError>,
{
    /// Wrap `i2c`; `regs` is its register block (e.g. `pac::I2C1`) and
    /// `scl`/`sda` the pins it was created with
    pub fn new(i2c: I, regs: I2cRegs, scl: PacPin, sda: PacPin) -> Self {
        Self {
            i2c,
            regs,
            scl,
            sda,
        }
    }
}

impl<I> I2cBus for SensorBus<I>
where
    I: embedded_hal::i2c::I2c<Error = I2cError>,
{
    type Error = I2cFault;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), I2cFault> {
        self.i2c.write(address, data).map_err(I2cFault::from)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), I2cFault> {
        self.i2c.read(address, buf).map_err(I2cFault::from)
    }
}

impl<I> BusLines for SensorBus<I> {
    type Scl = PacPin;
    type Sda = PacPin;

    fn detach(&mut self) -> (&mut PacPin, &mut PacPin) {
        self.scl.into_open_drain();
        self.sda.into_open_drain();
        (&mut self.scl, &mut self.sda)
    }

    fn reattach(&mut self) {
        self.scl.into_alternate();
        self.sda.into_alternate();

        // Clearing PE resets the controller state machine; the bit has to
        // stay low for at least three APB cycles.
        self.regs.cr1().modify(|w| w.set_pe(false));
        cortex_m::asm::delay(16);
        self.regs.cr1().modify(|w| w.set_pe(true));
    }
}
