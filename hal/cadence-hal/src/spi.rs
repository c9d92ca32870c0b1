//! SPI bus abstractions
//!
//! The panel is write-only: a raw [`SpiBus`] moves bytes, and
//! [`DisplayBus`] adds the command/data framing a display controller
//! expects on top of it.

use crate::gpio::OutputPin;

/// SPI bus master (transmit only)
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Write data, blocking until the last byte has left the shifter
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// Display controller bus
///
/// A pixel stream is bracketed by [`begin_pixels`](DisplayBus::begin_pixels)
/// and [`end_pixels`](DisplayBus::end_pixels); in between the bus belongs to
/// whoever opened the stream.
pub trait DisplayBus {
    /// Error type for bus writes
    type Error;

    /// Send a command byte followed by its parameter bytes
    fn command(&mut self, cmd: u8, params: &[u8]) -> Result<(), Self::Error>;

    /// Select the panel in data mode
    fn begin_pixels(&mut self);

    /// Stream pixel bytes into the current window
    fn write_pixels(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Deselect the panel
    fn end_pixels(&mut self);
}

/// [`DisplayBus`] built from an SPI bus plus chip-select and data/command pins
pub struct SpiDisplay<SPI, CS, DC> {
    spi: SPI,
    cs: CS,
    dc: DC,
}

impl<SPI, CS, DC> SpiDisplay<SPI, CS, DC>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
{
    /// Wrap the bus; the panel starts deselected
    pub fn new(spi: SPI, mut cs: CS, dc: DC) -> Self {
        cs.set_high();
        Self { spi, cs, dc }
    }
}

impl<SPI, CS, DC> DisplayBus for SpiDisplay<SPI, CS, DC>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
{
    type Error = SPI::Error;

    fn command(&mut self, cmd: u8, params: &[u8]) -> Result<(), Self::Error> {
        self.cs.set_low();
        self.dc.set_low();
        let mut result = self.spi.write(&[cmd]);
        if result.is_ok() && !params.is_empty() {
            self.dc.set_high();
            result = self.spi.write(params);
        }
        self.cs.set_high();
        result
    }

    fn begin_pixels(&mut self) {
        self.dc.set_high();
        self.cs.set_low();
    }

    fn write_pixels(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.spi.write(data)
    }

    fn end_pixels(&mut self) {
        self.cs.set_high();
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Wire {
        Cs(bool),
        Dc(bool),
        Byte(u8),
    }

    type Log = Rc<RefCell<Vec<Wire>>>;

    struct LogSpi(Log);
    struct LogPin(Log, fn(bool) -> Wire, bool);

    impl SpiBus for LogSpi {
        type Error = ();
        fn write(&mut self, data: &[u8]) -> Result<(), ()> {
            self.0.borrow_mut().extend(data.iter().map(|b| Wire::Byte(*b)));
            Ok(())
        }
    }

    impl OutputPin for LogPin {
        fn set_high(&mut self) {
            self.2 = true;
            self.0.borrow_mut().push((self.1)(true));
        }
        fn set_low(&mut self) {
            self.2 = false;
            self.0.borrow_mut().push((self.1)(false));
        }
        fn is_set_high(&self) -> bool {
            self.2
        }
    }

    fn display(log: &Log) -> SpiDisplay<LogSpi, LogPin, LogPin> {
        SpiDisplay::new(
            LogSpi(log.clone()),
            LogPin(log.clone(), Wire::Cs, false),
            LogPin(log.clone(), Wire::Dc, false),
        )
    }

    #[test]
    fn test_command_framing() {
        let log: Log = Rc::default();
        let mut bus = display(&log);
        log.borrow_mut().clear();

        bus.command(0x3A, &[0x05]).unwrap();

        assert_eq!(
            *log.borrow(),
            [
                Wire::Cs(false),
                Wire::Dc(false),
                Wire::Byte(0x3A),
                Wire::Dc(true),
                Wire::Byte(0x05),
                Wire::Cs(true),
            ]
        );
    }

    #[test]
    fn test_pixel_stream_holds_chip_select() {
        let log: Log = Rc::default();
        let mut bus = display(&log);
        log.borrow_mut().clear();

        bus.begin_pixels();
        bus.write_pixels(&[1, 2]).unwrap();
        bus.write_pixels(&[3]).unwrap();
        bus.end_pixels();

        let log = log.borrow();
        assert_eq!(log[1], Wire::Cs(false));
        assert_eq!(log.iter().filter(|w| matches!(w, Wire::Cs(_))).count(), 2);
        assert_eq!(*log.last().unwrap(), Wire::Cs(true));
    }
}
