//! GPIO adapters for STM32F7
//!
//! [`HalOutput`] wraps any `embedded-hal` output (embassy's `Output`) for
//! the display control lines. [`PacPin`] drives a pin straight through the
//! GPIO registers; bus recovery uses it to take SCL/SDA away from the I2C
//! peripheral without tearing the driver down.

use cadence_hal::{InputPin, OutputPin};
use embassy_stm32::pac::gpio::{vals, Gpio};

/// `cadence-hal` output over an `embedded-hal` output pin
///
/// Remembers the last level written, since `embedded-hal` only reports it
/// through `&mut self`.
pub struct HalOutput<P> {
    pin: P,
    high: bool,
}

impl<P: embedded_hal::digital::OutputPin> HalOutput<P> {
    /// Wrap `pin`, which must already be driving `high`
    pub fn new(pin: P, high: bool) -> Self {
        Self { pin, high }
    }
}

impl<P: embedded_hal::digital::OutputPin> OutputPin for HalOutput<P> {
    fn set_high(&mut self) {
        // Push-pull outputs on this chip are infallible
        let _ = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Register-level pin on one GPIO port
#[derive(Clone, Copy)]
pub struct PacPin {
    port: Gpio,
    pin: usize,
}

impl PacPin {
    /// Pin `pin` (0..=15) of `port`, e.g. `PacPin::new(pac::GPIOB, 8)`
    pub const fn new(port: Gpio, pin: usize) -> Self {
        Self { port, pin }
    }

    /// Switch to open-drain GPIO output, released high
    pub fn into_open_drain(&self) {
        self.port.bsrr().write(|w| w.set_bs(self.pin, true));
        self.port
            .otyper()
            .modify(|w| w.set_ot(self.pin, vals::Ot::OPEN_DRAIN));
        self.port
            .moder()
            .modify(|w| w.set_moder(self.pin, vals::Moder::OUTPUT));
    }

    /// Hand the pin back to its alternate function
    ///
    /// The AF number stays programmed in AFR while the pin is a GPIO.
    pub fn into_alternate(&self) {
        self.port
            .moder()
            .modify(|w| w.set_moder(self.pin, vals::Moder::ALTERNATE));
    }
}

impl OutputPin for PacPin {
    fn set_high(&mut self) {
        self.port.bsrr().write(|w| w.set_bs(self.pin, true));
    }

    fn set_low(&mut self) {
        self.port.bsrr().write(|w| w.set_br(self.pin, true));
    }

    fn is_set_high(&self) -> bool {
        self.port.odr().read().odr(self.pin) == vals::Odr::HIGH
    }
}

impl InputPin for PacPin {
    fn is_high(&self) -> bool {
        self.port.idr().read().idr(self.pin) == vals::Idr::HIGH
    }
}
