//! I2C bus recovery
//!
//! A slave that was interrupted mid-byte can keep SDA low forever. Clocking
//! SCL until it lets go and then issuing a STOP puts every device back in
//! idle.

use cadence_hal::{BusLines, InputPin, OutputPin};
use embedded_hal::delay::DelayNs;

/// What a recovery run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RecoveryReport {
    /// SCL pulses issued
    pub pulses: u8,
    /// SDA read high before the STOP
    pub released: bool,
}

/// Unstick the bus behind `lines`
///
/// Blocks for roughly `5 + 2 * pulses` ms. The controller is reattached
/// before returning whether or not SDA was released.
pub fn recover_bus<L, D>(lines: &mut L, delay: &mut D, max_pulses: u8) -> RecoveryReport
where
    L: BusLines,
    D: DelayNs,
{
    let (scl, sda) = lines.detach();
    scl.set_high();
    sda.set_high();
    delay.delay_ms(2);

    let mut pulses = 0;
    while pulses < max_pulses && sda.is_low() {
        scl.set_low();
        delay.delay_ms(1);
        scl.set_high();
        delay.delay_ms(1);
        pulses += 1;
    }
    let released = sda.is_high();

    // STOP: SDA rises while SCL is high
    sda.set_low();
    delay.delay_ms(1);
    scl.set_high();
    delay.delay_ms(1);
    sda.set_high();
    delay.delay_ms(2);

    lines.reattach();
    RecoveryReport { pulses, released }
}
