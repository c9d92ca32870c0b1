//! Millisecond clock and idle wait
//!
//! Time comes from the embassy time driver. SysTick only wakes the core
//! once a millisecond so a `WFI` never sleeps through a service deadline;
//! the firmware's SysTick handler has nothing to do.

use cadence_hal::{Idle, Monotonic};
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;
use embassy_time::Instant;

/// Milliseconds from the embassy time driver, truncated to `u32`
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Monotonic for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}

/// Sleeps with `WFI`, woken at least every millisecond by SysTick
pub struct WfiIdle {
    _syst: SYST,
}

impl WfiIdle {
    /// Program SysTick for a 1 kHz wakeup from the core clock
    pub fn new(mut syst: SYST, core_hz: u32) -> Self {
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload((core_hz / 1000).saturating_sub(1));
        syst.clear_current();
        syst.enable_counter();
        syst.enable_interrupt();
        Self { _syst: syst }
    }
}

impl Idle for WfiIdle {
    fn wait_for_interrupt(&mut self) {
        cortex_m::asm::wfi();
    }
}
