use cadence_hal::{BusError, BusLines, I2cBus, I2cErrorKind};
use embedded_hal::delay::DelayNs;

use super::recovery::recover_bus;
use super::{SensorStats, SensorStatus};
use crate::config::SensorConfig;
use crate::time::Interval;

/// Periodic reader for a single I2C sensor
pub struct SensorPoller<B, D> {
    bus: B,
    delay: D,
    address: u8,
    recovery_pulses: u8,
    interval: Interval,
    status: SensorStatus,
    stats: SensorStats,
}

impl<B, D> SensorPoller<B, D>
where
    B: I2cBus + BusLines,
    D: DelayNs,
{
    /// Poller whose first read happens on the first call to
    /// [`service`](Self::service)
    pub fn new(bus: B, delay: D, config: &SensorConfig) -> Self {
        Self {
            bus,
            delay,
            address: config.address,
            recovery_pulses: config.recovery_pulses,
            interval: Interval::new(config.poll_interval_ms),
            status: SensorStatus::default(),
            stats: SensorStats::default(),
        }
    }

    /// Poll if the interval has elapsed
    ///
    /// Returns the new status when a poll ran. A failed read runs bus
    /// recovery and is retried once; the value from the last good read is
    /// kept when both attempts fail.
    pub fn service(&mut self, now_ms: u32) -> Option<SensorStatus> {
        if !self.interval.poll(now_ms) {
            return None;
        }
        self.stats.polls = self.stats.polls.wrapping_add(1);

        let result = match self.read() {
            Ok(value) => Ok(value),
            Err(kind) => {
                warn!("sensor read failed: {}, recovering bus", kind);
                self.stats.failures = self.stats.failures.wrapping_add(1);
                self.stats.recoveries = self.stats.recoveries.wrapping_add(1);
                let report = recover_bus(&mut self.bus, &mut self.delay, self.recovery_pulses);
                debug!(
                    "bus recovery: {} pulses, released={}",
                    report.pulses,
                    report.released
                );
                self.read()
            }
        };

        match result {
            Ok(value) => {
                self.status = SensorStatus {
                    ok: true,
                    value,
                    error: None,
                };
            }
            Err(kind) => {
                error!("sensor retry failed: {}", kind);
                self.stats.failures = self.stats.failures.wrapping_add(1);
                self.status.ok = false;
                self.status.error = Some(kind);
            }
        }
        Some(self.status)
    }

    fn read(&mut self) -> Result<i32, I2cErrorKind> {
        let mut raw = [0u8; 2];
        self.bus
            .read(self.address, &mut raw)
            .map_err(|e| e.kind())?;
        Ok(i16::from_le_bytes(raw) as i32)
    }

    /// Status of the most recent poll
    pub fn status(&self) -> SensorStatus {
        self.status
    }

    pub fn stats(&self) -> SensorStats {
        self.stats
    }
}
