use crate::config::ConsoleConfig;
use crate::time::Interval;

/// Periodic status line on the console
#[derive(Debug, Clone, Copy)]
pub struct StatusLog {
    enabled: bool,
    interval: Interval,
}

impl StatusLog {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            enabled: config.log_enabled,
            interval: Interval::new(config.log_period_ms),
        }
    }

    /// Turn the log on or off
    ///
    /// Enabling restarts the period so the first line comes one period
    /// later rather than immediately.
    pub fn set_enabled(&mut self, enabled: bool, now_ms: u32) {
        self.enabled = enabled;
        if enabled {
            self.interval = Interval::starting_at(now_ms, self.interval.period());
        }
    }

    pub fn set_period(&mut self, period_ms: u32) {
        self.interval.set_period(period_ms);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn period(&self) -> u32 {
        self.interval.period()
    }

    /// True when a status line should be printed now
    pub fn due(&mut self, now_ms: u32) -> bool {
        self.enabled && self.interval.poll(now_ms)
    }
}
