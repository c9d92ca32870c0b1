//! Wrap-safe millisecond deadlines
//!
//! The tick counter is a `u32` that wraps after ~49.7 days. Deadlines are
//! compared by the sign of `now - deadline`, which stays correct across the
//! wrap as long as no deadline is more than 2^31 ms away.

/// True once `now` is at or past `deadline`
#[inline]
pub fn reached(now: u32, deadline: u32) -> bool {
    (now.wrapping_sub(deadline) as i32) >= 0
}

/// Milliseconds elapsed since `since`
#[inline]
pub fn elapsed(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Fixed-period trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interval {
    period_ms: u32,
    next_ms: u32,
}

impl Interval {
    /// Interval whose first firing is due immediately
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            next_ms: 0,
        }
    }

    /// Interval whose first firing is one period after `now`
    pub const fn starting_at(now: u32, period_ms: u32) -> Self {
        Self {
            period_ms,
            next_ms: now.wrapping_add(period_ms),
        }
    }

    /// Fire if due, rescheduling one period after `now`
    ///
    /// Rescheduling from `now` rather than from the old deadline means a
    /// late tick never causes a burst of catch-up firings.
    pub fn poll(&mut self, now: u32) -> bool {
        if !reached(now, self.next_ms) {
            return false;
        }
        self.next_ms = now.wrapping_add(self.period_ms);
        true
    }

    /// Change the period; takes effect from the next firing
    pub fn set_period(&mut self, period_ms: u32) {
        self.period_ms = period_ms;
    }

    /// Current period
    pub fn period(&self) -> u32 {
        self.period_ms
    }

    /// When the next firing is due
    pub fn next_due(&self) -> u32 {
        self.next_ms
    }
}
