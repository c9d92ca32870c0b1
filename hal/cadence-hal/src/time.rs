//! Time source and idle hooks

/// Free-running millisecond counter
///
/// Wraps after about 49.7 days; consumers compare with signed deltas.
pub trait Monotonic {
    /// Milliseconds since boot
    fn now_ms(&self) -> u32;
}

/// Low-power wait
pub trait Idle {
    /// Halt the core until the next interrupt
    fn wait_for_interrupt(&mut self);
}
