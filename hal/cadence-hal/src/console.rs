//! Operator console abstraction
//!
//! The transport (UART, USB CDC) assembles input lines in interrupt context
//! and owns the transmit queue. The main loop only ever sees complete lines.

/// Line-oriented console
pub trait Console {
    /// Take the next complete input line, without its terminator
    ///
    /// Copies at most `buf.len()` bytes and returns the length, or `None`
    /// if no full line has been received yet. Never blocks.
    fn read_line(&mut self, buf: &mut [u8]) -> Option<usize>;

    /// Print `text` on its own line
    ///
    /// Whatever the operator has typed so far is redrawn after the output,
    /// so this is safe to call at any time.
    fn print_safe(&mut self, text: &str);

    /// True once everything queued for transmit has gone out
    fn tx_idle(&self) -> bool;
}
