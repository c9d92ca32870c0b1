//! UART operator console
//!
//! Receive bytes arrive through the driver's interrupt-fed ring buffer and
//! are fed to a [`LineEditor`] from the main loop. Output (echo and printed
//! lines) is staged in a local queue and handed to the driver a chunk at a
//! time, so a long response never holds the loop.

use cadence_core::console::{LineEditor, PROMPT};
use cadence_hal::Console;
use embedded_io::{Read, ReadReady, Write};
use heapless::Vec;

/// Bytes staged for transmit
pub const TX_QUEUE_LEN: usize = 1024;

/// Most bytes handed to the driver per service call
const TX_CHUNK: usize = 64;

/// Console over any `embedded-io` serial port (embassy's `BufferedUart`)
pub struct UartConsole<U> {
    uart: U,
    editor: LineEditor,
    tx: Vec<u8, TX_QUEUE_LEN>,
    /// Bytes lost to a full queue or a driver error
    dropped: u32,
}

impl<U> UartConsole<U>
where
    U: Read + ReadReady + Write,
{
    /// Wrap `uart` and queue the first prompt
    pub fn new(uart: U) -> Self {
        let mut tx = Vec::new();
        let _ = tx.extend_from_slice(PROMPT.as_bytes());
        Self {
            uart,
            editor: LineEditor::new(),
            tx,
            dropped: 0,
        }
    }

    /// Bytes dropped so far
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    fn pump_rx(&mut self) {
        let mut buf = [0u8; 32];
        while matches!(self.uart.read_ready(), Ok(true)) {
            let n = match self.uart.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            for &byte in &buf[..n] {
                let before = self.tx.len();
                self.editor.feed(byte, &mut self.tx);
                if self.tx.len() == before && self.tx.is_full() {
                    self.dropped = self.dropped.saturating_add(1);
                }
            }
            if self.editor.has_line() {
                // One line per call; the rest stays in the ring
                break;
            }
        }
    }

    fn pump_tx(&mut self) {
        if self.tx.is_empty() {
            return;
        }
        let len = self.tx.len().min(TX_CHUNK);
        match self.uart.write(&self.tx[..len]) {
            Ok(n) => {
                self.tx.copy_within(n.., 0);
                self.tx.truncate(self.tx.len() - n);
            }
            Err(_) => {
                self.dropped = self.dropped.saturating_add(self.tx.len() as u32);
                self.tx.clear();
                #[cfg(feature = "defmt")]
                defmt::warn!("console: uart write failed, output dropped");
            }
        }
    }
}

impl<U> Console for UartConsole<U>
where
    U: Read + ReadReady + Write,
{
    fn read_line(&mut self, buf: &mut [u8]) -> Option<usize> {
        self.pump_tx();
        if !self.editor.has_line() {
            self.pump_rx();
        }
        let line = self.editor.take_line()?;
        let n = line.len().min(buf.len());
        buf[..n].copy_from_slice(&line.as_bytes()[..n]);
        Some(n)
    }

    fn print_safe(&mut self, text: &str) {
        if !self.editor.frame_output(text, &mut self.tx) {
            self.dropped = self.dropped.saturating_add(text.len() as u32);
            #[cfg(feature = "defmt")]
            defmt::warn!("console: tx queue full, {} bytes dropped", text.len());
        }
        self.pump_tx();
    }

    fn tx_idle(&self) -> bool {
        self.tx.is_empty()
    }
}
