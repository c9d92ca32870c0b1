//! Host-side doubles for the HAL traits

use std::cell::Cell;
use std::collections::VecDeque;
use std::net::SocketAddrV4;

use cadence_hal::{
    BusLines, Console, DisplayBus, I2cBus, I2cErrorKind, InputPin, LinkEvent, NetError, NetStack,
    OutputPin,
};
use embedded_hal::delay::DelayNs;

use crate::display::{Rgb565, TextTarget};

/// Display bus that records commands and pixel bytes
#[derive(Debug, Default)]
pub struct MockDisplay {
    pub commands: Vec<(u8, Vec<u8>)>,
    pub pixels: Vec<u8>,
    /// Successful pixel writes
    pub writes: usize,
    /// Panel selected for streaming
    pub selected: bool,
    /// Pixel writes still to fail; `usize::MAX` fails forever
    pub fail_writes: usize,
    pub fail_commands: bool,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplayBus for MockDisplay {
    type Error = ();

    fn command(&mut self, cmd: u8, params: &[u8]) -> Result<(), ()> {
        if self.fail_commands {
            return Err(());
        }
        self.commands.push((cmd, params.to_vec()));
        Ok(())
    }

    fn begin_pixels(&mut self) {
        self.selected = true;
    }

    fn write_pixels(&mut self, data: &[u8]) -> Result<(), ()> {
        if self.fail_writes > 0 {
            if self.fail_writes != usize::MAX {
                self.fail_writes -= 1;
            }
            return Err(());
        }
        self.pixels.extend_from_slice(data);
        self.writes += 1;
        Ok(())
    }

    fn end_pixels(&mut self) {
        self.selected = false;
    }
}

/// Delay that only adds up
#[derive(Debug, Default)]
pub struct MockDelay {
    pub total_ns: u64,
    pub total_ms: u32,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
        self.total_ms = (self.total_ns / 1_000_000) as u32;
    }
}

/// Clock line; counts low pulses
#[derive(Debug)]
pub struct MockScl {
    pub high: bool,
    pub pulses: u32,
}

impl OutputPin for MockScl {
    fn set_high(&mut self) {
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
        self.pulses += 1;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Data line held low by a peer for the first `stuck_for` samples
#[derive(Debug)]
pub struct MockSda {
    pub high: bool,
    pub stuck_for: u32,
    pub samples: Cell<u32>,
}

impl OutputPin for MockSda {
    fn set_high(&mut self) {
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

impl InputPin for MockSda {
    fn is_high(&self) -> bool {
        let n = self.samples.get();
        self.samples.set(n.saturating_add(1));
        self.high && n >= self.stuck_for
    }
}

/// Sensor bus answering reads from a script
///
/// Once the script runs out every read returns two zero bytes.
#[derive(Debug)]
pub struct MockI2c {
    pub reads: VecDeque<Result<[u8; 2], I2cErrorKind>>,
    pub addresses: Vec<u8>,
    pub scl: MockScl,
    pub sda: MockSda,
    pub detached: bool,
    pub reattached: u32,
}

impl MockI2c {
    pub fn new() -> Self {
        Self {
            reads: VecDeque::new(),
            addresses: Vec::new(),
            scl: MockScl {
                high: true,
                pulses: 0,
            },
            sda: MockSda {
                high: true,
                stuck_for: 0,
                samples: Cell::new(0),
            },
            detached: false,
            reattached: 0,
        }
    }

    pub fn push_read(&mut self, result: Result<[u8; 2], I2cErrorKind>) {
        self.reads.push_back(result);
    }
}

impl I2cBus for MockI2c {
    type Error = I2cErrorKind;

    fn write(&mut self, address: u8, _data: &[u8]) -> Result<(), I2cErrorKind> {
        self.addresses.push(address);
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), I2cErrorKind> {
        assert!(!self.detached, "read while lines detached");
        self.addresses.push(address);
        let bytes = self.reads.pop_front().unwrap_or(Ok([0, 0]))?;
        buf.copy_from_slice(&bytes[..buf.len()]);
        Ok(())
    }
}

impl BusLines for MockI2c {
    type Scl = MockScl;
    type Sda = MockSda;

    fn detach(&mut self) -> (&mut MockScl, &mut MockSda) {
        self.detached = true;
        (&mut self.scl, &mut self.sda)
    }

    fn reattach(&mut self) {
        self.detached = false;
        self.reattached += 1;
    }
}

/// Network adapter with scripted results and queued events
#[derive(Debug)]
pub struct MockNet {
    pub events: VecDeque<LinkEvent>,
    pub polls: u32,
    pub connects: Vec<SocketAddrV4>,
    pub written: Vec<Vec<u8>>,
    pub datagrams: Vec<(SocketAddrV4, Vec<u8>)>,
    pub aborts: u32,
    pub closes: u32,
    pub connect_result: Result<(), NetError>,
    pub write_result: Result<(), NetError>,
    pub datagram_result: Result<(), NetError>,
}

impl MockNet {
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
            polls: 0,
            connects: Vec::new(),
            written: Vec::new(),
            datagrams: Vec::new(),
            aborts: 0,
            closes: 0,
            connect_result: Ok(()),
            write_result: Ok(()),
            datagram_result: Ok(()),
        }
    }
}

impl NetStack for MockNet {
    fn poll(&mut self, _now_ms: u32) {
        self.polls += 1;
    }

    fn send_datagram(&mut self, remote: SocketAddrV4, payload: &[u8]) -> Result<(), NetError> {
        self.datagram_result?;
        self.datagrams.push((remote, payload.to_vec()));
        Ok(())
    }

    fn connect(&mut self, remote: SocketAddrV4) -> Result<(), NetError> {
        self.connects.push(remote);
        self.connect_result
    }

    fn write(&mut self, payload: &[u8]) -> Result<(), NetError> {
        self.write_result?;
        self.written.push(payload.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        self.closes += 1;
    }

    fn abort(&mut self) {
        self.aborts += 1;
    }

    fn next_event(&mut self) -> Option<LinkEvent> {
        self.events.pop_front()
    }
}

/// Console fed from a queue of lines
#[derive(Debug, Default)]
pub struct MockConsole {
    pub input: VecDeque<String>,
    pub output: Vec<String>,
    pub tx_busy: bool,
}

impl Console for MockConsole {
    fn read_line(&mut self, buf: &mut [u8]) -> Option<usize> {
        let line = self.input.pop_front()?;
        let n = line.len().min(buf.len());
        buf[..n].copy_from_slice(&line.as_bytes()[..n]);
        Some(n)
    }

    fn print_safe(&mut self, text: &str) {
        self.output.push(text.to_string());
    }

    fn tx_idle(&self) -> bool {
        !self.tx_busy
    }
}

/// Text target that records submissions instantly
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub busy: bool,
    pub refuse: bool,
    pub rendered: Vec<(u16, String)>,
}

impl TextTarget for RecordingTarget {
    fn is_busy(&self) -> bool {
        self.busy
    }

    fn start_text_line(&mut self, y: u16, text: &str, _fg: Rgb565, _bg: Rgb565) -> bool {
        if self.refuse {
            return false;
        }
        self.rendered.push((y, text.to_string()));
        true
    }
}
