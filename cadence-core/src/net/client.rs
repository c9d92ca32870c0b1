//! Telemetry client
//!
//! Datagrams are fire-and-forget. The stream side allows one write in
//! flight: `pending_len` is set on a successful write and cleared when the
//! peer acknowledges it, and `send_stream` refuses while it is nonzero.
//!
//! The adapter never calls back into the client. Everything it reports is
//! queued during [`NetStack::poll`] and drained here afterwards.

use core::fmt::Write;
use core::net::{Ipv4Addr, SocketAddrV4};

use cadence_hal::{LinkEvent, NetStack};
use heapless::String;

use super::state::{ConnEvent, LinkState};
use crate::config::{ConfigError, TelemetryConfig};
use crate::telemetry::{encode, Sample};
use crate::text::truncate;
use crate::time::{elapsed, reached, Interval};

/// Longest last-payload summary kept for the status view
pub const SUMMARY_CAPACITY: usize = 63;

/// Snapshot bytes shown in the stream summary
const STREAM_SUMMARY_SNAPSHOT: usize = 58;

/// Where telemetry goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remote {
    pub ip: Ipv4Addr,
    pub udp_port: u16,
    pub tcp_port: u16,
}

impl Remote {
    pub const fn new(ip: Ipv4Addr, udp_port: u16, tcp_port: u16) -> Self {
        Self {
            ip,
            udp_port,
            tcp_port,
        }
    }

    /// Read the remote out of a validated config
    pub fn from_config(config: &TelemetryConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.remote_addr()?,
            config.udp_port,
            config.tcp_port,
        ))
    }

    fn datagram(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.ip, self.udp_port)
    }

    fn stream(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.ip, self.tcp_port)
    }
}

/// Link counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    pub datagrams_sent: u32,
    pub datagrams_dropped: u32,
    pub stream_sent: u32,
    pub stream_rejected: u32,
    pub connect_attempts: u32,
}

/// Datagram plus auto-reconnecting stream client
pub struct TelemetryClient<S> {
    stack: S,
    remote: Remote,
    state: LinkState,
    pending_len: u16,
    /// Earliest time for the next connect; `None` allows one right away
    next_connect_ms: Option<u32>,
    connect_started_ms: u32,
    reconnect_delay_ms: u32,
    connect_timeout_ms: u32,
    /// Latest time seen by any entry point
    now_ms: u32,
    poll_interval: Interval,
    publish_interval: Interval,
    last_datagram: String<SUMMARY_CAPACITY>,
    last_stream: String<SUMMARY_CAPACITY>,
    stats: LinkStats,
}

impl<S: NetStack> TelemetryClient<S> {
    pub fn new(stack: S, remote: Remote, config: &TelemetryConfig) -> Self {
        Self {
            stack,
            remote,
            state: LinkState::Down,
            pending_len: 0,
            next_connect_ms: None,
            connect_started_ms: 0,
            reconnect_delay_ms: config.reconnect_delay_ms,
            connect_timeout_ms: config.connect_timeout_ms,
            now_ms: 0,
            poll_interval: Interval::new(config.poll_interval_ms),
            publish_interval: Interval::new(config.send_interval_ms),
            last_datagram: String::new(),
            last_stream: String::new(),
            stats: LinkStats::default(),
        }
    }

    /// Service the adapter and the connection
    ///
    /// Runs at most once per poll interval. Queued adapter events are
    /// handled after the adapter poll returns, then the connect timeout and
    /// the reconnect deadline are checked.
    pub fn poll(&mut self, now_ms: u32) {
        if !self.poll_interval.poll(now_ms) {
            return;
        }
        self.now_ms = now_ms;
        self.stack.poll(now_ms);

        while let Some(event) = self.stack.next_event() {
            self.handle_event(event);
        }

        if self.state == LinkState::Connecting
            && elapsed(now_ms, self.connect_started_ms) >= self.connect_timeout_ms
        {
            warn!("net: connect timed out after {} ms", self.connect_timeout_ms);
            self.stack.abort();
            self.go_down(ConnEvent::TimedOut);
        }

        if self.state == LinkState::Down {
            self.connect(now_ms);
        }
    }

    /// True once per send period
    pub fn publish_due(&mut self, now_ms: u32) -> bool {
        self.publish_interval.poll(now_ms)
    }

    /// Send `sample` over both transports and refresh the summaries
    pub fn publish(&mut self, sample: &Sample) {
        let record = encode(sample);

        self.last_datagram.clear();
        let _ = write!(
            self.last_datagram,
            "ts={} i2c={}",
            sample.timestamp_ms,
            sample.reading
        );
        self.last_stream.clear();
        let _ = write!(
            self.last_stream,
            "C101={}",
            truncate(&sample.snapshot_a, STREAM_SUMMARY_SNAPSHOT)
        );

        self.send_datagram(record.as_bytes());
        self.send_stream(record.as_bytes());
    }

    /// Start a stream handshake if down and the reconnect deadline allows
    ///
    /// Every attempt, successful or not, pushes the deadline one reconnect
    /// delay out. Returns `true` if a handshake was started.
    pub fn connect(&mut self, now_ms: u32) -> bool {
        self.now_ms = now_ms;
        if self.state != LinkState::Down {
            return false;
        }
        if self.next_connect_ms.is_some_and(|at| !reached(now_ms, at)) {
            return false;
        }

        self.stats.connect_attempts = self.stats.connect_attempts.wrapping_add(1);
        self.next_connect_ms = Some(now_ms.wrapping_add(self.reconnect_delay_ms));

        match self.stack.connect(self.remote.stream()) {
            Ok(()) => {
                debug!("net: connecting");
                self.connect_started_ms = now_ms;
                self.state = self.state.transition(ConnEvent::ConnectStarted);
                true
            }
            Err(e) => {
                warn!("net: connect refused locally: {}", e);
                self.stack.abort();
                false
            }
        }
    }

    /// Write one record on the stream
    ///
    /// Refused while not up or while an earlier write is unacknowledged. A
    /// write error drops the connection and schedules a reconnect.
    pub fn send_stream(&mut self, bytes: &[u8]) -> bool {
        if !self.state.is_up() || self.pending_len != 0 || bytes.is_empty() {
            self.stats.stream_rejected = self.stats.stream_rejected.wrapping_add(1);
            return false;
        }

        match self.stack.write(bytes) {
            Ok(()) => {
                self.pending_len = u16::try_from(bytes.len()).unwrap_or(u16::MAX);
                self.stats.stream_sent = self.stats.stream_sent.wrapping_add(1);
                true
            }
            Err(e) => {
                warn!("net: stream write failed: {}", e);
                self.stats.stream_rejected = self.stats.stream_rejected.wrapping_add(1);
                self.stack.abort();
                self.go_down(ConnEvent::Error);
                false
            }
        }
    }

    /// Fire one datagram; failures are counted and forgotten
    pub fn send_datagram(&mut self, bytes: &[u8]) -> bool {
        match self.stack.send_datagram(self.remote.datagram(), bytes) {
            Ok(()) => {
                self.stats.datagrams_sent = self.stats.datagrams_sent.wrapping_add(1);
                true
            }
            Err(_) => {
                self.stats.datagrams_dropped = self.stats.datagrams_dropped.wrapping_add(1);
                false
            }
        }
    }

    /// Point both transports somewhere else
    ///
    /// An active stream is aborted; the next connect uses the new remote.
    pub fn set_remote(&mut self, remote: Remote) {
        if self.state != LinkState::Down {
            self.stack.abort();
        }
        self.remote = remote;
        self.state = self.state.transition(ConnEvent::Reset);
        self.pending_len = 0;
        info!(
            "net: remote changed, udp port {} tcp port {}",
            remote.udp_port,
            remote.tcp_port
        );
    }

    fn handle_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Connected => {
                let next = self.state.transition(ConnEvent::Connected);
                if next != self.state {
                    info!("net: stream up");
                }
                self.state = next;
            }
            LinkEvent::ConnectFailed => {
                if self.state == LinkState::Connecting {
                    warn!("net: connect failed");
                    self.stack.abort();
                    self.go_down(ConnEvent::ConnectFailed);
                }
            }
            LinkEvent::Sent(len) => {
                trace!("net: {} bytes acknowledged", len);
                self.pending_len = 0;
            }
            LinkEvent::Received(len) => {
                trace!("net: discarded {} received bytes", len);
            }
            LinkEvent::Error => {
                if self.state != LinkState::Down {
                    warn!("net: connection reset");
                    self.go_down(ConnEvent::Error);
                }
            }
            LinkEvent::Closed => {
                if self.state != LinkState::Down {
                    info!("net: peer closed");
                    self.stack.close();
                    self.go_down(ConnEvent::Closed);
                }
            }
        }
    }

    /// Drop to Down, forget the in-flight write and back off
    fn go_down(&mut self, event: ConnEvent) {
        self.state = self.state.transition(event);
        self.pending_len = 0;
        self.next_connect_ms = Some(self.now_ms.wrapping_add(self.reconnect_delay_ms));
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Bytes of the unacknowledged stream write, 0 if none
    pub fn pending_len(&self) -> u16 {
        self.pending_len
    }

    pub fn remote(&self) -> Remote {
        self.remote
    }

    /// Datagram send period
    pub fn send_interval_ms(&self) -> u32 {
        self.publish_interval.period()
    }

    /// `ts=<ts> i2c=<value>` of the last publish
    pub fn last_datagram(&self) -> &str {
        &self.last_datagram
    }

    /// `C101=<snapshot A>` of the last publish
    pub fn last_stream(&self) -> &str {
        &self.last_stream
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    #[cfg(test)]
    pub(crate) fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }
}
