//! Packet-level network adapter abstraction
//!
//! Stacks like lwIP or smoltcp report progress through callbacks. Here the
//! adapter queues those as [`LinkEvent`]s during [`NetStack::poll`] and the
//! caller drains them afterwards, so no client code ever runs inside the
//! stack.

use core::net::SocketAddrV4;

/// Something the stack reported about the stream connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Handshake completed
    Connected,
    /// Handshake failed or was refused
    ConnectFailed,
    /// Peer acknowledged `len` bytes
    Sent(u16),
    /// `len` bytes arrived (and were discarded)
    Received(u16),
    /// Connection reset; the stack has already freed it
    Error,
    /// Peer closed the connection
    Closed,
}

/// Failure reported synchronously by the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetError {
    /// No link or no address yet
    LinkDown,
    /// Out of buffers
    Memory,
    /// Operation not valid for the current connection
    InvalidState,
}

/// Network adapter with one datagram socket and one stream connection
pub trait NetStack {
    /// Run timers and move packets; events raised here are queued
    fn poll(&mut self, now_ms: u32);

    /// Fire-and-forget datagram
    fn send_datagram(&mut self, remote: SocketAddrV4, payload: &[u8]) -> Result<(), NetError>;

    /// Start a stream handshake; completion arrives as a [`LinkEvent`]
    fn connect(&mut self, remote: SocketAddrV4) -> Result<(), NetError>;

    /// Queue bytes on the open stream and push them out
    fn write(&mut self, payload: &[u8]) -> Result<(), NetError>;

    /// Graceful close
    fn close(&mut self);

    /// Drop the connection immediately (RST)
    fn abort(&mut self);

    /// Next queued event, oldest first
    fn next_event(&mut self) -> Option<LinkEvent>;
}
