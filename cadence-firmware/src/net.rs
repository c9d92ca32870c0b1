//! Network adapter slot
//!
//! The Ethernet MAC and IP stack sit behind [`NetStack`]. Until a board
//! wires one in, [`UnlinkedStack`] stands in: every send and connect
//! reports the link as down, so the telemetry client stays in its backoff
//! cycle and the rest of the loop runs normally.

use core::net::SocketAddrV4;

use cadence_hal::{LinkEvent, NetError, NetStack};

/// Adapter with no link
#[derive(Debug, Default)]
pub struct UnlinkedStack;

impl NetStack for UnlinkedStack {
    fn poll(&mut self, _now_ms: u32) {}

    fn send_datagram(&mut self, _remote: SocketAddrV4, _payload: &[u8]) -> Result<(), NetError> {
        Err(NetError::LinkDown)
    }

    fn connect(&mut self, _remote: SocketAddrV4) -> Result<(), NetError> {
        Err(NetError::LinkDown)
    }

    fn write(&mut self, _payload: &[u8]) -> Result<(), NetError> {
        Err(NetError::InvalidState)
    }

    fn close(&mut self) {}

    fn abort(&mut self) {}

    fn next_event(&mut self) -> Option<LinkEvent> {
        None
    }
}
