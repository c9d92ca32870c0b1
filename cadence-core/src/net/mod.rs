//! Telemetry link
//!
//! Two transports carry the same records: fire-and-forget datagrams and a
//! single stream connection that is re-established after any failure.

mod client;
mod state;

pub use client::{LinkStats, Remote, TelemetryClient, SUMMARY_CAPACITY};
pub use state::{ConnEvent, LinkState};
