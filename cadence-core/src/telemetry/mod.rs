//! Telemetry records
//!
//! One [`Sample`] is taken per publish period and encoded as a single
//! newline-terminated JSON-style line, sent unchanged over both the
//! datagram and the stream path.

pub mod codec;

pub use codec::{decode, encode, CodecError, Record, RECORD_CAPACITY};

use crate::snapshot::SnapshotText;
use crate::text::push_truncated;

/// Point-in-time view of everything the link reports
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Milliseconds since boot
    pub timestamp_ms: u32,
    /// Last sensor reading
    pub reading: i32,
    /// First decoder snapshot
    pub snapshot_a: SnapshotText,
    /// Second decoder snapshot
    pub snapshot_b: SnapshotText,
}

impl Sample {
    /// Build a sample, cutting snapshots to capacity
    pub fn new(timestamp_ms: u32, reading: i32, snapshot_a: &str, snapshot_b: &str) -> Self {
        let mut sample = Self {
            timestamp_ms,
            reading,
            ..Self::default()
        };
        push_truncated(&mut sample.snapshot_a, snapshot_a);
        push_truncated(&mut sample.snapshot_b, snapshot_b);
        sample
    }
}
