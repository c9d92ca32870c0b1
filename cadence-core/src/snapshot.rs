//! Interrupt-to-loop text snapshots
//!
//! The broadcast-bus decoder runs in interrupt context and publishes a
//! short text per message type. The main loop reads copies. Each slot is a
//! single-slot mailbox: the interrupt only ever overwrites it, the loop only
//! ever copies out, and both sides hold the critical section for one bounded
//! copy.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::String;

use crate::text::push_truncated;
use crate::time::{elapsed, reached};

/// Longest snapshot text kept
pub const SNAPSHOT_CAPACITY: usize = 63;

/// Text returned for stale or missing snapshots
pub const NONE_TEXT: &str = "none";

/// Owned copy of a snapshot
pub type SnapshotText = String<SNAPSHOT_CAPACITY>;

/// Source of the two decoder snapshots
pub trait SnapshotSource {
    /// First snapshot, or `"none"` when stale
    fn snapshot_a(&self, now_ms: u32) -> SnapshotText;

    /// Second snapshot, or `"none"` when stale
    fn snapshot_b(&self, now_ms: u32) -> SnapshotText;
}

struct Slot {
    text: SnapshotText,
    stamp_ms: u32,
    valid: bool,
}

/// One mailbox
pub struct SnapshotSlot {
    inner: Mutex<RefCell<Slot>>,
}

impl Default for SnapshotSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSlot {
    /// Empty slot; reads as stale until first published
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Slot {
                text: String::new(),
                stamp_ms: 0,
                valid: false,
            })),
        }
    }

    /// Replace the text, stamped with `now_ms`
    ///
    /// Safe to call from an interrupt handler. Long text is cut to
    /// [`SNAPSHOT_CAPACITY`] bytes.
    pub fn publish(&self, text: &str, now_ms: u32) {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow_ref_mut(cs);
            slot.text.clear();
            push_truncated(&mut slot.text, text);
            slot.stamp_ms = now_ms;
            slot.valid = true;
        });
    }

    /// Copy of the text if it is no older than `freshness_ms`
    ///
    /// A stamp later than `now_ms` (published after the caller read the
    /// clock) counts as fresh.
    pub fn read(&self, now_ms: u32, freshness_ms: u32) -> Option<SnapshotText> {
        critical_section::with(|cs| {
            let slot = self.inner.borrow_ref(cs);
            let fresh = !reached(now_ms, slot.stamp_ms)
                || elapsed(now_ms, slot.stamp_ms) <= freshness_ms;
            if slot.valid && fresh {
                Some(slot.text.clone())
            } else {
                None
            }
        })
    }

    /// Like [`read`](Self::read) but stale reads as `"none"`
    pub fn read_or_none(&self, now_ms: u32, freshness_ms: u32) -> SnapshotText {
        self.read(now_ms, freshness_ms).unwrap_or_else(none_text)
    }
}

fn none_text() -> SnapshotText {
    let mut text = String::new();
    push_truncated(&mut text, NONE_TEXT);
    text
}

/// The two decoder mailboxes, usually a `static`
pub struct BusSnapshots {
    a: SnapshotSlot,
    b: SnapshotSlot,
}

impl Default for BusSnapshots {
    fn default() -> Self {
        Self::new()
    }
}

impl BusSnapshots {
    pub const fn new() -> Self {
        Self {
            a: SnapshotSlot::new(),
            b: SnapshotSlot::new(),
        }
    }

    /// Publish the first snapshot (interrupt side)
    pub fn publish_a(&self, text: &str, now_ms: u32) {
        self.a.publish(text, now_ms);
    }

    /// Publish the second snapshot (interrupt side)
    pub fn publish_b(&self, text: &str, now_ms: u32) {
        self.b.publish(text, now_ms);
    }

    /// Loop-side reader applying a freshness window
    pub fn view(&self, freshness_ms: u32) -> SnapshotView<'_> {
        SnapshotView {
            slots: self,
            freshness_ms,
        }
    }
}

/// [`SnapshotSource`] over a [`BusSnapshots`]
#[derive(Clone, Copy)]
pub struct SnapshotView<'a> {
    slots: &'a BusSnapshots,
    freshness_ms: u32,
}

impl SnapshotSource for SnapshotView<'_> {
    fn snapshot_a(&self, now_ms: u32) -> SnapshotText {
        self.slots.a.read_or_none(now_ms, self.freshness_ms)
    }

    fn snapshot_b(&self, now_ms: u32) -> SnapshotText {
        self.slots.b.read_or_none(now_ms, self.freshness_ms)
    }
}
