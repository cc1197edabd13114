//! Single-slot, latest-wins handoff cell.
//!
//! The writer overwrites; the reader takes whatever is newest without
//! waiting.  Stale values are dropped, never queued.

use parking_lot::Mutex;

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    seq:   u64,
}

/// A single-producer / single-consumer overwrite cell.
#[derive(Debug)]
pub struct Mailbox<T> {
    slot: Mutex<Slot<T>>,
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self { Mailbox::new() }
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Mailbox { slot: Mutex::new(Slot { value: None, seq: 0 }) }
    }

    /// Replace the stored value.  Returns the new sequence number (1-based).
    pub fn post(&self, value: T) -> u64 {
        let mut slot = self.slot.lock();
        slot.seq += 1;
        slot.value = Some(value);
        slot.seq
    }
}

impl<T: Clone> Mailbox<T> {
    /// Newest value with its sequence number.
    pub fn latest(&self) -> Option<(u64, T)> {
        let slot = self.slot.lock();
        slot.value.clone().map(|v| (slot.seq, v))
    }

    /// Newest value if it is newer than `last_seen`; advances `last_seen`.
    pub fn take_newer(&self, last_seen: &mut u64) -> Option<T> {
        let slot = self.slot.lock();
        if slot.seq <= *last_seen { return None; }
        *last_seen = slot.seq;
        slot.value.clone()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
