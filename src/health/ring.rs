//! Lock-free bounded ring of packed observations.
//!
//! # Responsibilities
//! - Append from any thread without locking
//! - Evict from the front by capacity or by age
//! - Scan retained entries in arrival order without copying
//!
//! # Design Decisions
//! - Each observation packs into one `AtomicU64` next to a sequence tag
//! - `head` and `tail` are monotonic sequence numbers; `slot = seq % capacity`
//! - A slot is readable for `seq` only while its tag is `seq + 1`. A writer
//!   marks the tag busy, stores the value, then publishes the tag, so a claimed
//!   slot whose value has not landed is never mistaken for an older entry
//! - Under concurrent writers a scan skips slots that are mid-write, so counts
//!   are best-effort while appends race; sequential use is exact

use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

/// An observation that fits in a `u64`.
pub trait Packed: Copy {
    fn pack(self) -> u64;
    fn unpack(raw: u64) -> Self;
    /// Arrival time in unix seconds.
    fn timestamp(&self) -> u64;
}

/// Tag of a slot a writer is filling.
const BUSY: u64 = u64::MAX;

#[derive(Debug)]
struct Slot {
    /// `seq + 1` of the landed value, `0` when never written.
    tag: AtomicU64,
    value: AtomicU64,
}

#[derive(Debug)]
pub struct ObservationRing<T> {
    slots: Box<[Slot]>,
    head: AtomicU64,
    tail: AtomicU64,
    _marker: PhantomData<T>,
}

impl<T: Packed> ObservationRing<T> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        let slots = (0..capacity.get())
            .map(|_| Slot {
                tag: AtomicU64::new(0),
                value: AtomicU64::new(0),
            })
            .collect();
        Self {
            slots,
            head: AtomicU64::new(0),
            tail: AtomicU64::new(0),
            _marker: PhantomData,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, seq: u64) -> &Slot {
        &self.slots[(seq % self.slots.len() as u64) as usize]
    }

    /// The entry for `seq`, if it has landed and not been overwritten.
    fn read(&self, seq: u64) -> Option<T> {
        let slot = self.slot(seq);
        let tag = slot.tag.load(Ordering::Acquire);
        if tag != seq + 1 {
            return None;
        }
        let raw = slot.value.load(Ordering::Acquire);
        // A newer writer marks the tag busy before touching the value.
        (slot.tag.load(Ordering::Acquire) == tag).then(|| T::unpack(raw))
    }

    fn write(&self, seq: u64, obs: T) {
        let slot = self.slot(seq);
        slot.tag.store(BUSY, Ordering::Release);
        slot.value.store(obs.pack(), Ordering::Release);
        slot.tag.store(seq + 1, Ordering::Release);
    }

    /// Oldest sequence still inside the capacity bound.
    fn live_range(&self) -> (u64, u64) {
        let head = self.head.load(Ordering::Acquire);
        let floor = head.saturating_sub(self.slots.len() as u64);
        let tail = self.tail.load(Ordering::Acquire).max(floor);
        (tail, head)
    }

    pub fn push(&self, obs: T) {
        let seq = self.head.fetch_add(1, Ordering::AcqRel);
        self.write(seq, obs);
    }

    /// Drop the oldest entries while more than `capacity` are retained.
    pub fn evict_over_capacity(&self) {
        let head = self.head.load(Ordering::Acquire);
        let floor = head.saturating_sub(self.slots.len() as u64);
        self.tail.fetch_max(floor, Ordering::AcqRel);
    }

    /// Drop entries from the front whose timestamp is before `cutoff`.
    pub fn evict_older_than(&self, cutoff: u64) {
        loop {
            let (tail, head) = self.live_range();
            if tail >= head {
                return;
            }

            // Not landed yet, or already lapped: stop either way.
            match self.read(tail) {
                Some(obs) if obs.timestamp() < cutoff => {}
                _ => return,
            }

            // `tail` may sit below the capacity floor; the CAS lifts it past both.
            let stored = self.tail.load(Ordering::Acquire);
            if stored > tail {
                continue;
            }
            let _ = self.tail.compare_exchange(
                stored,
                tail + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
    }

    /// Number of retained entries, never more than `capacity`.
    pub fn len(&self) -> usize {
        let (tail, head) = self.live_range();
        head.saturating_sub(tail) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit retained entries oldest first.
    pub fn for_each(&self, mut f: impl FnMut(T)) {
        let (tail, head) = self.live_range();
        for seq in tail..head {
            if let Some(obs) = self.read(seq) {
                f(obs);
            }
        }
    }

    pub fn count(&self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let mut count = 0;
        self.for_each(|obs| {
            if predicate(&obs) {
                count += 1;
            }
        });
        count
    }

    pub fn snapshot(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        self.for_each(|obs| out.push(obs));
        out
    }
}
