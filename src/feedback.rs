//! Lock-free feedback event transport.
//!
//! The session's entire observable surface flows through here: the poll
//! loop pushes [`FeedbackEvent`]s, the presentation layer drains them
//! through a [`FeedbackConsumer`] and renders whatever it finds. The core
//! never calls into presentation code.
//!
//! ```text
//! poll loop ──────▶ FeedbackStream ──────▶ presentation
//!                   (lock-free ring)       (best-effort)
//! ```
//!
//! The producer never blocks and never allocates. The consumer is
//! best-effort: if it falls a full ring behind it skips forward, records
//! the gap, raises [`FaultCode::FeedbackOverrun`] and keeps going —
//! a slow display must never stall the key.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::event::FeedbackEvent;
use crate::fault::{FaultCode, FaultState};

/// Default ring capacity. Events are sparse (a handful per press), so a
/// small ring gives the presentation layer seconds of slack.
pub const DEFAULT_FEEDBACK_CAPACITY: usize = 64;

/// Single-producer ring buffer of feedback events.
///
/// # Safety
///
/// Uses `UnsafeCell` internally but is safe under the architecture's
/// rules: exactly one producer (the poll loop), any number of consumers
/// each holding their own read index, all coordination through the atomic
/// write index. The producer's `AcqRel` increment pairs with consumers'
/// `Acquire` loads so a published slot is fully written before its index
/// becomes visible.
pub struct FeedbackStream<const N: usize = DEFAULT_FEEDBACK_CAPACITY> {
    slots: UnsafeCell<[FeedbackEvent; N]>,
    /// Next write index, monotonically increasing; wraps via mask.
    write_idx: AtomicU32,
}

// SAFETY: single producer, read-only consumers, atomic index coordination.
unsafe impl<const N: usize> Sync for FeedbackStream<N> {}
unsafe impl<const N: usize> Send for FeedbackStream<N> {}

impl<const N: usize> FeedbackStream<N> {
    const MASK: usize = N - 1;

    /// Create an empty stream.
    ///
    /// # Panics
    ///
    /// Compile-time panic if `N` is not a power of two.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "feedback capacity must be power of 2");

        Self {
            slots: UnsafeCell::new([FeedbackEvent::EMPTY; N]),
            write_idx: AtomicU32::new(0),
        }
    }

    /// Publish one event. O(1), never blocks.
    #[inline]
    pub fn push(&self, event: FeedbackEvent) {
        let idx = self.write_idx.fetch_add(1, Ordering::AcqRel) as usize;

        // SAFETY: single producer; each index is written exactly once
        // before the incremented write_idx makes it readable.
        unsafe {
            (*self.slots.get())[idx & Self::MASK] = event;
        }
    }

    /// Read the event at `idx`.
    ///
    /// `None` if not yet written, or already overwritten because the
    /// reader is more than a full ring behind.
    #[inline]
    pub fn read(&self, idx: u32) -> Option<FeedbackEvent> {
        let write = self.write_idx.load(Ordering::Acquire);
        let behind = write.wrapping_sub(idx);

        if behind == 0 || behind > N as u32 {
            return None;
        }

        // SAFETY: slot is published and not yet reclaimed by the producer.
        Some(unsafe { (*self.slots.get())[(idx as usize) & Self::MASK] })
    }

    /// Current write head; new consumers start reading here.
    #[inline]
    pub fn write_head(&self) -> u32 {
        self.write_idx.load(Ordering::Acquire)
    }

    /// Events a reader at `reader_idx` has not yet seen.
    #[inline]
    pub fn lag(&self, reader_idx: u32) -> u32 {
        self.write_head().wrapping_sub(reader_idx)
    }

    /// True when a reader has lost events to overwriting.
    #[inline]
    pub fn is_overrun(&self, reader_idx: u32) -> bool {
        self.lag(reader_idx) > N as u32
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for FeedbackStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort reader for the presentation layer.
///
/// "I render what I can. If I fall behind, I skip and say so."
///
/// Never stalls the producer and never returns an error: on overrun it
/// resyncs to half a ring behind the head (leaving room to catch up),
/// adds the gap to `dropped()` and raises a fault for diagnostics.
pub struct FeedbackConsumer<'a, const N: usize = DEFAULT_FEEDBACK_CAPACITY> {
    stream: &'a FeedbackStream<N>,
    fault: &'a FaultState,
    read_idx: u32,
    dropped: u32,
}

impl<'a, const N: usize> FeedbackConsumer<'a, N> {
    /// Attach to a stream, starting at its current head.
    pub fn new(stream: &'a FeedbackStream<N>, fault: &'a FaultState) -> Self {
        Self {
            stream,
            fault,
            read_idx: stream.write_head(),
            dropped: 0,
        }
    }

    /// Next event, if any. Skips forward on overrun.
    #[inline]
    pub fn tick(&mut self) -> Option<FeedbackEvent> {
        if self.stream.is_overrun(self.read_idx) {
            let write = self.stream.write_head();
            let skipped = write.wrapping_sub(self.read_idx).saturating_sub((N / 2) as u32);

            self.read_idx = write.wrapping_sub((N / 2) as u32);
            self.dropped = self.dropped.saturating_add(skipped);
            self.fault.raise(FaultCode::FeedbackOverrun, skipped);
        }

        match self.stream.read(self.read_idx) {
            Some(event) => {
                self.read_idx = self.read_idx.wrapping_add(1);
                Some(event)
            }
            None => None,
        }
    }

    /// Iterator draining everything currently available.
    #[inline]
    pub fn drain(&mut self) -> Drain<'_, 'a, N> {
        Drain { consumer: self }
    }

    /// Events lost to overruns so far.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Events waiting to be read.
    #[inline]
    pub fn lag(&self) -> u32 {
        self.stream.lag(self.read_idx)
    }

    /// Forget the backlog and continue from the current head.
    #[inline]
    pub fn resync(&mut self) {
        self.read_idx = self.stream.write_head();
    }
}

/// Draining iterator over a [`FeedbackConsumer`].
pub struct Drain<'c, 'a, const N: usize> {
    consumer: &'c mut FeedbackConsumer<'a, N>,
}

impl<'c, 'a, const N: usize> Iterator for Drain<'c, 'a, N> {
    type Item = FeedbackEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.consumer.tick()
    }
}
