//! Fixed-latency in-flight queue.
//!
//! The adder and FMA accept one new operation per cycle and retire each one
//! exactly `latency` cycles later, in issue order. The queue is a ring buffer
//! of entries tagged with the cycle on which they become visible:
//! 1. **Issue:** [`LatencyPipe::push`] records a payload and its ready cycle.
//! 2. **Retire:** [`LatencyPipe::pop_ready`] releases the oldest entry once its cycle is reached.
//!
//! Entries never overtake each other, so ordering is FIFO by construction.

/// One in-flight operation.
#[derive(Clone, Debug)]
struct InFlight<T> {
    /// Cycle on which the payload becomes visible.
    ready_at: u64,
    /// Retirement payload computed at issue.
    payload: T,
}

/// Ring buffer of operations in flight through a fixed-latency unit.
#[derive(Debug)]
pub struct LatencyPipe<T> {
    entries: Vec<Option<InFlight<T>>>,
    /// Index of the oldest entry.
    head: usize,
    /// Index where the next entry will be written.
    tail: usize,
    /// Number of occupied slots.
    count: usize,
    /// Cycles between issue and retirement.
    latency: u64,
}

impl<T> LatencyPipe<T> {
    /// Creates a queue for a unit with the given latency.
    ///
    /// With one issue per cycle at most `latency` operations are in flight,
    /// so that is the capacity.
    pub fn new(latency: u64) -> Self {
        let capacity = latency.max(1) as usize;
        let mut entries = Vec::with_capacity(capacity);
        entries.resize_with(capacity, || None);
        Self {
            entries,
            head: 0,
            tail: 0,
            count: 0,
            latency,
        }
    }

    /// Cycles between issue and retirement.
    #[inline]
    pub const fn latency(&self) -> u64 {
        self.latency
    }

    /// Number of operations in flight.
    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns true if nothing is in flight.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if no further operation can be accepted.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.entries.len()
    }

    /// Records an operation issued on cycle `now`.
    ///
    /// Returns the payload back if the queue is full.
    pub fn push(&mut self, now: u64, payload: T) -> Result<(), T> {
        if self.is_full() {
            return Err(payload);
        }
        self.entries[self.tail] = Some(InFlight {
            ready_at: now + self.latency,
            payload,
        });
        self.tail = (self.tail + 1) % self.entries.len();
        self.count += 1;
        Ok(())
    }

    /// Releases the oldest operation if it is due on or before cycle `now`.
    pub fn pop_ready(&mut self, now: u64) -> Option<T> {
        let due = self.entries[self.head]
            .as_ref()
            .is_some_and(|e| e.ready_at <= now);
        if !due {
            return None;
        }
        let entry = self.entries[self.head].take()?;
        self.head = (self.head + 1) % self.entries.len();
        self.count -= 1;
        Some(entry.payload)
    }
}
