//! Bounded playback history
//!
//! Fixed-capacity ring buffer: slots are allocated once, `head` points at the
//! oldest entry and `len` counts occupied slots. Pushing into a full log
//! overwrites the oldest entry in O(1). Only the most recent entry can be
//! removed (`pop_back`), which is what rewind needs.

use cadence_common::config::DEFAULT_HISTORY_CAPACITY;
use cadence_common::PlaybackEvent;

/// Scheduler event log
pub type PlaybackHistory = RingLog<PlaybackEvent>;

/// Fixed-capacity append log with oldest-first eviction
#[derive(Debug, Clone)]
pub struct RingLog<T> {
    slots: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T> RingLog<T> {
    /// Create a log holding at most `capacity` entries (at least 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    fn slot(&self, offset: usize) -> usize {
        (self.head + offset) % self.capacity()
    }

    /// Append `item`, returning the evicted oldest entry if the log was full
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.is_full() {
            let evicted = self.slots[self.head].replace(item);
            self.head = self.slot(1);
            evicted
        } else {
            let tail = self.slot(self.len);
            self.slots[tail] = Some(item);
            self.len += 1;
            None
        }
    }

    /// Remove and return the most recent entry
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let tail = self.slot(self.len - 1);
        self.len -= 1;
        self.slots[tail].take()
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.slots[self.slot(self.len - 1)].as_ref()
    }

    /// Entry at `index`, counting from the oldest
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.slots[self.slot(index)].as_ref()
    }

    /// Entries from oldest to most recent
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            log: self,
            front: 0,
            back: self.len,
        }
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

impl<T> Default for RingLog<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl<'a, T> IntoIterator for &'a RingLog<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Borrowing iterator over a [`RingLog`], oldest first
#[derive(Debug)]
pub struct Iter<'a, T> {
    log: &'a RingLog<T>,
    front: usize,
    back: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front >= self.back {
            return None;
        }
        let item = self.log.get(self.front);
        self.front += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.log.get(self.back)
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
