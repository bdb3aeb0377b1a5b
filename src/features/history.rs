//! Fixed-capacity rolling history
//!
//! Every piece of state the analyzer carries across frames lives in one of
//! these, so per-frame cost and memory stay constant however long a session
//! runs.

use std::collections::VecDeque;

/// FIFO that evicts its oldest entry once `capacity` is reached
#[derive(Debug, Clone)]
pub struct History<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    /// Create an empty history holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest one when full
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing has been pushed since creation or the last clear
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed entry
    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Entry `n` steps before the latest (`back(0)` is the latest)
    pub fn back(&self, n: usize) -> Option<&T> {
        let len = self.items.len();
        if n >= len {
            return None;
        }
        self.items.get(len - 1 - n)
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    /// Iterate over the newest `n` entries, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &T> {
        let skip = self.items.len().saturating_sub(n);
        self.items.iter().skip(skip)
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl History<f32> {
    /// Mean of all entries, 0.0 when empty
    pub fn mean(&self) -> f32 {
        if self.items.is_empty() {
            return 0.0;
        }
        self.items.iter().sum::<f32>() / self.items.len() as f32
    }
}
