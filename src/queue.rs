//! A sorted array priority queue.
//!
//! Entries are kept in a dense `Vec` ordered so that the head (highest priority,
//! earliest inserted among equals) is the last element. That makes `head` and
//! `remove` O(1) and leaves insertion as the only O(n) operation, which is fine
//! for the handful of alarms a clock holds.

use std::fmt;

use log::debug;
use thiserror::Error;

/// capacity used by [`PriorityQueue::new`]
pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("the priority queue is empty")]
pub struct EmptyQueueError;

#[derive(Debug, Clone)]
struct Entry<T> {
    item: T,
    priority: i64,
    /// insertion order, breaks priority ties (lower goes first)
    seq: u64,
}

#[derive(Debug, Clone)]
pub struct PriorityQueue<T> {
    // ascending by (priority, newest first), so the head is at the end
    entries: Vec<Entry<T>>,
    next_seq: u64,
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PriorityQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// `capacity` is only a hint, the queue grows as needed
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            next_seq: 0,
        }
    }

    pub fn add(&mut self, item: T, priority: i64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        // every stored entry has a lower seq, so equal priorities sort after the new one
        let index = self.entries.partition_point(|entry| entry.priority < priority);
        debug!("queue insert at {index} with priority {priority} (seq {seq})");
        self.entries.insert(
            index,
            Entry {
                item,
                priority,
                seq,
            },
        );
    }

    /// # Errors
    /// if the queue has no entries
    pub fn head(&self) -> Result<&T, EmptyQueueError> {
        self.entries
            .last()
            .map(|entry| &entry.item)
            .ok_or(EmptyQueueError)
    }

    /// removes the head and hands it back
    ///
    /// # Errors
    /// if the queue has no entries
    pub fn remove(&mut self) -> Result<T, EmptyQueueError> {
        let entry = self.entries.pop().ok_or(EmptyQueueError)?;
        debug!(
            "queue removed head with priority {} (seq {})",
            entry.priority, entry.seq
        );
        Ok(entry.item)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// walks the entries in the order they would be removed, without touching them
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&T, i64)> + ExactSizeIterator {
        self.entries
            .iter()
            .rev()
            .map(|entry| (&entry.item, entry.priority))
    }
}

impl<T: fmt::Display> fmt::Display for PriorityQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (item, priority) in self.iter() {
            writeln!(f, "{item} (priority {priority})")?;
        }
        Ok(())
    }
}
