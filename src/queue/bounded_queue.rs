use std::collections::VecDeque;
use std::fmt;
use std::sync::{Condvar, Mutex};

use tracing::{debug, trace};

use crate::ext::{CondvarExt, MutexExt};

/// Number of slots used when no capacity is configured
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
    high_water_mark: usize,
}

/// Fixed-capacity FIFO buffer shared between one producer and many consumers.
///
/// `enqueue` blocks while the buffer is full and `dequeue` blocks while it is
/// empty. Once [`BoundedQueue::close`] is called, consumers drain whatever is
/// still buffered and then receive `None`.
pub struct BoundedQueue<T> {
    state: Mutex<QueueState<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Creates a queue holding at most `capacity` items. A zero capacity is
    /// raised to one so the producer can always make progress.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
                high_water_mark: 0,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    /// Appends `item` at the tail, blocking while the queue is full.
    pub fn enqueue(&self, item: T) -> Result<(), QueueClosed<T>> {
        let guard = self.state.lock_or_abort();
        let mut state = self.not_full.wait_while_or_abort(guard, |state| {
            !state.closed && state.items.len() == self.capacity
        });

        if state.closed {
            return Err(QueueClosed(item));
        }

        state.items.push_back(item);
        state.high_water_mark = state.high_water_mark.max(state.items.len());
        trace!("Enqueued item, {} buffered", state.items.len());
        drop(state);

        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes the item at the head, blocking while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and fully drained.
    pub fn dequeue(&self) -> Option<T> {
        let guard = self.state.lock_or_abort();
        let mut state = self
            .not_empty
            .wait_while_or_abort(guard, |state| !state.closed && state.items.is_empty());

        let item = state.items.pop_front();
        drop(state);

        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Marks the end of the stream and releases every blocked thread.
    pub fn close(&self) {
        let mut state = self.state.lock_or_abort();
        if state.closed {
            return;
        }
        state.closed = true;
        debug!("Queue closed with {} items still buffered", state.items.len());
        drop(state);

        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.state.lock_or_abort().closed
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.state.lock_or_abort().items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Largest number of items ever buffered at once
    pub fn high_water_mark(&self) -> usize {
        self.state.lock_or_abort().high_water_mark
    }
}

/// Returned by [`BoundedQueue::enqueue`] when the queue no longer accepts
/// items; carries the rejected item back to the caller.
pub struct QueueClosed<T>(pub T);

impl<T> fmt::Debug for QueueClosed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("QueueClosed(..)")
    }
}

impl<T> fmt::Display for QueueClosed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("the queue is closed")
    }
}

impl<T> std::error::Error for QueueClosed<T> {}
