//! # Bounded Channel
//!
//! A fixed-capacity FIFO shared between threads, with blocking `put` and
//! `get`. The solver pool uses two of them: one carrying equations to the
//! workers and one carrying solutions back to the coordinator.
//!
//! ## Key Concepts
//! - Backpressure: `put` blocks while the channel is full
//! - Guarded wait: every waiter re-checks its condition after each wakeup
//! - Cancellation: `close` wakes every waiter; stored items stay readable
//!
//! ## Implementation Details
//! The circular storage is a `ringbuf::HeapRb` owned by a `parking_lot::Mutex`.
//! The ring tracks the read/write cursors and occupancy; the mutex makes each
//! insert or removal atomic with respect to the `not_full`/`not_empty`
//! condition variables, which are only signalled while the lock is held.

use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use ringbuf::traits::{Consumer, Observer, Producer};
use ringbuf::HeapRb;

use crate::pool::error::{ChannelError, PutError};

struct ChannelState<T> {
    ring: HeapRb<T>,
    closed: bool,
    peak: usize,
}

impl<T> ChannelState<T> {
    fn insert(&mut self, item: T) -> Result<(), T> {
        self.ring.try_push(item)?;
        self.peak = self.peak.max(self.ring.occupied_len());
        Ok(())
    }
}

/// Fixed-capacity blocking FIFO queue.
///
/// # Thread Safety
/// All methods take `&self`; share the channel behind an `Arc`.
///
/// # Ordering
/// Items are returned in insertion order. With several concurrent readers
/// each item is still handed to exactly one of them.
pub struct BoundedChannel<T> {
    state: Mutex<ChannelState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> fmt::Debug for BoundedChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BoundedChannel")
            .field("capacity", &self.capacity)
            .field("occupied", &state.ring.occupied_len())
            .field("closed", &state.closed)
            .finish()
    }
}

impl<T> BoundedChannel<T> {
    /// Creates an empty channel holding at most `capacity` items.
    pub fn new(capacity: usize) -> Result<Self, ChannelError> {
        if capacity == 0 {
            return Err(ChannelError::ZeroCapacity);
        }
        Ok(Self {
            state: Mutex::new(ChannelState {
                ring: HeapRb::new(capacity),
                closed: false,
                peak: 0,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        })
    }

    /// Inserts `item`, blocking while the channel is full.
    ///
    /// Fails only if the channel is closed, returning the item to the caller.
    pub fn put(&self, item: T) -> Result<(), PutError<T>> {
        let mut item = item;
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(PutError::Closed(item));
            }
            match state.insert(item) {
                Ok(()) => {
                    self.not_empty.notify_one();
                    return Ok(());
                }
                Err(rejected) => item = rejected,
            }
            self.not_full.wait(&mut state);
        }
    }

    /// Like [`put`](Self::put) but gives up after `timeout`.
    pub fn put_timeout(&self, item: T, timeout: Duration) -> Result<(), PutError<T>> {
        let deadline = Instant::now() + timeout;
        let mut item = item;
        let mut expired = false;
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(PutError::Closed(item));
            }
            match state.insert(item) {
                Ok(()) => {
                    self.not_empty.notify_one();
                    return Ok(());
                }
                Err(rejected) => item = rejected,
            }
            if expired {
                return Err(PutError::Timeout(item, timeout));
            }
            expired = self.not_full.wait_until(&mut state, deadline).timed_out();
        }
    }

    /// Inserts `item` only if there is room right now.
    pub fn try_put(&self, item: T) -> Result<(), PutError<T>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PutError::Closed(item));
        }
        state.insert(item).map_err(PutError::Full)?;
        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes the oldest item, blocking while the channel is empty.
    ///
    /// A closed channel still hands out the items it holds; `Closed` is
    /// returned only once it is both closed and empty.
    pub fn get(&self) -> Result<T, ChannelError> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.ring.try_pop() {
                self.not_full.notify_one();
                return Ok(item);
            }
            if state.closed {
                return Err(ChannelError::Closed);
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Like [`get`](Self::get) but gives up after `timeout`.
    pub fn get_timeout(&self, timeout: Duration) -> Result<T, ChannelError> {
        let deadline = Instant::now() + timeout;
        let mut expired = false;
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.ring.try_pop() {
                self.not_full.notify_one();
                return Ok(item);
            }
            if state.closed {
                return Err(ChannelError::Closed);
            }
            if expired {
                return Err(ChannelError::Timeout(timeout));
            }
            expired = self.not_empty.wait_until(&mut state, deadline).timed_out();
        }
    }

    /// Removes the oldest item only if one is present right now.
    pub fn try_get(&self) -> Result<T, ChannelError> {
        let mut state = self.state.lock();
        match state.ring.try_pop() {
            Some(item) => {
                self.not_full.notify_one();
                Ok(item)
            }
            None if state.closed => Err(ChannelError::Closed),
            None => Err(ChannelError::Empty),
        }
    }

    /// Closes the channel and wakes every blocked reader and writer.
    ///
    /// Returns `false` if it was already closed.
    pub fn close(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
        true
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of occupied slots (snapshot in time).
    pub fn len(&self) -> usize {
        self.state.lock().ring.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().ring.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.state.lock().ring.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Highest occupancy observed since creation. Never exceeds `capacity`.
    pub fn peak_occupancy(&self) -> usize {
        self.state.lock().peak
    }
}
