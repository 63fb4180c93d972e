//! Bounded blocking queue feeding records to workers.
//!
//! A monitor over a ring buffer: `Mutex` guards the buffer and its flags,
//! two `Condvar`s park producers on full and consumers on empty. Slot
//! occupancy is tracked by the ring itself, never by record contents, so a
//! zero-quantity record is just another item.
//!
//! Shutdown is part of the wait condition: once [`close`](BoundedQueue::close)
//! is called, consumers drain what is left and then get `None` instead of
//! parking forever.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

/// Returned by [`BoundedQueue::put`] after the queue stopped accepting items.
///
/// Carries the rejected item back to the caller.
#[derive(Debug, PartialEq)]
pub struct Closed<T>(pub T);

impl<T> std::fmt::Display for Closed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "queue is closed")
    }
}

impl<T: std::fmt::Debug> std::error::Error for Closed<T> {}

struct State<T> {
    items: VecDeque<T>,
    /// No further puts; consumers drain then stop
    closed: bool,
    /// Closed and emptied; consumers stop immediately
    aborted: bool,
}

/// Fixed-capacity FIFO with blocking `put`/`take`.
pub struct BoundedQueue<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Create an empty queue holding at most `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero: every `put` would block forever.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be > 0");
        Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                closed: false,
                aborted: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        // A poisoned lock means a thread panicked mid-update: not recoverable
        self.state.lock().expect("queue mutex poisoned")
    }

    /// Block while the queue is full, then append `item`.
    ///
    /// Fails only once the queue is closed, handing `item` back.
    pub fn put(&self, item: T) -> Result<(), Closed<T>> {
        let mut state = self.lock();
        while state.items.len() == self.capacity && !state.closed {
            state = self.not_full.wait(state).expect("queue mutex poisoned");
        }
        if state.closed {
            return Err(Closed(item));
        }
        state.items.push_back(item);
        debug_assert!(state.items.len() <= self.capacity);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Block while the queue is empty and open, then remove the oldest item.
    ///
    /// Returns `None` once the queue is closed and drained, or aborted.
    pub fn take(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if state.aborted {
                return None;
            }
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.not_full.notify_one();
                return Some(item);
            }
            if state.closed {
                return None;
            }
            state = self.not_empty.wait(state).expect("queue mutex poisoned");
        }
    }

    /// Stop accepting items. Buffered items remain available to `take`.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        drop(state);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Close and discard every buffered item, waking all waiters.
    ///
    /// Returns how many items were dropped.
    pub fn abort(&self) -> usize {
        let mut state = self.lock();
        state.closed = true;
        state.aborted = true;
        let discarded = state.items.len();
        state.items.clear();
        drop(state);
        self.not_empty.notify_all();
        self.not_full.notify_all();
        discarded
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> std::fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    use crate::Record;

    #[test]
    fn put_take_fifo() {
        let q = BoundedQueue::new(3);
        q.put(1).unwrap();
        q.put(2).unwrap();
        q.put(3).unwrap();
        assert_eq!(q.len(), 3);
        assert_eq!(q.take(), Some(1));
        assert_eq!(q.take(), Some(2));
        assert_eq!(q.take(), Some(3));
        assert!(q.is_empty());
    }

    #[test]
    fn zero_quantity_record_is_stored() {
        let q = BoundedQueue::new(2);
        q.put(Record::new("Empty Co", 0, 0.0)).unwrap();
        assert_eq!(q.len(), 1);
        let r = q.take().unwrap();
        assert_eq!(r.name, "Empty Co");
        assert_eq!(r.quantity, 0);
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = BoundedQueue::<u8>::new(0);
    }

    #[test]
    fn take_blocks_until_put() {
        let q = Arc::new(BoundedQueue::new(1));
        let q2 = q.clone();
        let handle = thread::spawn(move || q2.take());

        // Give thread time to block
        thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished());
        q.put(42).unwrap();

        assert_eq!(handle.join().unwrap(), Some(42));
    }

    #[test]
    fn put_blocks_while_full() {
        let q = Arc::new(BoundedQueue::new(1));
        q.put(1).unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let (q2, done2) = (q.clone(), done.clone());
        let handle = thread::spawn(move || {
            q2.put(2).unwrap();
            done2.store(true, Ordering::SeqCst);
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!done.load(Ordering::SeqCst));
        assert_eq!(q.take(), Some(1));

        handle.join().unwrap();
        assert!(done.load(Ordering::SeqCst));
        assert_eq!(q.take(), Some(2));
    }

    #[test]
    fn close_drains_then_none() {
        let q = BoundedQueue::new(4);
        q.put("a").unwrap();
        q.put("b").unwrap();
        q.close();
        assert!(q.is_closed());
        assert_eq!(q.put("c"), Err(Closed("c")));
        assert_eq!(q.take(), Some("a"));
        assert_eq!(q.take(), Some("b"));
        assert_eq!(q.take(), None);
        assert_eq!(q.take(), None);
    }

    #[test]
    fn close_wakes_blocked_consumers() {
        let q = Arc::new(BoundedQueue::<u32>::new(2));
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let q = q.clone();
                thread::spawn(move || q.take())
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        q.close();
        for h in handles {
            assert_eq!(h.join().unwrap(), None);
        }
    }

    #[test]
    fn abort_discards_and_wakes_producer() {
        let q = Arc::new(BoundedQueue::new(1));
        q.put(1).unwrap();
        let q2 = q.clone();
        let producer = thread::spawn(move || q2.put(2));

        thread::sleep(Duration::from_millis(50));
        assert_eq!(q.abort(), 1);
        assert_eq!(producer.join().unwrap(), Err(Closed(2)));
        assert_eq!(q.take(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn concurrent_producers_consumers_no_loss_no_dup() {
        const PRODUCERS: usize = 4;
        const CONSUMERS: usize = 4;
        const PER_PRODUCER: usize = 500;
        const CAPACITY: usize = 10;

        let q = BoundedQueue::new(CAPACITY);
        let over_capacity = AtomicBool::new(false);
        let producers_done = AtomicBool::new(false);

        let mut taken: Vec<usize> = thread::scope(|s| {
            let consumers: Vec<_> = (0..CONSUMERS)
                .map(|_| {
                    s.spawn(|| {
                        let mut got = Vec::new();
                        while let Some(v) = q.take() {
                            got.push(v);
                        }
                        got
                    })
                })
                .collect();

            s.spawn(|| {
                while !producers_done.load(Ordering::SeqCst) {
                    if q.len() > CAPACITY {
                        over_capacity.store(true, Ordering::SeqCst);
                    }
                    thread::yield_now();
                }
            });

            let producers: Vec<_> = (0..PRODUCERS)
                .map(|p| {
                    let q = &q;
                    s.spawn(move || {
                        for i in 0..PER_PRODUCER {
                            q.put(p * PER_PRODUCER + i).unwrap();
                        }
                    })
                })
                .collect();
            for h in producers {
                h.join().unwrap();
            }
            producers_done.store(true, Ordering::SeqCst);
            q.close();

            consumers
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        assert!(!over_capacity.load(Ordering::SeqCst));
        taken.sort_unstable();
        let expected: Vec<usize> = (0..PRODUCERS * PER_PRODUCER).collect();
        assert_eq!(taken, expected);
    }
}
