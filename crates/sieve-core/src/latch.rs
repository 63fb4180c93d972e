//! Count-down latch for worker termination.
//!
//! Uses `Mutex + Condvar` from std, like the queue.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Opens once `count_down` has been called `count` times.
pub struct CountDownLatch {
    remaining: Mutex<usize>,
    cond: Condvar,
}

/// RAII guard that counts the latch down once on drop, including during unwinding.
pub struct CountDownGuard<'a>(&'a CountDownLatch);

impl CountDownLatch {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            cond: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.remaining.lock().expect("latch mutex poisoned")
    }

    /// Decrement the count, waking all waiters when it reaches zero.
    /// Extra calls past zero are ignored.
    pub fn count_down(&self) {
        let mut remaining = self.lock();
        if *remaining == 0 {
            return;
        }
        *remaining -= 1;
        if *remaining == 0 {
            self.cond.notify_all();
        }
    }

    pub fn guard(&self) -> CountDownGuard<'_> {
        CountDownGuard(self)
    }

    pub fn count(&self) -> usize {
        *self.lock()
    }

    /// Block until the count reaches zero.
    pub fn wait(&self) {
        let mut remaining = self.lock();
        while *remaining > 0 {
            remaining = self.cond.wait(remaining).expect("latch mutex poisoned");
        }
    }

    /// Block until the count reaches zero or `timeout` elapses.
    ///
    /// Returns `true` if the latch is open.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut remaining = self.lock();
        while *remaining > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            remaining = self
                .cond
                .wait_timeout(remaining, deadline - now)
                .expect("latch mutex poisoned")
                .0;
        }
        true
    }
}

impl Drop for CountDownGuard<'_> {
    fn drop(&mut self) {
        self.0.count_down();
    }
}
