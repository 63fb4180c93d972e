//! Mutex-protected result collection kept sorted by score

use std::sync::{Mutex, MutexGuard};

use crate::error::ResultsError;
use crate::record::Record;

/// Scored records in non-decreasing score order, up to a fixed capacity.
///
/// Workers only insert; nobody waits for entries, so a plain `Mutex` is
/// enough. Equal scores keep insertion order.
#[derive(Debug)]
pub struct SortedResults {
    entries: Mutex<Vec<Record>>,
    capacity: usize,
}

impl SortedResults {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Record>> {
        self.entries.lock().expect("results mutex poisoned")
    }

    /// Insert a scored record at its sorted position, returning that position.
    ///
    /// Walks down from the high end past every entry with a strictly larger
    /// score. Refuses records without a score and records arriving once the
    /// collection is full; in both cases the record comes back in the error
    /// and the stored entries are untouched.
    pub fn insert_sorted(&self, record: Record) -> Result<usize, ResultsError> {
        let Some(score) = record.score else {
            return Err(ResultsError::Unscored(record));
        };

        let mut entries = self.lock();
        if entries.len() >= self.capacity {
            return Err(ResultsError::Full {
                capacity: self.capacity,
                record,
            });
        }

        let mut pos = entries.len();
        while pos > 0 && entries[pos - 1].score.is_some_and(|s| s > score) {
            pos -= 1;
        }
        entries.insert(pos, record);
        Ok(pos)
    }

    /// Snapshot of the current entries
    pub fn records(&self) -> Vec<Record> {
        self.lock().clone()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.entries
            .into_inner()
            .expect("results mutex poisoned")
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
