//! Fixed-size worker pool scoring records into a sorted collection
//!
//! The caller's thread feeds a [`BoundedQueue`]; `workers` scoped threads
//! drain it, score each record and insert the passing ones into
//! [`SortedResults`]. Termination is driven by the queue: after feeding, the
//! queue is closed and every worker leaves its loop once `take` returns
//! `None`. A [`CountDownLatch`] tracks worker exits; the processed counter is
//! only a metric.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};

use crate::error::{PoolError, ScoreError};
use crate::latch::{CountDownGuard, CountDownLatch};
use crate::progress::fmt_num;
use crate::queue::{BoundedQueue, Closed};
use crate::record::Record;
use crate::results::SortedResults;
use crate::score::{PrimeScorer, ScoreParams, Scorer};

/// Pool tunables, fixed for the lifetime of a [`WorkerPool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub result_capacity: usize,
    /// How often a cancellation flag is checked while workers run
    pub cancel_poll_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 10,
            result_capacity: 150,
            cancel_poll_ms: 50,
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.workers == 0 {
            return Err(PoolError::InvalidConfig("workers"));
        }
        if self.queue_capacity == 0 {
            return Err(PoolError::InvalidConfig("queue_capacity"));
        }
        if self.result_capacity == 0 {
            return Err(PoolError::InvalidConfig("result_capacity"));
        }
        if self.cancel_poll_ms == 0 {
            return Err(PoolError::InvalidConfig("cancel_poll_ms"));
        }
        Ok(())
    }
}

/// Why a record did not make it into the results
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    Score(ScoreError),
    ResultsFull { capacity: usize },
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Score(e) => write!(f, "scoring failed: {e}"),
            Self::ResultsFull { capacity } => write!(f, "result collection full ({capacity})"),
        }
    }
}

/// A record that failed, returned to the caller with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    pub record: Record,
    pub reason: FailureReason,
}

/// Outcome of one batch run
#[derive(Debug)]
pub struct RunSummary {
    /// Passing records, ascending by score
    pub results: SortedResults,
    pub submitted: usize,
    /// Records taken off the queue and scored (pass, fail or error)
    pub processed: usize,
    pub passed: usize,
    pub failures: Vec<RecordFailure>,
    pub cancelled: bool,
    /// Records still queued when the run was cancelled
    pub discarded: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn log(&self) {
        log::info!("=== Batch Summary ===");
        log::info!(
            "Records: {} submitted, {} processed, {} passed",
            fmt_num(self.submitted),
            fmt_num(self.processed),
            fmt_num(self.passed)
        );
        if !self.failures.is_empty() {
            log::warn!("Failures: {}", self.failures.len());
        }
        if self.cancelled {
            log::warn!("Cancelled, {} queued records discarded", self.discarded);
        }
        log::info!("Time: {:.3}s", self.elapsed.as_secs_f64());
        if self.processed > 0 && !self.elapsed.is_zero() {
            let rate = self.processed as f64 / self.elapsed.as_secs_f64();
            log::info!("Throughput: {:.0} records/sec", rate);
        }
    }
}

/// Handle for pushing records into a running batch.
pub struct Feeder<'a> {
    queue: &'a BoundedQueue<Record>,
    submitted: &'a AtomicUsize,
}

impl Feeder<'_> {
    /// Block until the queue has room, then enqueue `record`.
    ///
    /// Fails once the run has been cancelled; the record is handed back.
    pub fn submit(&self, record: Record) -> Result<(), Closed<Record>> {
        self.queue.put(record)?;
        self.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Per-run shared state borrowed by every worker
struct Batch {
    queue: BoundedQueue<Record>,
    results: SortedResults,
    submitted: AtomicUsize,
    processed: AtomicUsize,
    passed: AtomicUsize,
    failures: Mutex<Vec<RecordFailure>>,
    done: CountDownLatch,
}

impl Batch {
    fn fail(&self, record: Record, reason: FailureReason) {
        self.failures
            .lock()
            .expect("failures mutex poisoned")
            .push(RecordFailure { record, reason });
    }
}

/// Counts a worker out on exit; a panicking worker also aborts the queue so
/// the feeder can't block on a queue nobody drains.
///
/// The abort runs in `drop` before `_done` is dropped, so the queue is already
/// aborted when the latch opens.
struct WorkerExit<'a> {
    queue: &'a BoundedQueue<Record>,
    _done: CountDownGuard<'a>,
}

impl<'a> WorkerExit<'a> {
    fn new(batch: &'a Batch) -> Self {
        Self {
            queue: &batch.queue,
            _done: batch.done.guard(),
        }
    }
}

impl Drop for WorkerExit<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.queue.abort();
        }
    }
}

/// Closes the queue even if the feed closure panics.
struct CloseOnDrop<'a>(&'a BoundedQueue<Record>);

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Fixed pool of scoring workers.
pub struct WorkerPool<S = PrimeScorer> {
    config: PoolConfig,
    scorer: S,
    progress: ProgressBar,
}

impl WorkerPool<PrimeScorer> {
    /// Pool using the default prime-count scorer.
    pub fn new(config: PoolConfig, params: ScoreParams) -> Result<Self, PoolError> {
        Self::with_scorer(config, PrimeScorer::new(params))
    }
}

impl<S: Scorer> WorkerPool<S> {
    /// Fails if either `config` or `scorer` is invalid.
    pub fn with_scorer(config: PoolConfig, scorer: S) -> Result<Self, PoolError> {
        config.validate()?;
        scorer.validate()?;
        Ok(Self {
            config,
            scorer,
            progress: ProgressBar::hidden(),
        })
    }

    /// Advance `pb` once per processed record
    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.progress = pb;
        self
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Score every record and return the passing ones in score order.
    pub fn run_all(&self, records: Vec<Record>) -> Result<RunSummary, PoolError> {
        self.run_all_with_cancel(records, &AtomicBool::new(false))
    }

    /// Like [`run_all`](Self::run_all), stopping early once `cancel` is set.
    pub fn run_all_with_cancel(
        &self,
        records: Vec<Record>,
        cancel: &AtomicBool,
    ) -> Result<RunSummary, PoolError> {
        log::info!(
            "Scoring {} records with {} workers",
            fmt_num(records.len()),
            self.config.workers
        );
        self.progress.set_length(records.len() as u64);
        self.run_with(cancel, |feeder| {
            for record in records {
                if feeder.submit(record).is_err() {
                    break;
                }
            }
        })
    }

    /// Start the workers, let `feed` submit records, then wait for all
    /// workers to drain the queue and exit.
    ///
    /// `feed` runs on the calling thread while workers consume. When it
    /// returns the queue is closed; the run ends once every worker has
    /// exited. If `cancel` is set meanwhile, queued records are discarded
    /// and further submits fail.
    pub fn run_with<F>(&self, cancel: &AtomicBool, feed: F) -> Result<RunSummary, PoolError>
    where
        F: FnOnce(&Feeder<'_>),
    {
        let start = Instant::now();
        let workers = self.config.workers;
        let batch = Batch {
            queue: BoundedQueue::new(self.config.queue_capacity),
            results: SortedResults::new(self.config.result_capacity),
            submitted: AtomicUsize::new(0),
            processed: AtomicUsize::new(0),
            passed: AtomicUsize::new(0),
            failures: Mutex::new(Vec::new()),
            done: CountDownLatch::new(workers),
        };
        let poll = Duration::from_millis(self.config.cancel_poll_ms);

        let discarded = thread::scope(|s| -> Result<Option<usize>, PoolError> {
            let _close = CloseOnDrop(&batch.queue);

            let mut handles = Vec::with_capacity(workers);
            for id in 0..workers {
                let batch = &batch;
                let spawned = thread::Builder::new()
                    .name(format!("score-worker-{id}"))
                    .spawn_scoped(s, move || {
                        let _exit = WorkerExit::new(batch);
                        self.work(batch);
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        batch.queue.abort();
                        for _ in id..workers {
                            batch.done.count_down();
                        }
                        return Err(PoolError::Spawn(e));
                    }
                }
            }
            log::debug!("{workers} workers started");

            let watcher = s.spawn(|| watch_cancel(cancel, &batch, poll));

            feed(&Feeder {
                queue: &batch.queue,
                submitted: &batch.submitted,
            });
            batch.queue.close();

            let mut panicked = None;
            for handle in handles {
                let name = handle.thread().name().unwrap_or("worker").to_string();
                if handle.join().is_err() {
                    panicked.get_or_insert(name);
                }
            }
            let discarded = watcher
                .join()
                .map_err(|_| PoolError::WorkerPanicked("cancel watcher".to_string()))?;
            match panicked {
                Some(name) => Err(PoolError::WorkerPanicked(name)),
                None => Ok(discarded),
            }
        })?;

        let Batch {
            results,
            submitted,
            processed,
            passed,
            failures,
            ..
        } = batch;
        let submitted = submitted.into_inner();
        let processed = processed.into_inner();
        debug_assert!(processed <= submitted);

        Ok(RunSummary {
            results,
            submitted,
            processed,
            passed: passed.into_inner(),
            failures: failures.into_inner().expect("failures mutex poisoned"),
            cancelled: discarded.is_some(),
            discarded: discarded.unwrap_or(0),
            elapsed: start.elapsed(),
        })
    }

    /// Worker loop: take, score, insert on pass, count.
    fn work(&self, batch: &Batch) {
        while let Some(mut record) = batch.queue.take() {
            match self.scorer.score(&record) {
                Ok(score) => {
                    log::debug!(
                        "{} -> {} ({})",
                        record.name,
                        score.value,
                        if score.passes { "pass" } else { "fail" }
                    );
                    record.score = Some(score.value);
                    if score.passes {
                        match batch.results.insert_sorted(record) {
                            Ok(_) => {
                                batch.passed.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(e) => {
                                log::warn!("{e}");
                                let reason = FailureReason::ResultsFull {
                                    capacity: batch.results.capacity(),
                                };
                                batch.fail(e.into_record(), reason);
                            }
                        }
                    }
                }
                Err(e) => {
                    log::warn!("{}: {e}", record.name);
                    batch.fail(record, FailureReason::Score(e));
                }
            }
            batch.processed.fetch_add(1, Ordering::Relaxed);
            self.progress.inc(1);
        }
    }
}

/// Wait for the workers to finish, aborting the queue if `cancel` gets set.
///
/// Returns the number of discarded records when the run was cancelled.
fn watch_cancel(cancel: &AtomicBool, batch: &Batch, poll: Duration) -> Option<usize> {
    loop {
        if cancel.load(Ordering::Relaxed) {
            let discarded = batch.queue.abort();
            log::warn!("Cancellation requested, discarding {discarded} queued records");
            return Some(discarded);
        }
        if batch.done.wait_timeout(poll) {
            return None;
        }
    }
}

impl<S> std::fmt::Debug for WorkerPool<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
