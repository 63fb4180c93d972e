//! Sieve Core - concurrent batch scoring
//!
//! A fixed pool of worker threads drains a bounded blocking queue of
//! records, scores each one with a CPU-bound function, and collects the
//! passing records into a collection kept sorted by score.

pub mod error;
pub mod latch;
pub mod logging;
pub mod pool;
pub mod progress;
pub mod queue;
pub mod record;
pub mod results;
pub mod score;

// Re-exports for convenience
pub use error::{PoolError, ResultsError, ScoreError};
pub use latch::CountDownLatch;
pub use logging::{IndicatifLogger, init_logging};
pub use pool::{FailureReason, Feeder, PoolConfig, RecordFailure, RunSummary, WorkerPool};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use queue::{BoundedQueue, Closed};
pub use record::Record;
pub use results::SortedResults;
pub use score::{PrimeScorer, Score, ScoreParams, Scorer};
