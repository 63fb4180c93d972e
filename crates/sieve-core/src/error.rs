//! Error types for scoring, result collection and pool setup

/// Failure to score a single record.
///
/// Per-record: the worker logs it, records it against the record and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    /// `(name sum + price) * quantity` does not fit in an `i64`
    Overflow,
    /// Custom scorers may reject a record for their own reasons
    Rejected(String),
}

impl std::fmt::Display for ScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overflow => write!(f, "derived value overflows i64"),
            Self::Rejected(msg) => write!(f, "rejected: {msg}"),
        }
    }
}

impl std::error::Error for ScoreError {}

/// Insertion into [`SortedResults`](crate::SortedResults) was refused.
///
/// The offending record is handed back so the caller keeps ownership.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsError {
    Full {
        capacity: usize,
        record: crate::Record,
    },
    Unscored(crate::Record),
}

impl ResultsError {
    /// Recover the record that could not be inserted
    pub fn into_record(self) -> crate::Record {
        match self {
            Self::Full { record, .. } | Self::Unscored(record) => record,
        }
    }
}

impl std::fmt::Display for ResultsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full { capacity, record } => {
                write!(f, "result collection full ({capacity}), dropped {}", record.name)
            }
            Self::Unscored(record) => write!(f, "{} has no score", record.name),
        }
    }
}

impl std::error::Error for ResultsError {}

/// Structural failure that aborts a whole run.
#[derive(Debug)]
pub enum PoolError {
    /// A tunable that must be positive was zero
    InvalidConfig(&'static str),
    /// The OS refused to start a worker thread
    Spawn(std::io::Error),
    /// A worker thread panicked; carries the thread name
    WorkerPanicked(String),
}

impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(field) => write!(f, "invalid pool config: {field} must be > 0"),
            Self::Spawn(e) => write!(f, "failed to spawn worker: {e}"),
            Self::WorkerPanicked(name) => write!(f, "{name} panicked"),
        }
    }
}

impl std::error::Error for PoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(e) => Some(e),
            _ => None,
        }
    }
}
