//! CPU-bound scoring of a single record
//!
//! The score is a count of "primes" below a value derived from the record.
//! Trial division stops at `n / 3` rather than `sqrt(n)`, which makes 9 count
//! as prime. Existing acceptance decisions depend on that boundary, so it is
//! kept as is.

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, ScoreError};
use crate::record::Record;

/// Tunables of the scoring function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreParams {
    /// Divides `(name sum + price) * quantity` before counting
    pub divider: i64,
    /// A record passes when its score is not a multiple of this
    pub modifier: u64,
}

impl ScoreParams {
    /// Both tunables are divisors and must be non-zero.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.divider == 0 {
            return Err(PoolError::InvalidConfig("divider"));
        }
        if self.modifier == 0 {
            return Err(PoolError::InvalidConfig("modifier"));
        }
        Ok(())
    }
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            divider: 5,
            modifier: 2,
        }
    }
}

/// Outcome of scoring one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub value: u64,
    pub passes: bool,
}

/// Pure, thread-safe scoring function shared by all workers.
pub trait Scorer: Send + Sync {
    fn score(&self, record: &Record) -> Result<Score, ScoreError>;

    /// Checked by the pool before any worker starts.
    fn validate(&self) -> Result<(), PoolError> {
        Ok(())
    }
}

/// Default scorer: approximate prime count below the derived value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimeScorer {
    params: ScoreParams,
}

impl PrimeScorer {
    pub const fn new(params: ScoreParams) -> Self {
        Self { params }
    }

    pub const fn params(&self) -> ScoreParams {
        self.params
    }
}

impl Scorer for PrimeScorer {
    fn score(&self, record: &Record) -> Result<Score, ScoreError> {
        let value = prime_count(derived_value(record, self.params.divider)?);
        Ok(Score {
            value,
            passes: value
                .checked_rem(self.params.modifier)
                .is_some_and(|rem| rem != 0),
        })
    }

    fn validate(&self) -> Result<(), PoolError> {
        self.params.validate()
    }
}

/// `(sum of name code points + trunc(price)) * quantity / divider`, truncating.
///
/// The price goes through single precision before truncation, so 9.99999999
/// counts as 10, the same as existing score tables. `divider` must be non-zero;
/// [`ScoreParams::validate`] rejects zero and [`WorkerPool`](crate::WorkerPool)
/// refuses to start with an invalid scorer.
pub fn derived_value(record: &Record, divider: i64) -> Result<i64, ScoreError> {
    let name_sum: i64 = record.name.chars().map(|c| i64::from(u32::from(c))).sum();
    // float -> int `as` truncates toward zero and saturates
    let price = record.price as f32 as i64;
    let base = name_sum
        .checked_add(price)
        .ok_or(ScoreError::Overflow)?;
    let scaled = base
        .checked_mul(record.quantity)
        .ok_or(ScoreError::Overflow)?;
    scaled.checked_div(divider).ok_or(ScoreError::Overflow)
}

/// Count `n` in `3..number` that survive odd trial division below `n / 3`.
pub fn prime_count(number: i64) -> u64 {
    let mut count = 0;
    for n in 3..number {
        if n % 2 == 0 {
            continue;
        }
        let limit = n / 3;
        let composite = (3..limit).step_by(2).any(|i| n % i == 0);
        if !composite {
            count += 1;
        }
    }
    count
}
