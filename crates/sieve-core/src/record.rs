//! Input record flowing through the pool

use serde::{Deserialize, Serialize};

/// A single input row: company name, quantity and unit price.
///
/// `score` stays `None` until a worker has scored the record. It is never
/// read from input, so a file cannot smuggle in a precomputed score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "company", alias = "name")]
    pub name: String,
    #[serde(rename = "count", alias = "quantity")]
    pub quantity: i64,
    pub price: f64,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub score: Option<u64>,
}

impl Record {
    pub fn new(name: impl Into<String>, quantity: i64, price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
            score: None,
        }
    }

    /// Same record with `score` filled in
    pub fn with_score(mut self, score: u64) -> Self {
        self.score = Some(score);
        self
    }
}
