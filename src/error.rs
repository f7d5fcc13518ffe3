// src/error.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error type shared by every layer of the generation engine

use thiserror::Error;

/// Errors raised by the generation engine
///
/// Every variant is local and non-retryable: a failure means the inputs or
/// the calling code are wrong, and calling again with the same inputs fails
/// the same way. The type is `Clone` so a failed lazy initialisation can be
/// handed to every caller that waits on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenError {
    /// A sequence was asked for more draws than its declared per-row budget
    #[error("random sequence can only be used {limit} times per row")]
    UsageExceeded { limit: u64 },

    /// Sampling was attempted on an ordinal (non-positive weight) distribution
    #[error("distribution '{0}' has non-positive weights and cannot be sampled")]
    NotSamplable(String),

    /// Ordinal lookup past the end of a distribution
    #[error("index {index} is out of range for distribution '{name}' ({size} terms)")]
    IndexOutOfRange {
        name: String,
        index: usize,
        size: usize,
    },

    #[error("distribution '{0}' does not exist")]
    MissingDistribution(String),

    /// Malformed distribution definition source
    #[error("distribution file parse error at line {line}: {message}")]
    DistributionFormat { line: usize, message: String },

    /// Unknown symbol in a grammar production
    #[error("unknown symbol '{symbol}' in '{distribution}' production")]
    Grammar { distribution: String, symbol: char },

    /// Encoded date outside the generated calendar
    #[error("date {0} is outside the generated calendar")]
    InvalidDate(i64),

    #[error("invalid partition {index} of {count}: {reason}")]
    InvalidPartition {
        index: u32,
        count: u32,
        reason: &'static str,
    },

    #[error("unknown table '{0}'")]
    UnknownTable(String),

    #[error("invalid scale factor {0}")]
    InvalidScaleFactor(f64),

    #[error("cannot pick {count} distinct terms from '{name}' ({size} terms)")]
    InvalidSequenceLength {
        name: String,
        count: usize,
        size: usize,
    },

    #[error("text pool of {size} bytes cannot serve snippets of up to {required} bytes")]
    TextPoolTooSmall { size: usize, required: usize },

    /// Fixed-format input row could not be parsed
    #[error("row format error: {0}")]
    RowFormat(String),

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to serialize row: {0}")]
    Serialize(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Convenient alias for results returned by the engine
pub type Result<T> = std::result::Result<T, GenError>;

impl From<serde_json::Error> for GenError {
    fn from(err: serde_json::Error) -> Self {
        GenError::Serialize(err.to_string())
    }
}
