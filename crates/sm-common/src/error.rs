use thiserror::Error;

use crate::PostingId;

/// Failures of a match generation. An empty or fully placed pool is not an
/// error; it yields an empty result set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchingError {
    #[error("posting {posting_id} is not matchable: {reason}")]
    InvalidPosting { posting_id: PostingId, reason: String },
    /// Same checks as `InvalidPosting`, for a posting that has no id yet.
    #[error("posting criteria rejected: {reason}")]
    InvalidCriteria { reason: String },
    #[error("invalid matching configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl MatchingError {
    pub fn invalid_posting(posting_id: PostingId, reason: impl Into<String>) -> Self {
        MatchingError::InvalidPosting {
            posting_id,
            reason: reason.into(),
        }
    }
}

/// Rejected engine configuration (weights, thresholds, score tiers).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("{name} must be within {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("weights must have a positive sum, got {0}")]
    ZeroWeights(f64),
    #[error("adequate reason threshold {adequate} exceeds strong threshold {strong}")]
    ThresholdOrder { adequate: f64, strong: f64 },
}
