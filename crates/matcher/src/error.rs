use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// Search parameters rejected before any search runs.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A weight could not be summed or rounded. Aborts the whole extraction.
    #[error("record {record_id}: {reason}")]
    Computation { record_id: i64, reason: String },
}

impl MatchError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn computation(record_id: i64, reason: impl Into<String>) -> Self {
        Self::Computation {
            record_id,
            reason: reason.into(),
        }
    }
}
