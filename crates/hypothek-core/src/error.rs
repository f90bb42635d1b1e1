use thiserror::Error;

#[derive(Debug, Error)]
pub enum HypoError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Tranche index {index} out of range ({count} tranches)")]
    TrancheIndexOutOfRange { index: usize, count: usize },

    #[error("Tranche limit reached: a mix holds at most {max} tranches")]
    TrancheLimitReached { max: usize },

    #[error("A tranche mix must keep at least one tranche")]
    LastTranche,

    #[error("Tranche structuring has not been initialized yet")]
    TranchesNotInitialized,

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for HypoError {
    fn from(e: serde_json::Error) -> Self {
        HypoError::SerializationError(e.to_string())
    }
}
