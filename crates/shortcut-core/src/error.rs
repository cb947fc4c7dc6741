use thiserror::Error;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors shared by every storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("record has been deleted: {0}")]
    Deleted(String),
    #[error("batch saved {actual} of {expected} urls")]
    PartialBatch { expected: usize, actual: usize },
    #[error("store has been closed")]
    Closed,
    #[error("storage io failed: {0}")]
    Io(String),
    #[error("snapshot serialization failed: {0}")]
    Serialization(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

impl StoreError {
    /// Rejects a batch result whose length does not match the request.
    pub fn check_batch<T>(expected: usize, saved: Vec<T>) -> Result<Vec<T>> {
        if saved.len() != expected {
            return Err(StoreError::PartialBatch {
                expected,
                actual: saved.len(),
            });
        }
        Ok(saved)
    }

    /// Returns `true` for errors that mean "no live record", as opposed to
    /// a failure of the backend itself.
    pub fn is_missing(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::Deleted(_))
    }
}
