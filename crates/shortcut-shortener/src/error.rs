use shortcut_core::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortenerError>;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("short url not found: {0}")]
    NotFound(String),
    #[error("short url has been deleted: {0}")]
    Deleted(String),
    #[error("cannot access storage: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for ShortenerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Deleted(id) => Self::Deleted(id),
            other => Self::Storage(other),
        }
    }
}
