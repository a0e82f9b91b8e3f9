use super::validation::ValidationError;
use thiserror::Error;

/// Error returned by collection operations.
///
/// A missing record is not an error: lookups return `None` and deletes return
/// `false`.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type CollectionResult<T> = Result<T, CollectionError>;
