/// Error types for Content Service
///
/// All failures in this crate are local precondition checks raised
/// synchronously to the calling layer; nothing is retried or swallowed here.
/// Persistence failures propagate unchanged as `Storage`.
use thiserror::Error;

/// Result type for content-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Referenced content or profile does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Visibility/privacy check failed
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Precondition on the input failed
    #[error("validation error: {0}")]
    Validation(String),

    /// Persistence layer failure, propagated unchanged
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
