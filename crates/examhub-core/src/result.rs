//! Convenience result type alias for ExamHub.

use crate::error::AppError;

/// A specialized `Result` type for ExamHub operations.
pub type AppResult<T> = Result<T, AppError>;
