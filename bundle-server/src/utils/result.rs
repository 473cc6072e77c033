//! Unified Result Types

use crate::utils::AppError;

/// Application-level Result type
///
/// Used in HTTP handlers and the lifecycle services
pub type AppResult<T> = Result<T, AppError>;
