//! Record model error types.

use thiserror::Error;

/// Result type for record operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors that can occur when mutating a record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid event date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("no event at index {index} for year {year}")]
    EventNotFound { year: String, index: usize },

    #[error("no family member at index {0}")]
    FamilyMemberNotFound(usize),
}
