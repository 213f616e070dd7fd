//! Error types for decacal.

use thiserror::Error;

/// Why a date falls outside the configured calendar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("Day must be between 1 and {max}, got {day}")]
    DayOutOfRange { day: u32, max: u32 },

    #[error("Month must be between 0 and {max}, got {month}")]
    MonthOutOfRange { month: u32, max: u32 },

    #[error("Year must be a positive number, got {0}")]
    YearOutOfRange(i32),
}

/// Errors that can occur in decacal operations.
#[derive(Error, Debug)]
pub enum DecacalError {
    #[error("Invalid date: {0}")]
    InvalidDate(#[from] DateError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend unavailable: {0}")]
    Transient(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Corrupt local data: {0}")]
    CorruptState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DecacalError {
    /// Network/timeout failures: worth one more attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, DecacalError::Transient(_))
    }

    /// Bad user input. Never retried, never changes state.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DecacalError::InvalidDate(_) | DecacalError::Validation(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DecacalError::NotFound(_))
    }
}

/// Result type alias for decacal operations.
pub type DecacalResult<T> = Result<T, DecacalError>;
