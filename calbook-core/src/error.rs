//! Error types for calbook.

use thiserror::Error;

/// Errors that can occur in calbook operations.
#[derive(Error, Debug)]
pub enum CalbookError {
    /// Malformed input rejected before anything was mutated.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A strict add or an edit collides with an existing event.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Calendar '{0}' already exists")]
    CalendarExists(String),

    #[error("Unknown timezone '{0}'. Expected an IANA name like America/New_York")]
    InvalidTimezone(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CalbookError {
    /// True for the plain "collides with an existing event" case.
    pub fn is_conflict(&self) -> bool {
        matches!(self, CalbookError::Conflict(_))
    }
}

/// Result type alias for calbook operations.
pub type CalbookResult<T> = Result<T, CalbookError>;
