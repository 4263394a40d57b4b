//! Error types for closing domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain closing values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClosingDomainError {
    /// The tenant identifier is empty after trimming.
    #[error("tenant identifier must not be empty")]
    EmptyTenant,

    /// The period month or year is out of range.
    #[error("invalid period {year}-{month}, expected month 1-12 and year 1900-9999")]
    InvalidPeriod {
        /// Rejected year.
        year: i32,
        /// Rejected month.
        month: u32,
    },

    /// The spreadsheet reference carries no usable identifier.
    #[error("invalid spreadsheet reference '{0}'")]
    InvalidSheetReference(String),
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
