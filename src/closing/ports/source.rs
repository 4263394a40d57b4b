//! Spreadsheet transport port.

use crate::closing::domain::{RawRow, SheetRef};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for spreadsheet source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Fetches the rows of a spreadsheet tab as header-keyed records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpreadsheetSource: Send + Sync {
    /// Returns the data rows of the referenced sheet, header row excluded.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the sheet cannot be fetched or the
    /// payload is not tabular data.
    async fn fetch_rows(&self, sheet: &SheetRef) -> SourceResult<Vec<RawRow>>;
}

/// Errors returned by spreadsheet source implementations.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The export endpoint answered with a non-success status.
    #[error("spreadsheet export returned HTTP {status}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
    },

    /// The endpoint returned an HTML page (usually a login page for a sheet
    /// that is not shared) instead of tabular data.
    #[error("spreadsheet export returned HTML instead of data; check the sheet's sharing settings")]
    NotTabular,

    /// The endpoint returned an empty body.
    #[error("spreadsheet export returned an empty payload")]
    EmptyPayload,

    /// The requested tab does not exist in the workbook.
    #[error("sheet tab not found: {0}")]
    TabNotFound(String),

    /// The payload could not be parsed as CSV or XLSX.
    #[error("malformed spreadsheet payload: {0}")]
    Malformed(String),

    /// Network or client failure.
    #[error("spreadsheet transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl SourceError {
    /// Wraps a transport-layer error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
