//! Preloaded spreadsheet source.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::closing::{
    domain::{RawRow, SheetRef},
    ports::{SourceError, SourceResult, SpreadsheetSource},
};

/// Spreadsheet source that serves preloaded rows or errors per sheet.
///
/// Unknown sheets answer with [`SourceError::HttpStatus`] 404.
#[derive(Debug, Clone, Default)]
pub struct StaticSheetSource {
    sheets: Arc<RwLock<HashMap<SheetRef, SourceResult<Vec<RawRow>>>>>,
    delay: Option<Duration>,
}

impl StaticSheetSource {
    /// Creates a source with no sheets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every fetch, to exercise timeouts and concurrent syncs.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Serves `rows` for `sheet`, replacing any previous entry.
    pub fn insert_rows(&self, sheet: SheetRef, rows: Vec<RawRow>) {
        self.insert(sheet, Ok(rows));
    }

    /// Fails fetches of `sheet` with `error`.
    pub fn insert_error(&self, sheet: SheetRef, error: SourceError) {
        self.insert(sheet, Err(error));
    }

    fn insert(&self, sheet: SheetRef, response: SourceResult<Vec<RawRow>>) {
        let mut sheets = self
            .sheets
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        sheets.insert(sheet, response);
    }
}

#[async_trait]
impl SpreadsheetSource for StaticSheetSource {
    async fn fetch_rows(&self, sheet: &SheetRef) -> SourceResult<Vec<RawRow>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let sheets = self
            .sheets
            .read()
            .map_err(|err| SourceError::transport(std::io::Error::other(err.to_string())))?;
        sheets
            .get(sheet)
            .cloned()
            .unwrap_or(Err(SourceError::HttpStatus { status: 404 }))
    }
}
