//! CSV export parsing.

use super::looks_like_html;
use crate::closing::{
    domain::{CellValue, RawRow},
    ports::{SourceError, SourceResult},
};

/// Validates an export body and parses it as CSV.
///
/// # Errors
///
/// Returns [`SourceError::EmptyPayload`] for a blank body,
/// [`SourceError::NotTabular`] for an HTML page, and
/// [`SourceError::Malformed`] when the CSV cannot be read.
pub fn parse_csv_payload(content_type: Option<&str>, body: &str) -> SourceResult<Vec<RawRow>> {
    if body.trim().is_empty() {
        return Err(SourceError::EmptyPayload);
    }
    if looks_like_html(content_type, body.as_bytes()) {
        return Err(SourceError::NotTabular);
    }
    rows_from_csv(body)
}

/// Parses CSV text whose first record is the header row.
///
/// Columns with blank headers and rows with only blank cells are dropped.
/// Cell text is kept verbatim; normalization happens downstream.
///
/// # Errors
///
/// Returns [`SourceError::Malformed`] when a record cannot be decoded.
pub fn rows_from_csv(payload: &str) -> SourceResult<Vec<RawRow>> {
    let text = payload.trim_start_matches('\u{feff}');
    let mut reader = ::csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|err| SourceError::Malformed(err.to_string()))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| SourceError::Malformed(err.to_string()))?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.trim().is_empty())
            .map(|(header, value)| (header, CellValue::from_text(value)))
            .collect();
        if !row.is_blank() {
            rows.push(row);
        }
    }
    Ok(rows)
}
