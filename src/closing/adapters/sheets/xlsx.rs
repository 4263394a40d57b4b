//! XLSX export parsing.

use crate::closing::{
    domain::{CellValue, RawRow},
    ports::{SourceError, SourceResult},
};
use calamine::{Data, Reader, Xlsx};
use std::io::Cursor;

/// Parses an XLSX workbook, reading `tab` or the first sheet.
///
/// The first row of the range is the header row. Date cells become serial
/// numbers so they flow through the same normalization as CSV text.
///
/// # Errors
///
/// Returns [`SourceError::TabNotFound`] when `tab` is not in the workbook
/// and [`SourceError::Malformed`] when the workbook cannot be read.
pub fn rows_from_xlsx(bytes: &[u8], tab: Option<&str>) -> SourceResult<Vec<RawRow>> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|err| SourceError::Malformed(err.to_string()))?;
    let sheet_names = workbook.sheet_names();
    let name = match tab {
        Some(wanted) => sheet_names
            .iter()
            .find(|name| name.trim().eq_ignore_ascii_case(wanted.trim()))
            .cloned()
            .ok_or_else(|| SourceError::TabNotFound(wanted.to_owned()))?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| SourceError::Malformed("workbook has no sheets".to_owned()))?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|err| SourceError::Malformed(err.to_string()))?;
    let mut records = range.rows();
    let Some(header_cells) = records.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_cells
        .iter()
        .map(|cell| cell.to_string().trim().to_owned())
        .collect();

    let rows = records
        .map(|cells| {
            headers
                .iter()
                .zip(cells)
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, cell)| (header.as_str(), cell_value(cell)))
                .collect::<RawRow>()
        })
        .filter(|row| !row.is_blank())
        .collect();
    Ok(rows)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(value) => CellValue::from(*value),
        Data::Float(value) => CellValue::Number(*value),
        Data::DateTime(value) => CellValue::Number(value.as_f64()),
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            CellValue::from_text(text.as_str())
        }
        Data::Bool(value) => CellValue::Text(value.to_string()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}
