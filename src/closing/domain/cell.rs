//! Weakly-typed spreadsheet cells and header-keyed rows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single spreadsheet cell as produced by CSV or XLSX parsing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Textual cell content, untrimmed.
    Text(String),
    /// Numeric cell content (including spreadsheet date serials).
    Number(f64),
    /// Blank cell.
    #[default]
    Empty,
}

impl CellValue {
    /// Builds a cell from raw text, mapping the empty string to
    /// [`CellValue::Empty`].
    #[must_use]
    pub fn from_text(value: impl Into<String>) -> Self {
        let text = value.into();
        if text.is_empty() {
            Self::Empty
        } else {
            Self::Text(text)
        }
    }

    /// Returns `true` when the cell carries no usable value.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(value) => !value.is_finite(),
            Self::Empty => true,
        }
    }

    /// Returns the trimmed textual rendering of the cell, or `None` when the
    /// cell is blank. Integral numbers render without a fractional part.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        match self {
            Self::Text(text) => Some(text.trim().to_owned()),
            Self::Number(value) => Some(format_number(*value)),
            Self::Empty => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::from_text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::from_text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    #[expect(
        clippy::cast_precision_loss,
        reason = "spreadsheet integers fit well inside f64 mantissa"
    )]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(value) => f.write_str(&format_number(*value)),
            Self::Empty => Ok(()),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// One spreadsheet row keyed by header text.
///
/// Headers keep their original spelling and order. Duplicate headers are
/// retained; lookups return the first occurrence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Appends a header/value pair.
    pub fn push(&mut self, header: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.push((header.into(), value.into()));
    }

    /// Appends a header/value pair, returning the row for chaining.
    #[must_use]
    pub fn with(mut self, header: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.push(header, value);
        self
    }

    /// Returns the value stored under the exact header text.
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(key, _)| key == header)
            .map(|(_, value)| value)
    }

    /// Iterates over header/value pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the number of cells in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` when the row has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns `true` when every cell in the row is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.is_blank())
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
