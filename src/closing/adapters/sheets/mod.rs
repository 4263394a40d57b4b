//! Google Sheets export adapter and payload parsers.

mod csv;
mod http;
mod xlsx;

pub use self::csv::{parse_csv_payload, rows_from_csv};
pub use self::http::{ExportFormat, GoogleSheetsConfig, GoogleSheetsSource};
pub use self::xlsx::rows_from_xlsx;

/// Returns `true` when a payload is an HTML page rather than sheet data.
///
/// Private sheets answer export requests with a login page and a success
/// status, so the body has to be inspected.
#[must_use]
pub fn looks_like_html(content_type: Option<&str>, body: &[u8]) -> bool {
    let html_type = content_type.is_some_and(|value| value.to_ascii_lowercase().contains("text/html"));
    let prefix: Vec<u8> = body
        .iter()
        .copied()
        .skip_while(u8::is_ascii_whitespace)
        .take(15)
        .map(|byte| byte.to_ascii_lowercase())
        .collect();
    html_type || prefix.starts_with(b"<!doctype html") || prefix.starts_with(b"<html")
}
