//! HTTP transport for Google Sheets exports.

use super::{looks_like_html, parse_csv_payload, rows_from_xlsx};
use crate::closing::{
    domain::{RawRow, SheetRef},
    ports::{SourceError, SourceResult, SpreadsheetSource},
};
use async_trait::async_trait;
use reqwest::{Client, Url, header::CONTENT_TYPE};
use std::time::Duration;
use tracing::debug;

/// Export format requested from the spreadsheet service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// CSV through the visualization endpoint; supports named tabs.
    #[default]
    Csv,
    /// Whole workbook as XLSX; the tab is selected locally.
    Xlsx,
}

/// Configuration for [`GoogleSheetsSource`].
#[derive(Debug, Clone)]
pub struct GoogleSheetsConfig {
    /// Scheme and host of the spreadsheet service.
    pub base_url: String,
    /// Export format.
    pub format: ExportFormat,
    /// Per-request timeout enforced by the HTTP client.
    pub request_timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for GoogleSheetsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://docs.google.com".to_owned(),
            format: ExportFormat::Csv,
            request_timeout: Duration::from_secs(20),
            user_agent: concat!("fechamento/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

/// Fetches shared Google Sheets tabs through their export endpoints.
#[derive(Debug, Clone)]
pub struct GoogleSheetsSource {
    client: Client,
    config: GoogleSheetsConfig,
}

impl GoogleSheetsSource {
    /// Builds a source with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Transport`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: GoogleSheetsConfig) -> SourceResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(SourceError::transport)?;
        Ok(Self { client, config })
    }

    /// Returns the export URL for `sheet` under the configured format.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Transport`] when the base URL is invalid.
    pub fn export_url(&self, sheet: &SheetRef) -> SourceResult<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let id = sheet.spreadsheet_id();
        let parsed = match self.config.format {
            ExportFormat::Csv => {
                let mut params = vec![("tqx", "out:csv")];
                if let Some(tab) = sheet.tab() {
                    params.push(("sheet", tab));
                }
                Url::parse_with_params(&format!("{base}/spreadsheets/d/{id}/gviz/tq"), params)
            }
            ExportFormat::Xlsx => Url::parse_with_params(
                &format!("{base}/spreadsheets/d/{id}/export"),
                [("format", "xlsx")],
            ),
        };
        parsed.map_err(SourceError::transport)
    }
}

#[async_trait]
impl SpreadsheetSource for GoogleSheetsSource {
    async fn fetch_rows(&self, sheet: &SheetRef) -> SourceResult<Vec<RawRow>> {
        let url = self.export_url(sheet)?;
        debug!(%url, "fetching spreadsheet export");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(SourceError::transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
            });
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        match self.config.format {
            ExportFormat::Csv => {
                let body = response.text().await.map_err(SourceError::transport)?;
                parse_csv_payload(content_type.as_deref(), &body)
            }
            ExportFormat::Xlsx => {
                let body = response.bytes().await.map_err(SourceError::transport)?;
                if body.is_empty() {
                    return Err(SourceError::EmptyPayload);
                }
                if looks_like_html(content_type.as_deref(), &body) {
                    return Err(SourceError::NotTabular);
                }
                rows_from_xlsx(&body, sheet.tab())
            }
        }
    }
}
