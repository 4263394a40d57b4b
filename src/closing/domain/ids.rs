//! Identifier and validated scalar types for the closing domain.

use super::ClosingDomainError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a stored closing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a task identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for TaskId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client company identifier; the unit of data isolation in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a validated tenant identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ClosingDomainError::EmptyTenant`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, ClosingDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ClosingDomainError::EmptyTenant);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the tenant identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Month of closing work (the "período").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    const MIN_YEAR: i32 = 1900;
    const MAX_YEAR: i32 = 9999;

    /// Creates a validated period.
    ///
    /// # Errors
    ///
    /// Returns [`ClosingDomainError::InvalidPeriod`] when the month is not in
    /// `1..=12` or the year is outside `1900..=9999`.
    pub const fn new(year: i32, month: u32) -> Result<Self, ClosingDomainError> {
        let month_ok = month >= 1 && month <= 12;
        let year_ok = year >= Self::MIN_YEAR && year <= Self::MAX_YEAR;
        if !month_ok || !year_ok {
            return Err(ClosingDomainError::InvalidPeriod { year, month });
        }
        Ok(Self { year, month })
    }

    /// Returns the calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Returns the calendar month (1-12).
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static SHEET_URL_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)").expect("valid sheet URL pattern")
});

/// Reference to a spreadsheet tab that feeds a period's tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetRef {
    spreadsheet_id: String,
    tab: Option<String>,
}

impl SheetRef {
    /// Creates a sheet reference from a bare spreadsheet id or a full
    /// spreadsheet URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClosingDomainError::InvalidSheetReference`] when no
    /// identifier can be extracted.
    pub fn new(value: impl Into<String>) -> Result<Self, ClosingDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let id = if trimmed.contains('/') {
            SHEET_URL_ID
                .captures(trimmed)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_owned())
        } else if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            None
        } else {
            Some(trimmed.to_owned())
        };

        id.map(|spreadsheet_id| Self {
            spreadsheet_id,
            tab: None,
        })
        .ok_or(ClosingDomainError::InvalidSheetReference(raw))
    }

    /// Selects a named tab within the spreadsheet. Blank names select the
    /// first tab.
    #[must_use]
    pub fn with_tab(mut self, tab: impl Into<String>) -> Self {
        let name = tab.into();
        let trimmed = name.trim();
        self.tab = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Returns the spreadsheet identifier.
    #[must_use]
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Returns the tab name, if one was selected.
    #[must_use]
    pub fn tab(&self) -> Option<&str> {
        self.tab.as_deref()
    }
}

impl fmt::Display for SheetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tab {
            Some(tab) => write!(f, "{}#{tab}", self.spreadsheet_id),
            None => write!(f, "{}", self.spreadsheet_id),
        }
    }
}
