//! Domain model for closing-task reconciliation.
//!
//! The domain holds the pure pipeline stages: column resolution, date/time
//! normalization, identity matching and status derivation. No stage performs
//! I/O or returns an error; unusable input degrades to `None` or to the
//! default status.

mod cell;
mod columns;
mod dates;
mod error;
mod identity;
mod ids;
mod status;
mod task;

pub use cell::{CellValue, RawRow};
pub use columns::{Field, normalize_header, resolve, resolve_field, resolve_text};
pub use dates::{SERIAL_EPOCH_OFFSET_DAYS, combine_date_and_time, parse_date, parse_time_of_day};
pub use error::{ClosingDomainError, ParseTaskStatusError};
pub use identity::{DedupKey, MatchKind, RowIdentity, find_match, normalize_key};
pub use ids::{Period, SheetRef, TaskId, TenantId};
pub use status::{CompletionPrecedence, StatusInputs, StatusText, TaskStatus, derive_status};
pub use task::{AUTOMATIC_IMPORT, Completion, PersistedTaskData, Task};
