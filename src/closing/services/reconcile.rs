//! The canonical spreadsheet-to-task reconciliation pipeline.
//!
//! [`reconcile`] is pure: given raw rows, the tasks currently stored for a
//! period and a reference time, it returns the task set to upsert and the
//! stored ids that no row reproduced.

use crate::closing::domain::{
    CellValue, Completion, CompletionPrecedence, DedupKey, Field, PersistedTaskData, RawRow,
    RowIdentity, StatusInputs, Task, TaskId, combine_date_and_time, derive_status, find_match,
    parse_date, resolve_field, resolve_text,
};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// Offset used for wall-clock times when none is configured (Brasília).
pub const DEFAULT_WALL_CLOCK_OFFSET_SECS: i32 = -3 * 3600;

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static ORDER_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-+]?\d+").expect("valid order pattern"));

/// Whether stored history takes part in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileMode {
    /// Match rows against stored tasks so ids and completion survive.
    #[default]
    PreserveHistory,
    /// Treat every row as new and report every stored task as deleted.
    HardReset,
}

/// Caller-level policy for a reconciliation pass.
///
/// # Examples
///
/// ```
/// use fechamento::closing::services::{ReconcileMode, ReconcileOptions};
///
/// let options = ReconcileOptions::default();
/// assert_eq!(options.mode, ReconcileMode::PreserveHistory);
///
/// let reset = ReconcileOptions::hard_reset();
/// assert_eq!(reset.mode, ReconcileMode::HardReset);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions {
    /// History policy.
    pub mode: ReconcileMode,
    /// Offset in which explicit wall-clock times are read.
    pub wall_clock: FixedOffset,
    /// Whether an actual date or the status text decides completion.
    pub precedence: CompletionPrecedence,
    /// Keep stored notes when the row leaves the notes cell blank.
    pub keep_existing_notes: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            mode: ReconcileMode::PreserveHistory,
            wall_clock: default_wall_clock(),
            precedence: CompletionPrecedence::ActualDate,
            keep_existing_notes: true,
        }
    }
}

impl ReconcileOptions {
    /// Options that discard stored history.
    #[must_use]
    pub fn hard_reset() -> Self {
        Self {
            mode: ReconcileMode::HardReset,
            ..Self::default()
        }
    }

    /// Replaces the wall-clock offset.
    #[must_use]
    pub const fn with_wall_clock(mut self, wall_clock: FixedOffset) -> Self {
        self.wall_clock = wall_clock;
        self
    }

    /// Replaces the completion precedence.
    #[must_use]
    pub const fn with_precedence(mut self, precedence: CompletionPrecedence) -> Self {
        self.precedence = precedence;
        self
    }
}

fn default_wall_clock() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_WALL_CLOCK_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Final task records, in sheet order.
    pub upserts: Vec<Task>,
    /// Stored task ids no row reproduced.
    pub deletions: Vec<TaskId>,
    /// Rows that created a new task.
    pub created: usize,
    /// Rows that updated a stored task.
    pub updated: usize,
    /// Rows skipped as batch duplicates.
    pub skipped_duplicates: usize,
    /// Rows dropped for lacking a name.
    pub skipped_nameless: usize,
}

/// Row fields after alias resolution and date normalization.
struct ResolvedRow {
    name: String,
    code: Option<String>,
    order: i32,
    area: Option<String>,
    owner: Option<String>,
    executed_by: Option<String>,
    description: Option<String>,
    notes: Option<String>,
    status_text: Option<String>,
    scheduled_at: Option<DateTime<Utc>>,
    actual_at: Option<DateTime<Utc>>,
}

impl ResolvedRow {
    fn from_row(raw: &RawRow, position: usize, wall: FixedOffset) -> Option<Self> {
        let name = resolve_text(raw, Field::Name)?;
        let scheduled_date = resolve_field(raw, Field::ScheduledDate).and_then(|v| parse_date(v, wall));
        let actual_date = resolve_field(raw, Field::ActualDate).and_then(|v| parse_date(v, wall));

        Some(Self {
            name,
            code: resolve_text(raw, Field::Code),
            order: resolve_field(raw, Field::Order)
                .and_then(parse_order)
                .unwrap_or_else(|| fallback_order(position)),
            area: resolve_text(raw, Field::Area),
            owner: resolve_text(raw, Field::Owner),
            executed_by: resolve_text(raw, Field::ExecutedBy),
            description: resolve_text(raw, Field::Description),
            notes: resolve_text(raw, Field::Notes),
            status_text: resolve_text(raw, Field::Status),
            scheduled_at: combine_date_and_time(
                scheduled_date,
                resolve_field(raw, Field::ScheduledTime),
                wall,
            ),
            actual_at: combine_date_and_time(
                actual_date,
                resolve_field(raw, Field::ActualTime),
                wall,
            ),
        })
    }
}

/// Parses a "D+" cell: `3`, `3.0`, `"D+3"`, `"-2"`.
fn parse_order(value: &CellValue) -> Option<i32> {
    match value {
        CellValue::Number(number) => number_to_order(*number),
        CellValue::Text(text) => ORDER_DIGITS
            .find(text)
            .and_then(|m| m.as_str().parse().ok()),
        CellValue::Empty => None,
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "value is range-checked against i32 bounds first"
)]
fn number_to_order(number: f64) -> Option<i32> {
    let truncated = number.trunc();
    let in_range = truncated.is_finite()
        && truncated >= f64::from(i32::MIN)
        && truncated <= f64::from(i32::MAX);
    in_range.then(|| truncated as i32)
}

fn fallback_order(position: usize) -> i32 {
    i32::try_from(position).unwrap_or(i32::MAX)
}

/// Merges a resolved row with its matched task (if any) into a final record.
fn build_task(
    row: &ResolvedRow,
    previous: Option<&Task>,
    now: DateTime<Utc>,
    options: &ReconcileOptions,
) -> Task {
    let status = derive_status(
        StatusInputs {
            previous: previous.map(Task::status),
            status_text: row.status_text.as_deref(),
            scheduled_at: row.scheduled_at,
            actual_at: row.actual_at,
            previous_actual_at: previous.and_then(Task::actual_at),
            now,
        },
        options.precedence,
    );
    let completion = Completion::resolve(status, row.actual_at, row.scheduled_at, previous, now);

    let notes = match (&row.notes, previous) {
        (Some(notes), _) => notes.clone(),
        (None, Some(task)) if options.keep_existing_notes => task.notes().to_owned(),
        (None, _) => String::new(),
    };

    Task::from_persisted(PersistedTaskData {
        id: previous.map_or_else(TaskId::new, Task::id),
        name: row.name.clone(),
        code: row.code.clone(),
        order: row.order,
        area: row.area.clone().unwrap_or_default(),
        owner: row.owner.clone().unwrap_or_default(),
        executed_by: row.executed_by.clone().unwrap_or_default(),
        description: row.description.clone().unwrap_or_default(),
        notes,
        scheduled_at: row.scheduled_at,
        actual_at: completion.actual_at,
        status,
        completed_at: completion.completed_at,
        completed_by: completion.completed_by,
    })
}

/// Reconciles imported rows with the tasks stored for a period.
///
/// Rows are processed in order. Rows without a resolvable name are
/// dropped; repeated `code|name` combinations after the first are skipped.
/// Each remaining row is matched one-to-one against `existing` (see
/// [`find_match`]) so matched tasks keep their id and completion history.
/// Stored tasks no row consumed are reported in
/// [`ReconcileOutcome::deletions`]. Under [`ReconcileMode::HardReset`] no
/// matching happens and every stored task is reported as deleted.
#[must_use]
pub fn reconcile(
    rows: &[RawRow],
    existing: &[Task],
    now: DateTime<Utc>,
    options: &ReconcileOptions,
) -> ReconcileOutcome {
    let candidates: &[Task] = match options.mode {
        ReconcileMode::PreserveHistory => existing,
        ReconcileMode::HardReset => &[],
    };
    let mut outcome = ReconcileOutcome::default();
    let mut seen: HashSet<DedupKey> = HashSet::new();
    let mut consumed: HashSet<TaskId> = HashSet::new();

    for (index, raw) in rows.iter().enumerate() {
        let position = index + 1;
        let Some(row) = ResolvedRow::from_row(raw, position, options.wall_clock) else {
            if !raw.is_blank() {
                debug!(position, "skipping row without a task name");
            }
            outcome.skipped_nameless += 1;
            continue;
        };

        let key = DedupKey::new(row.code.as_deref(), &row.name);
        if !seen.insert(key) {
            debug!(position, name = %row.name, "skipping duplicate row");
            outcome.skipped_duplicates += 1;
            continue;
        }

        let identity = RowIdentity::new(row.code.as_deref(), &row.name);
        let matched = find_match(&identity, candidates, &consumed);
        if let Some((task, kind)) = matched {
            debug!(position, task_id = %task.id(), ?kind, "row matched stored task");
            consumed.insert(task.id());
            outcome.updated += 1;
        } else {
            outcome.created += 1;
        }

        let task = build_task(&row, matched.map(|(task, _)| task), now, options);
        outcome.upserts.push(task);
    }

    outcome.deletions = existing
        .iter()
        .map(Task::id)
        .filter(|id| !consumed.contains(id))
        .collect();
    outcome
}
