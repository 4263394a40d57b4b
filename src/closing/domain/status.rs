//! Task lifecycle status and its derivation from imported data.

use super::ParseTaskStatusError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a closing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started and not yet due.
    #[default]
    Pending,
    /// Reported as being worked on.
    InProgress,
    /// Past its scheduled time without completion.
    Late,
    /// Completed on time.
    Done,
    /// Completed after its scheduled time.
    DoneLate,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Late => "late",
            Self::Done => "done",
            Self::DoneLate => "done_late",
        }
    }

    /// Returns `true` for `done` and `done_late`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::DoneLate)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "late" => Ok(Self::Late),
            "done" => Ok(Self::Done),
            "done_late" => Ok(Self::DoneLate),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const DONE_MARKERS: [&str; 8] = [
    "conclu", "finaliz", "executad", "completed", "entregue", "feito", "done", "finished",
];
const IN_PROGRESS_MARKERS: [&str; 5] = ["andamento", "em execu", "fazendo", "progress", "doing"];
const LATE_MARKERS: [&str; 5] = ["atras", "vencid", "late", "delay", "overdue"];
const NEGATION_PREFIXES: [&str; 4] = ["não ", "nao ", "not ", "sem "];

/// Markers recognised in a free-text status cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusText {
    /// Text reports the task as completed.
    pub done: bool,
    /// Text reports the task as being worked on.
    pub in_progress: bool,
    /// Text reports the task as late.
    pub late: bool,
}

impl StatusText {
    /// Classifies free-text status by case-insensitive substring match.
    ///
    /// Negated phrases ("não concluído", "sem atraso") suppress every
    /// marker.
    #[must_use]
    pub fn classify(text: &str) -> Self {
        let normalized = text.trim().to_lowercase();
        let negated = NEGATION_PREFIXES
            .iter()
            .any(|prefix| normalized.starts_with(prefix));
        let has = |markers: &[&str]| markers.iter().any(|marker| normalized.contains(marker));

        Self {
            done: !negated && has(&DONE_MARKERS),
            in_progress: !negated && has(&IN_PROGRESS_MARKERS),
            late: !negated && has(&LATE_MARKERS),
        }
    }
}

/// Which signal decides completion when a row has an actual date but its
/// status text disagrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionPrecedence {
    /// An actual date completes the task regardless of status text.
    #[default]
    ActualDate,
    /// Non-empty status text decides; the actual date only counts when the
    /// status cell is blank.
    StatusText,
}

/// Inputs to [`derive_status`].
#[derive(Debug, Clone, Copy)]
pub struct StatusInputs<'a> {
    /// Status stored before this import, if the row matched a task.
    pub previous: Option<TaskStatus>,
    /// Raw status cell text.
    pub status_text: Option<&'a str>,
    /// Resolved scheduled timestamp.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Resolved completion timestamp from the row.
    pub actual_at: Option<DateTime<Utc>>,
    /// Completion timestamp stored before this import. Stands in for a
    /// missing row value when deciding between `done` and `done_late`.
    pub previous_actual_at: Option<DateTime<Utc>>,
    /// Reference time for lateness.
    pub now: DateTime<Utc>,
}

/// Recomputes a task's status from imported data.
///
/// Completion comes first: an actual date or a done marker yields `done`,
/// upgraded to `done_late` when the actual date (the row's, else the stored
/// one) is after the scheduled one.
/// Otherwise a past scheduled time yields `late`, an in-progress marker
/// yields `in_progress`, and anything else is `pending`. A late marker
/// overrides every non-terminal outcome.
///
/// A previous terminal status survives when the row carries neither an
/// actual date nor any status text.
#[must_use]
pub fn derive_status(inputs: StatusInputs<'_>, precedence: CompletionPrecedence) -> TaskStatus {
    let text = inputs
        .status_text
        .map(str::trim)
        .filter(|text| !text.is_empty());
    let markers = text.map(StatusText::classify).unwrap_or_default();

    let kept_terminal = inputs
        .previous
        .filter(|status| status.is_terminal())
        .filter(|_| text.is_none() && inputs.actual_at.is_none());
    if let Some(previous) = kept_terminal {
        return previous;
    }

    let actual_counts = match precedence {
        CompletionPrecedence::ActualDate => inputs.actual_at.is_some(),
        CompletionPrecedence::StatusText => inputs.actual_at.is_some() && text.is_none(),
    };

    if actual_counts || markers.done {
        let effective_actual = inputs.actual_at.or(inputs.previous_actual_at);
        return match (effective_actual, inputs.scheduled_at) {
            (Some(actual), Some(scheduled)) if actual > scheduled => TaskStatus::DoneLate,
            _ => TaskStatus::Done,
        };
    }

    if markers.late {
        return TaskStatus::Late;
    }

    match inputs.scheduled_at {
        Some(scheduled) if scheduled < inputs.now => TaskStatus::Late,
        _ if markers.in_progress => TaskStatus::InProgress,
        _ => TaskStatus::Pending,
    }
}
