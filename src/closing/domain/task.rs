//! Closing task aggregate and its persisted form.

use super::{TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `completed_by` value recorded when an import, rather than a person,
/// marked a task as completed.
pub const AUTOMATIC_IMPORT: &str = "Importação automática";

/// One closing-process work item for a tenant in a given period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    name: String,
    code: Option<String>,
    order: i32,
    area: String,
    owner: String,
    executed_by: String,
    description: String,
    notes: String,
    scheduled_at: Option<DateTime<Utc>>,
    actual_at: Option<DateTime<Utc>>,
    status: TaskStatus,
    completed_at: Option<DateTime<Utc>>,
    completed_by: Option<String>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Task title.
    pub name: String,
    /// Optional short code.
    pub code: Option<String>,
    /// "D+" offset used for scheduling and sorting.
    pub order: i32,
    /// Department or area.
    pub area: String,
    /// Responsible person.
    pub owner: String,
    /// Person who executed the task.
    pub executed_by: String,
    /// Longer description.
    pub description: String,
    /// Notes and observations.
    pub notes: String,
    /// Planned timestamp.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Completion timestamp reported by the sheet.
    pub actual_at: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Timestamp recorded when the task became terminal.
    pub completed_at: Option<DateTime<Utc>>,
    /// Who completed the task.
    pub completed_by: Option<String>,
}

/// Completion metadata carried across imports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Completion {
    /// Effective completion timestamp.
    pub actual_at: Option<DateTime<Utc>>,
    /// Timestamp recorded when the task became terminal.
    pub completed_at: Option<DateTime<Utc>>,
    /// Who completed the task.
    pub completed_by: Option<String>,
}

impl Completion {
    /// Resolves completion metadata for a freshly derived status.
    ///
    /// Terminal statuses fill gaps: `actual_at` falls back to the previous
    /// actual time, then `scheduled_at`, then `now`; `completed_by` falls
    /// back to [`AUTOMATIC_IMPORT`]; `completed_at` mirrors `actual_at`.
    /// Non-terminal statuses keep whatever completion metadata the task
    /// already had.
    #[must_use]
    pub fn resolve(
        status: TaskStatus,
        row_actual_at: Option<DateTime<Utc>>,
        scheduled_at: Option<DateTime<Utc>>,
        previous: Option<&Task>,
        now: DateTime<Utc>,
    ) -> Self {
        let previous_actual = previous.and_then(Task::actual_at);
        let previous_completed_by = previous.and_then(|task| task.completed_by().map(str::to_owned));
        let previous_completed_at = previous.and_then(Task::completed_at);

        if !status.is_terminal() {
            return Self {
                actual_at: row_actual_at,
                completed_at: previous_completed_at,
                completed_by: previous_completed_by,
            };
        }

        let actual_at = row_actual_at
            .or(previous_actual)
            .or(scheduled_at)
            .unwrap_or(now);
        Self {
            actual_at: Some(actual_at),
            completed_at: Some(actual_at),
            completed_by: previous_completed_by.or_else(|| Some(AUTOMATIC_IMPORT.to_owned())),
        }
    }
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            code: data.code,
            order: data.order,
            area: data.area,
            owner: data.owner,
            executed_by: data.executed_by,
            description: data.description,
            notes: data.notes,
            scheduled_at: data.scheduled_at,
            actual_at: data.actual_at,
            status: data.status,
            completed_at: data.completed_at,
            completed_by: data.completed_by,
        }
    }

    /// Converts the task back into its persisted form.
    #[must_use]
    pub fn into_persisted(self) -> PersistedTaskData {
        PersistedTaskData {
            id: self.id,
            name: self.name,
            code: self.code,
            order: self.order,
            area: self.area,
            owner: self.owner,
            executed_by: self.executed_by,
            description: self.description,
            notes: self.notes,
            scheduled_at: self.scheduled_at,
            actual_at: self.actual_at,
            status: self.status,
            completed_at: self.completed_at,
            completed_by: self.completed_by,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the task code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Returns the "D+" offset.
    #[must_use]
    pub const fn order(&self) -> i32 {
        self.order
    }

    /// Returns the area.
    #[must_use]
    pub fn area(&self) -> &str {
        &self.area
    }

    /// Returns the responsible person.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns who executed the task.
    #[must_use]
    pub fn executed_by(&self) -> &str {
        &self.executed_by
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the notes.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Returns the scheduled timestamp.
    #[must_use]
    pub const fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        self.scheduled_at
    }

    /// Returns the completion timestamp reported by the sheet.
    #[must_use]
    pub const fn actual_at(&self) -> Option<DateTime<Utc>> {
        self.actual_at
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns when the task became terminal.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns who completed the task.
    #[must_use]
    pub fn completed_by(&self) -> Option<&str> {
        self.completed_by.as_deref()
    }
}
