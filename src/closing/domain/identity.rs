//! Identity matching between imported rows and stored tasks.

use super::{Task, TaskId};
use std::collections::HashSet;
use std::fmt;

/// Normalizes an identity component: trimmed, lower-cased and with internal
/// whitespace collapsed.
#[must_use]
pub fn normalize_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Batch-local deduplication key built from normalized code and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey(String);

impl DedupKey {
    /// Builds the `code|name` key. A missing code contributes an empty
    /// segment.
    #[must_use]
    pub fn new(code: Option<&str>, name: &str) -> Self {
        let code_part = code.map(normalize_key).unwrap_or_default();
        Self(format!("{code_part}|{}", normalize_key(name)))
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an incoming row was tied to a stored task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Code and name both match.
    Strong,
    /// Code matches; the task was renamed.
    CodeOnly,
    /// Name matches and the codes do not conflict.
    NameOnly,
}

/// Identity of an incoming row, normalized once for repeated comparison.
#[derive(Debug, Clone)]
pub struct RowIdentity {
    code: Option<String>,
    name: String,
}

impl RowIdentity {
    /// Normalizes a row's code and name. Blank codes count as absent.
    #[must_use]
    pub fn new(code: Option<&str>, name: &str) -> Self {
        Self {
            code: code.map(normalize_key).filter(|code| !code.is_empty()),
            name: normalize_key(name),
        }
    }

    fn classify(&self, task: &Task) -> Option<MatchKind> {
        let task_code = task
            .code()
            .map(normalize_key)
            .filter(|code| !code.is_empty());
        let task_name = normalize_key(task.name());
        let names_equal = task_name == self.name;

        match (self.code.as_deref(), task_code.as_deref()) {
            (Some(ours), Some(theirs)) if ours == theirs => Some(if names_equal {
                MatchKind::Strong
            } else {
                MatchKind::CodeOnly
            }),
            (Some(_), Some(_)) => None,
            _ if names_equal => Some(MatchKind::NameOnly),
            _ => None,
        }
    }
}

/// Finds the stored task an incoming row corresponds to.
///
/// Tiers are evaluated in priority order across every unconsumed candidate:
/// a strong match anywhere beats a code-only match earlier in the list,
/// which in turn beats a name-only match. Tasks in `consumed` are never
/// returned; the caller records the returned id to keep matching one-to-one.
#[must_use]
pub fn find_match<'task>(
    identity: &RowIdentity,
    existing: &'task [Task],
    consumed: &HashSet<TaskId>,
) -> Option<(&'task Task, MatchKind)> {
    let candidates: Vec<(&Task, MatchKind)> = existing
        .iter()
        .filter(|task| !consumed.contains(&task.id()))
        .filter_map(|task| identity.classify(task).map(|kind| (task, kind)))
        .collect();

    [MatchKind::Strong, MatchKind::CodeOnly, MatchKind::NameOnly]
        .into_iter()
        .find_map(|tier| candidates.iter().find(|(_, kind)| *kind == tier).copied())
}
