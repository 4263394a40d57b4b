//! Port contracts for closing-task reconciliation.
//!
//! Ports define infrastructure-agnostic interfaces used by the sync service.

pub mod mirror;
pub mod source;
pub mod store;

pub use mirror::TaskMirror;
pub use source::{SourceError, SourceResult, SpreadsheetSource};
pub use store::{TaskStore, TaskStoreError, TaskStoreResult, WriteBatch};

#[cfg(test)]
pub use source::MockSpreadsheetSource;
