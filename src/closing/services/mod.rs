//! Application services for closing-task reconciliation.

mod reconcile;
mod sync;

pub use reconcile::{
    DEFAULT_WALL_CLOCK_OFFSET_SECS, ReconcileMode, ReconcileOptions, ReconcileOutcome, reconcile,
};
pub use sync::{
    DEFAULT_BATCH_SIZE, DEFAULT_FETCH_TIMEOUT, SheetSyncService, SyncConfig, SyncError,
    SyncErrorCode, SyncReport, SyncRequest, SyncResult,
};
