//! Sync service: fetch a sheet, reconcile it, and persist the result.

use super::reconcile::{ReconcileMode, ReconcileOptions, ReconcileOutcome, reconcile};
use crate::closing::{
    domain::{Period, RawRow, SheetRef, Task, TaskId, TenantId},
    ports::{SourceError, SpreadsheetSource, TaskMirror, TaskStore, TaskStoreError, WriteBatch},
};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Largest write group accepted by the hosted document store.
pub const DEFAULT_BATCH_SIZE: usize = 400;

/// Time allowed for a spreadsheet export to answer.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`SheetSyncService`].
///
/// # Examples
///
/// ```
/// use fechamento::closing::services::SyncConfig;
/// use std::time::Duration;
///
/// let config = SyncConfig::default().with_batch_size(100);
/// assert_eq!(config.batch_size, 100);
/// assert_eq!(config.fetch_timeout, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// Maximum writes per store transaction.
    pub batch_size: usize,
    /// Time allowed for the spreadsheet fetch.
    pub fetch_timeout: Duration,
    /// Reconciliation policy. The request's mode overrides `mode`.
    pub reconcile: ReconcileOptions,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            reconcile: ReconcileOptions::default(),
        }
    }
}

impl SyncConfig {
    /// Sets the maximum writes per store transaction.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the spreadsheet fetch timeout.
    #[must_use]
    pub const fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Sets the reconciliation policy.
    #[must_use]
    pub const fn with_reconcile(mut self, reconcile: ReconcileOptions) -> Self {
        self.reconcile = reconcile;
        self
    }
}

/// Request payload for syncing one period of one tenant from a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    tenant: TenantId,
    period: Period,
    sheet: SheetRef,
    mode: ReconcileMode,
}

impl SyncRequest {
    /// Creates a history-preserving sync request.
    #[must_use]
    pub const fn new(tenant: TenantId, period: Period, sheet: SheetRef) -> Self {
        Self {
            tenant,
            period,
            sheet,
            mode: ReconcileMode::PreserveHistory,
        }
    }

    /// Sets the reconciliation mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: ReconcileMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the tenant.
    #[must_use]
    pub const fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    /// Returns the period.
    #[must_use]
    pub const fn period(&self) -> Period {
        self.period
    }

    /// Returns the sheet reference.
    #[must_use]
    pub const fn sheet(&self) -> &SheetRef {
        &self.sheet
    }

    /// Returns the reconciliation mode.
    #[must_use]
    pub const fn mode(&self) -> ReconcileMode {
        self.mode
    }
}

/// Summary of a completed sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Tasks written, in sheet order.
    pub tasks: Vec<Task>,
    /// Ids removed from the store.
    pub deleted: Vec<TaskId>,
    /// Rows that created a task.
    pub created: usize,
    /// Rows that updated a stored task.
    pub updated: usize,
    /// Rows skipped as batch duplicates.
    pub skipped_duplicates: usize,
    /// Rows dropped for lacking a name.
    pub skipped_nameless: usize,
    /// Store transactions issued.
    pub batches_written: usize,
    /// Whether the read-model mirror accepted the task list.
    pub mirrored: bool,
}

/// Stable error codes for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncErrorCode {
    /// The sheet could not be fetched.
    Transport,
    /// The sheet answered with HTML; it is probably not shared.
    NotTabular,
    /// The fetch did not finish in time.
    Timeout,
    /// The sheet was reachable but held nothing to import.
    EmptyInput,
    /// The store rejected a write or lookup.
    Store,
    /// Another sync for the same tenant and period is in flight.
    AlreadyRunning,
}

impl SyncErrorCode {
    /// Returns the canonical code string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::NotTabular => "not_tabular",
            Self::Timeout => "timeout",
            Self::EmptyInput => "empty_input",
            Self::Store => "store",
            Self::AlreadyRunning => "already_running",
        }
    }
}

/// Service-level errors for sheet sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Spreadsheet transport failed.
    #[error("could not fetch spreadsheet: {0}")]
    Source(#[from] SourceError),

    /// Spreadsheet fetch exceeded the configured timeout.
    #[error("spreadsheet fetch timed out after {0:?}")]
    Timeout(Duration),

    /// The sheet held no row with a resolvable task name.
    #[error("spreadsheet has no importable rows")]
    EmptyInput,

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),

    /// A sync for the same tenant and period is already running.
    #[error("a sync for tenant {tenant} period {period} is already running")]
    AlreadyRunning {
        /// Tenant being synced.
        tenant: TenantId,
        /// Period being synced.
        period: Period,
    },
}

impl SyncError {
    /// Maps the error to its stable code.
    #[must_use]
    pub const fn code(&self) -> SyncErrorCode {
        match self {
            Self::Source(SourceError::NotTabular) => SyncErrorCode::NotTabular,
            Self::Source(_) => SyncErrorCode::Transport,
            Self::Timeout(_) => SyncErrorCode::Timeout,
            Self::EmptyInput => SyncErrorCode::EmptyInput,
            Self::Store(_) => SyncErrorCode::Store,
            Self::AlreadyRunning { .. } => SyncErrorCode::AlreadyRunning,
        }
    }
}

/// Result type for sheet sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

type InFlight = Arc<Mutex<HashSet<(TenantId, Period)>>>;

/// Marks a tenant/period as syncing until dropped.
struct InFlightGuard {
    registry: InFlight,
    key: (TenantId, Period),
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut active = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        active.remove(&self.key);
    }
}

/// Sheet sync orchestration service.
#[derive(Clone)]
pub struct SheetSyncService<S, T, C>
where
    S: SpreadsheetSource,
    T: TaskStore,
    C: Clock + Send + Sync,
{
    source: Arc<S>,
    store: Arc<T>,
    clock: Arc<C>,
    mirror: Option<Arc<dyn TaskMirror>>,
    config: SyncConfig,
    in_flight: InFlight,
}

impl<S, T, C> SheetSyncService<S, T, C>
where
    S: SpreadsheetSource,
    T: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a sync service with the default configuration.
    #[must_use]
    pub fn new(source: Arc<S>, store: Arc<T>, clock: Arc<C>) -> Self {
        Self {
            source,
            store,
            clock,
            mirror: None,
            config: SyncConfig::default(),
            in_flight: Arc::default(),
        }
    }

    /// Replaces the service configuration.
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Publishes every synced task list to `mirror`.
    #[must_use]
    pub fn with_mirror(mut self, mirror: Arc<dyn TaskMirror>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    /// Returns the service configuration.
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Fetches the sheet, reconciles it with the stored tasks and writes the
    /// result in store-sized batches.
    ///
    /// Batches are not one transaction. Upserts are written before
    /// deletions, so a store failure part-way through can leave new tasks
    /// next to stale ones (under a hard reset, both old and new ids) but
    /// never drops stored tasks without their replacements. Re-running the
    /// sync converges.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::AlreadyRunning`] when the same tenant and period
    /// is mid-sync, [`SyncError::Source`] or [`SyncError::Timeout`] when the
    /// fetch fails, [`SyncError::EmptyInput`] when no row names a task, and
    /// [`SyncError::Store`] when reads or writes fail.
    pub async fn sync(&self, request: &SyncRequest) -> SyncResult<SyncReport> {
        let _guard = self.acquire(request)?;
        let outcome = self.plan(request).await?;

        let batch = WriteBatch {
            upserts: outcome.upserts.clone(),
            deletions: outcome.deletions.clone(),
        };
        let mut batches_written = 0;
        for chunk in batch.chunked(self.config.batch_size) {
            self.store
                .apply(request.tenant(), request.period(), chunk)
                .await?;
            batches_written += 1;
        }

        let mirrored = self.publish(request, &outcome.upserts).await;

        info!(
            tenant = %request.tenant(),
            period = %request.period(),
            sheet = %request.sheet(),
            created = outcome.created,
            updated = outcome.updated,
            deleted = outcome.deletions.len(),
            skipped_duplicates = outcome.skipped_duplicates,
            batches_written,
            "sheet sync completed"
        );

        Ok(SyncReport {
            tasks: outcome.upserts,
            deleted: outcome.deletions,
            created: outcome.created,
            updated: outcome.updated,
            skipped_duplicates: outcome.skipped_duplicates,
            skipped_nameless: outcome.skipped_nameless,
            batches_written,
            mirrored,
        })
    }

    /// Fetches and reconciles without writing anything.
    ///
    /// # Errors
    ///
    /// Returns the same fetch, empty-input and store-read errors as
    /// [`Self::sync`].
    pub async fn preview(&self, request: &SyncRequest) -> SyncResult<ReconcileOutcome> {
        self.plan(request).await
    }

    async fn plan(&self, request: &SyncRequest) -> SyncResult<ReconcileOutcome> {
        let rows = self.fetch(request).await?;
        let existing = self
            .store
            .list(request.tenant(), request.period())
            .await?;
        let options = ReconcileOptions {
            mode: request.mode(),
            ..self.config.reconcile
        };

        let outcome = reconcile(&rows, &existing, self.clock.utc(), &options);
        if outcome.upserts.is_empty() {
            return Err(SyncError::EmptyInput);
        }
        Ok(outcome)
    }

    async fn fetch(&self, request: &SyncRequest) -> SyncResult<Vec<RawRow>> {
        let fetched = tokio::time::timeout(
            self.config.fetch_timeout,
            self.source.fetch_rows(request.sheet()),
        )
        .await;

        let rows = match fetched {
            Ok(Ok(rows)) => rows,
            Ok(Err(err)) => {
                warn!(sheet = %request.sheet(), error = %err, "spreadsheet fetch failed");
                return Err(err.into());
            }
            Err(_elapsed) => {
                warn!(sheet = %request.sheet(), timeout = ?self.config.fetch_timeout, "spreadsheet fetch timed out");
                return Err(SyncError::Timeout(self.config.fetch_timeout));
            }
        };

        if rows.iter().all(RawRow::is_blank) {
            return Err(SyncError::EmptyInput);
        }
        Ok(rows)
    }

    async fn publish(&self, request: &SyncRequest, tasks: &[Task]) -> bool {
        let Some(mirror) = &self.mirror else {
            return false;
        };
        match mirror
            .publish(request.tenant(), request.period(), tasks)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(tenant = %request.tenant(), period = %request.period(), error = %err, "task mirror publish failed");
                false
            }
        }
    }

    fn acquire(&self, request: &SyncRequest) -> SyncResult<InFlightGuard> {
        let key = (request.tenant().clone(), request.period());
        let mut active = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !active.insert(key.clone()) {
            warn!(tenant = %request.tenant(), period = %request.period(), "rejecting concurrent sheet sync");
            return Err(SyncError::AlreadyRunning {
                tenant: key.0,
                period: key.1,
            });
        }
        Ok(InFlightGuard {
            registry: Arc::clone(&self.in_flight),
            key,
        })
    }
}
