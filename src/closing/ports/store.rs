//! Persistence port for per-tenant, per-period task collections.

use crate::closing::domain::{Period, Task, TaskId, TenantId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// One atomic group of writes against a period's task collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    /// Tasks to insert or replace by id.
    pub upserts: Vec<Task>,
    /// Ids of tasks to remove.
    pub deletions: Vec<TaskId>,
}

impl WriteBatch {
    /// Returns the number of write operations in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.upserts.len() + self.deletions.len()
    }

    /// Returns `true` when the batch holds no writes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletions.is_empty()
    }

    /// Splits the writes into batches of at most `max_ops` operations,
    /// upserts first so that a failed batch never leaves a period emptier
    /// than before. A `max_ops` of zero is treated as one.
    #[must_use]
    pub fn chunked(self, max_ops: usize) -> Vec<Self> {
        let limit = max_ops.max(1);
        let mut batches = Vec::new();
        let mut current = Self::default();

        for task in self.upserts {
            if current.len() == limit {
                batches.push(std::mem::take(&mut current));
            }
            current.upserts.push(task);
        }
        for id in self.deletions {
            if current.len() == limit {
                batches.push(std::mem::take(&mut current));
            }
            current.deletions.push(id);
        }
        if !current.is_empty() {
            batches.push(current);
        }
        batches
    }
}

/// Task persistence contract.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns every stored task for the tenant and period.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the lookup fails.
    async fn list(&self, tenant: &TenantId, period: Period) -> TaskStoreResult<Vec<Task>>;

    /// Applies one batch of writes atomically.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::BatchTooLarge`] when the batch exceeds the
    /// store's transaction limit, or [`TaskStoreError::Persistence`] when
    /// the write fails.
    async fn apply(&self, tenant: &TenantId, period: Period, batch: WriteBatch)
    -> TaskStoreResult<()>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// The batch exceeds the store's per-transaction write limit.
    #[error("batch of {size} writes exceeds the limit of {limit}")]
    BatchTooLarge {
        /// Requested write count.
        size: usize,
        /// Store limit.
        limit: usize,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
