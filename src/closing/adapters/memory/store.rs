//! In-memory task store.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::closing::{
    domain::{Period, Task, TaskId, TenantId},
    ports::{TaskStore, TaskStoreError, TaskStoreResult, WriteBatch},
};

type Scope = (TenantId, Period);

/// Thread-safe in-memory task store.
///
/// Tasks are kept per tenant and period, listed in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryStoreState>>,
    batch_limit: Option<usize>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    collections: HashMap<Scope, ScopedTasks>,
    next_position: u64,
    applied_batches: usize,
}

/// One tenant/period collection, ordered by first insertion.
#[derive(Debug, Default)]
struct ScopedTasks {
    tasks: BTreeMap<u64, Task>,
    positions: HashMap<TaskId, u64>,
}

impl InMemoryTaskStore {
    /// Creates an empty store without a batch limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects batches larger than `limit`, like a hosted store's
    /// transaction cap.
    #[must_use]
    pub const fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = Some(limit);
        self
    }

    /// Returns how many batches have been applied.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the lock is poisoned.
    pub fn applied_batches(&self) -> TaskStoreResult<usize> {
        let state = self.state.read().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.applied_batches)
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list(&self, tenant: &TenantId, period: Period) -> TaskStoreResult<Vec<Task>> {
        let state = self.state.read().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let tasks = state
            .collections
            .get(&(tenant.clone(), period))
            .map(|collection| collection.tasks.values().cloned().collect())
            .unwrap_or_default();
        Ok(tasks)
    }

    async fn apply(
        &self,
        tenant: &TenantId,
        period: Period,
        batch: WriteBatch,
    ) -> TaskStoreResult<()> {
        if let Some(limit) = self.batch_limit.filter(|limit| batch.len() > *limit) {
            return Err(TaskStoreError::BatchTooLarge {
                size: batch.len(),
                limit,
            });
        }

        let mut state = self.state.write().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let InMemoryStoreState {
            collections,
            next_position,
            applied_batches,
        } = &mut *state;
        let ScopedTasks { tasks, positions } =
            collections.entry((tenant.clone(), period)).or_default();

        for task in batch.upserts {
            let position = *positions.entry(task.id()).or_insert_with(|| {
                *next_position += 1;
                *next_position
            });
            tasks.insert(position, task);
        }
        for id in batch.deletions {
            if let Some(position) = positions.remove(&id) {
                tasks.remove(&position);
            }
        }
        *applied_batches += 1;
        Ok(())
    }
}
