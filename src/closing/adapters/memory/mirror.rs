//! In-memory read-model mirror.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::closing::{
    domain::{Period, Task, TenantId},
    ports::{TaskMirror, TaskStoreError, TaskStoreResult},
};

/// Keeps the latest published task list per tenant and period as a flat
/// JSON array, the shape realtime dashboards read.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskMirror {
    snapshots: Arc<RwLock<HashMap<(TenantId, Period), Value>>>,
}

impl InMemoryTaskMirror {
    /// Creates an empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last published snapshot for the tenant and period.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the lock is poisoned.
    pub fn snapshot(&self, tenant: &TenantId, period: Period) -> TaskStoreResult<Option<Value>> {
        let snapshots = self.snapshots.read().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(snapshots.get(&(tenant.clone(), period)).cloned())
    }
}

#[async_trait]
impl TaskMirror for InMemoryTaskMirror {
    async fn publish(
        &self,
        tenant: &TenantId,
        period: Period,
        tasks: &[Task],
    ) -> TaskStoreResult<()> {
        let snapshot = serde_json::to_value(tasks).map_err(TaskStoreError::persistence)?;
        let mut snapshots = self.snapshots.write().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        snapshots.insert((tenant.clone(), period), snapshot);
        Ok(())
    }
}
