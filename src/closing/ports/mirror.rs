//! Read-model mirror port for dashboard views.

use super::TaskStoreResult;
use crate::closing::domain::{Period, Task, TenantId};
use async_trait::async_trait;

/// Receives the latest reconciled task list as a flat copy for read-heavy
/// views.
#[async_trait]
pub trait TaskMirror: Send + Sync {
    /// Replaces the mirrored task list for the tenant and period.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskStoreError`] when the mirror rejects the write.
    async fn publish(&self, tenant: &TenantId, period: Period, tasks: &[Task])
    -> TaskStoreResult<()>;
}
