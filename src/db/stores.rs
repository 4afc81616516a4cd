use async_trait::async_trait;

use crate::db::models::{MapMonitorJobEntry, MapMonitorJobTargetEntry, NewJobTarget, NewMapMonitorJob};

/// Persistence of monitoring jobs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a job and all of its targets atomically: either both are
    /// stored or neither is. `None` means the store produced no job entry.
    async fn create_job(
        &self,
        job: &NewMapMonitorJob,
        targets: &[NewJobTarget],
    ) -> Result<Option<MapMonitorJobEntry>, sqlx::Error>;

    async fn find_job(&self, id: i64) -> Result<Option<MapMonitorJobEntry>, sqlx::Error>;

    /// Connectivity check used by the health endpoints
    async fn ping(&self) -> Result<(), sqlx::Error>;
}

/// Read access to the per-ASIN targets that belong to a job
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TargetStore: Send + Sync {
    async fn find_targets_for_job(&self, job_id: i64) -> Result<Vec<MapMonitorJobTargetEntry>, sqlx::Error>;
}
