use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::debug;

use crate::db::models::{JobRow, MapMonitorJobEntry, NewJobTarget, NewMapMonitorJob};
use crate::db::stores::JobStore;
use crate::db::target_repository::insert_targets;

/// PostgreSQL-backed job store
pub struct JobRepository {
    pool: Pool<Postgres>,
}

impl JobRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for JobRepository {
    /// Create a new job and its targets in one transaction and return the job record
    async fn create_job(
        &self,
        job: &NewMapMonitorJob,
        targets: &[NewJobTarget],
    ) -> Result<Option<MapMonitorJobEntry>, sqlx::Error> {
        debug!(
            "Creating map monitor job: title={}, candidates={}, status={}",
            job.job_title,
            job.candidate_size,
            job.status.as_str()
        );

        // Dropping the transaction on an early return rolls both inserts back
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO map_monitor_jobs (
                job_title, status, candidate_size, created_by, created_by_user_name,
                created_vendor_name, updated_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, job_title, status, candidate_size, created_by, created_by_user_name,
                      created_vendor_name, updated_by, created_at, updated_at, last_run_at
            "#,
        )
        .bind(&job.job_title)
        .bind(job.status.as_str())
        .bind(job.candidate_size)
        .bind(&job.created_by)
        .bind(&job.created_by_user_name)
        .bind(&job.created_vendor_name)
        .bind(&job.updated_by)
        .bind(job.created_at)
        .bind(job.updated_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let entry = MapMonitorJobEntry::try_from(row)?;

        let saved = insert_targets(&mut tx, entry.id, targets).await?;
        tx.commit().await?;

        debug!("Job created with id={} and {} targets", entry.id, saved);
        Ok(Some(entry))
    }

    async fn find_job(&self, id: i64) -> Result<Option<MapMonitorJobEntry>, sqlx::Error> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, job_title, status, candidate_size, created_by, created_by_user_name,
                   created_vendor_name, updated_by, created_at, updated_at, last_run_at
            FROM map_monitor_jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MapMonitorJobEntry::try_from).transpose()
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
