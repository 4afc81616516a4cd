use async_trait::async_trait;
use sqlx::{PgConnection, Pool, Postgres};
use tracing::debug;

use crate::db::models::{MapMonitorJobTargetEntry, NewJobTarget};
use crate::db::stores::TargetStore;

/// Postgres rejects statements with more bind parameters than this
const MAX_BIND_PARAMS: usize = 65_535;
const COLUMNS_PER_TARGET: usize = 6;
/// Rows per `INSERT` so a statement stays under the bind parameter limit
pub const TARGETS_PER_STATEMENT: usize = MAX_BIND_PARAMS / COLUMNS_PER_TARGET;

/// PostgreSQL-backed target store
pub struct TargetRepository {
    pool: Pool<Postgres>,
}

impl TargetRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// `INSERT` statement with a `VALUES` tuple for each of `rows` targets
fn insert_statement(rows: usize) -> String {
    let mut query = String::from(
        "INSERT INTO map_monitor_job_targets \
         (job_id, asin, map, notification_emails, created_by, created_at) VALUES ",
    );

    for i in 0..rows {
        if i > 0 {
            query.push_str(", ");
        }
        let base = i * COLUMNS_PER_TARGET;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}, ${})",
            base + 1,
            base + 2,
            base + 3,
            base + 4,
            base + 5,
            base + 6
        ));
    }
    query
}

/// Bulk insert targets of `job_id` on the given connection, usually the job's
/// transaction. Large batches are split into several statements.
pub async fn insert_targets(
    conn: &mut PgConnection,
    job_id: i64,
    targets: &[NewJobTarget],
) -> Result<u64, sqlx::Error> {
    let mut rows_affected = 0;

    for chunk in targets.chunks(TARGETS_PER_STATEMENT) {
        debug!("Inserting {} targets for job id={}", chunk.len(), job_id);

        let query = insert_statement(chunk.len());
        let mut query_builder = sqlx::query(&query);
        for target in chunk {
            query_builder = query_builder
                .bind(job_id)
                .bind(&target.asin)
                .bind(target.map)
                .bind(&target.notification_emails)
                .bind(&target.created_by)
                .bind(target.created_at);
        }

        rows_affected += query_builder.execute(&mut *conn).await?.rows_affected();
    }

    debug!("Bulk insert completed: {} targets inserted", rows_affected);
    Ok(rows_affected)
}

#[async_trait]
impl TargetStore for TargetRepository {
    async fn find_targets_for_job(&self, job_id: i64) -> Result<Vec<MapMonitorJobTargetEntry>, sqlx::Error> {
        sqlx::query_as::<_, MapMonitorJobTargetEntry>(
            r#"
            SELECT id, job_id, asin, map, notification_emails, created_by, created_at
            FROM map_monitor_job_targets
            WHERE job_id = $1
            ORDER BY id
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
    }
}
