use sqlx::FromRow;

use crate::api::job::models::JobStatus;

/// Job entry ready to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMapMonitorJob {
    pub job_title: String,
    pub status: JobStatus,
    pub candidate_size: i32,
    pub created_by: String,
    pub created_by_user_name: String,
    pub created_vendor_name: Option<String>,
    pub updated_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Persisted monitoring job
#[derive(Debug, Clone, PartialEq)]
pub struct MapMonitorJobEntry {
    pub id: i64,
    pub job_title: String,
    pub status: JobStatus,
    pub candidate_size: i32,
    pub created_by: String,
    pub created_by_user_name: String,
    pub created_vendor_name: Option<String>,
    pub updated_by: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_run_at: Option<i64>,
}

/// Target row to be inserted together with its job; the store links the job id
#[derive(Debug, Clone, PartialEq)]
pub struct NewJobTarget {
    pub asin: String,
    pub map: Option<f64>,
    pub notification_emails: Option<Vec<String>>,
    pub created_by: String,
    pub created_at: i64,
}

/// Persisted target of a monitoring job
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MapMonitorJobTargetEntry {
    pub id: i64,
    pub job_id: i64,
    pub asin: String,
    pub map: Option<f64>,
    pub notification_emails: Option<Vec<String>>,
    pub created_by: String,
    pub created_at: i64,
}

/// Database representation of a job, status kept as its stored text
#[derive(Debug, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub job_title: String,
    pub status: String,
    pub candidate_size: i32,
    pub created_by: String,
    pub created_by_user_name: String,
    pub created_vendor_name: Option<String>,
    pub updated_by: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_run_at: Option<i64>,
}

impl TryFrom<JobRow> for MapMonitorJobEntry {
    type Error = sqlx::Error;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<JobStatus>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(MapMonitorJobEntry {
            id: row.id,
            job_title: row.job_title,
            status,
            candidate_size: row.candidate_size,
            created_by: row.created_by,
            created_by_user_name: row.created_by_user_name,
            created_vendor_name: row.created_vendor_name,
            updated_by: row.updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_run_at: row.last_run_at,
        })
    }
}
