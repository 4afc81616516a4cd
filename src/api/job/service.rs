use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};
use validator::Validate;

use crate::auth::{IdentityResolver, TokenUserInfo};
use crate::db::models::{NewJobTarget, NewMapMonitorJob};
use crate::db::stores::{JobStore, TargetStore};
use super::dto::MapMonitorJobDto;
use super::models::{JobStatus, MapInput};
use super::sheet;

const NOTHING_TO_PROCESS: &str = "There is no ASINs/URLs to process.";

/// Service-level errors
#[derive(Debug)]
pub enum ServiceError {
    /// File, title or token absent/blank, or the file is empty
    MissingFormFields,

    /// The upload content was rejected
    InvalidInput(String),

    /// No user identity could be resolved from the token
    Unauthorized,

    /// The upload could not be read as a workbook
    FileProcessing(String),

    /// The store produced no job entry
    JobNotCreated,

    /// Database operation failed
    DatabaseError(sqlx::Error),

    /// Job not found
    NotFound(i64),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::MissingFormFields => write!(f, "Required form fields are missing..."),
            ServiceError::InvalidInput(msg) => write!(f, "{}", msg),
            ServiceError::Unauthorized => {
                write!(f, "Unauthorized.. No user data available in request.")
            }
            ServiceError::FileProcessing(_) => {
                write!(f, "Failed process the input file. Please try again.")
            }
            ServiceError::JobNotCreated | ServiceError::DatabaseError(_) => {
                write!(f, "failed to create job.. try again ")
            }
            ServiceError::NotFound(id) => write!(f, "Job with id {} not found", id),
        }
    }
}

impl std::error::Error for ServiceError {}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::MissingFormFields | ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::FileProcessing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::JobNotCreated | ServiceError::DatabaseError(_) => {
                StatusCode::PRECONDITION_FAILED
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::DatabaseError(e) => error!("Database error: {}", e),
            ServiceError::JobNotCreated => {
                error!("Failed to create the map monitor job entry: store returned no entry")
            }
            ServiceError::FileProcessing(cause) => error!("Failed to process the input file: {}", cause),
            other => warn!("Rejected request: {}", other),
        }

        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}

/// Upload and lookup of map monitoring jobs
pub struct MonitorJobService {
    jobs: Arc<dyn JobStore>,
    targets: Arc<dyn TargetStore>,
    identity: Arc<dyn IdentityResolver>,
}

impl MonitorJobService {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        targets: Arc<dyn TargetStore>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            jobs,
            targets,
            identity,
        }
    }

    /// Create a monitoring job from an uploaded sheet
    ///
    /// # Business Logic
    /// - Parses the sheet; any unparseable row rejects the whole batch
    /// - Validates every ASIN; one bad ASIN rejects the whole batch
    /// - Resolves the requesting user from the token
    /// - Persists the job and one target per input row in a single unit
    ///
    /// # Returns
    /// - `Ok(MapMonitorJobDto)` - Job created
    /// - `Err(ServiceError)` - Nothing was created
    pub async fn create_job(
        &self,
        job_title: &str,
        file: &[u8],
        token: &str,
    ) -> Result<MapMonitorJobDto, ServiceError> {
        let inputs = self.read_inputs(file)?;

        let user = self.identity.resolve(token).ok_or_else(|| {
            info!("Service: Failed to get user info from upload token");
            ServiceError::Unauthorized
        })?;

        info!(
            "Service: Creating map monitor job title={}, candidates={}, user={}",
            job_title,
            inputs.len(),
            user.user_id
        );

        let now = chrono::Utc::now().timestamp();
        let new_job = build_job_entry(job_title, &inputs, &user, now)?;
        let targets = build_targets(&inputs, &user, now);

        let created = self
            .jobs
            .create_job(&new_job, &targets)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or(ServiceError::JobNotCreated)?;

        info!("Service: Saved job id={} with {} targets", created.id, targets.len());
        Ok(MapMonitorJobDto::from_entry(&created, &[]))
    }

    /// Look up a job together with its targets
    pub async fn find_job(&self, id: i64) -> Result<MapMonitorJobDto, ServiceError> {
        let job = self
            .jobs
            .find_job(id)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or(ServiceError::NotFound(id))?;

        let targets = self
            .targets
            .find_targets_for_job(id)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(MapMonitorJobDto::from_entry(&job, &targets))
    }

    /// Whether the job store answers
    pub async fn store_healthy(&self) -> Result<(), sqlx::Error> {
        self.jobs.ping().await
    }

    fn read_inputs(&self, file: &[u8]) -> Result<Vec<MapInput>, ServiceError> {
        let parse = sheet::parse_sheet(file).map_err(|e| ServiceError::FileProcessing(e.to_string()))?;

        if parse.has_errors() {
            return Err(ServiceError::InvalidInput(
                "Failed to parse some entries in the input file. Please try again.".to_string(),
            ));
        }

        if parse.rows.is_empty() {
            return Err(ServiceError::InvalidInput(NOTHING_TO_PROCESS.to_string()));
        }

        let mut inputs = Vec::with_capacity(parse.rows.len());
        for input in parse.rows.into_iter().filter_map(MapInput::from_row) {
            if input.validate().is_err() {
                warn!("Service: Invalid ASIN in upload: '{}'", input.input);
                return Err(ServiceError::InvalidInput(
                    "Invalid ASIN specified in the input list.".to_string(),
                ));
            }
            inputs.push(input);
        }

        if inputs.is_empty() {
            return Err(ServiceError::InvalidInput(NOTHING_TO_PROCESS.to_string()));
        }

        Ok(inputs)
    }
}

fn candidate_count(inputs: usize) -> Result<i32, ServiceError> {
    i32::try_from(inputs).map_err(|_| {
        ServiceError::InvalidInput(format!("Too many ASINs in the input list: {}", inputs))
    })
}

fn build_job_entry(
    job_title: &str,
    inputs: &[MapInput],
    user: &TokenUserInfo,
    now: i64,
) -> Result<NewMapMonitorJob, ServiceError> {
    Ok(NewMapMonitorJob {
        job_title: job_title.to_string(),
        status: JobStatus::Ready,
        candidate_size: candidate_count(inputs.len())?,
        created_by: user.user_id.clone(),
        created_by_user_name: user.display_name(),
        created_vendor_name: user.vendor_name.clone(),
        updated_by: user.user_id.clone(),
        created_at: now,
        updated_at: now,
    })
}

fn build_targets(inputs: &[MapInput], user: &TokenUserInfo, now: i64) -> Vec<NewJobTarget> {
    inputs
        .iter()
        .map(|input| NewJobTarget {
            asin: input.input.clone(),
            map: input.map,
            notification_emails: input.notification_emails(),
            created_by: user.user_id.clone(),
            created_at: now,
        })
        .collect()
}
