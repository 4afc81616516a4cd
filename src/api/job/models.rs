use std::fmt;
use std::str::FromStr;

use validator::{Validate, ValidationError};

/// Required length of a trimmed ASIN
pub const ASIN_LENGTH: usize = 10;

/// Job status enum representing the state of a monitoring job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Ready,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Ready => "ready",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Name shown to API clients
    pub fn display_name(&self) -> &'static str {
        match self {
            JobStatus::Ready => "Ready",
            JobStatus::Running => "Running",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
        }
    }
}

#[derive(Debug)]
pub struct UnknownJobStatus(String);

impl fmt::Display for UnknownJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown job status: {}", self.0)
    }
}

impl std::error::Error for UnknownJobStatus {}

impl FromStr for JobStatus {
    type Err = UnknownJobStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready" => Ok(JobStatus::Ready),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(UnknownJobStatus(other.to_string())),
        }
    }
}

/// One data row of the uploaded sheet, as read from its cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    pub asin: Option<String>,
    pub map: Option<f64>,
    pub target_emails: Option<String>,
}

/// A row that carries an ASIN and takes part in the job
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct MapInput {
    #[validate(custom(function = "validate_asin"))]
    pub input: String,
    pub map: Option<f64>,
    pub email_target: Option<String>,
}

impl MapInput {
    /// Rows without a (non-blank) ASIN are not inputs
    pub fn from_row(row: SheetRow) -> Option<Self> {
        let asin = row.asin.filter(|a| !a.trim().is_empty())?;
        Some(MapInput {
            input: asin,
            map: row.map,
            email_target: row.target_emails,
        })
    }

    /// Notification emails split on commas; empty pieces are dropped, order is kept.
    pub fn notification_emails(&self) -> Option<Vec<String>> {
        let raw = self.email_target.as_deref().filter(|e| !e.trim().is_empty())?;
        Some(
            raw.split(',')
                .filter(|piece| !piece.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

fn validate_asin(asin: &str) -> Result<(), ValidationError> {
    if asin.trim().chars().count() != ASIN_LENGTH {
        let mut err = ValidationError::new("asin_length");
        err.message = Some(format!("ASIN must be exactly {} characters", ASIN_LENGTH).into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(asin: &str, emails: Option<&str>) -> MapInput {
        MapInput {
            input: asin.to_string(),
            map: None,
            email_target: emails.map(str::to_string),
        }
    }

    #[test]
    fn status_round_trips_through_storage_text() {
        for status in [JobStatus::Ready, JobStatus::Running, JobStatus::Completed, JobStatus::Failed] {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
        assert_eq!(JobStatus::Ready.display_name(), "Ready");
        assert!("READY".parse::<JobStatus>().is_err());
    }

    #[test]
    fn asin_length_is_checked_after_trim() {
        assert!(input("B000000001", None).validate().is_ok());
        assert!(input("  B000000001 ", None).validate().is_ok());
        assert!(input("B00000001", None).validate().is_err());
        assert!(input("B0000000011", None).validate().is_err());
    }

    #[test]
    fn blank_asin_rows_are_not_inputs() {
        let blank = SheetRow {
            asin: Some("   ".to_string()),
            map: Some(9.99),
            target_emails: None,
        };
        assert!(MapInput::from_row(blank).is_none());
        assert!(MapInput::from_row(SheetRow::default()).is_none());
    }

    #[test]
    fn from_row_keeps_asin_as_written() {
        let row = SheetRow {
            asin: Some(" B000000001".to_string()),
            map: Some(4.5),
            target_emails: Some("a@x.com".to_string()),
        };
        let parsed = MapInput::from_row(row).unwrap();
        assert_eq!(parsed.input, " B000000001");
        assert_eq!(parsed.map, Some(4.5));
    }

    #[test]
    fn emails_split_literally_on_commas() {
        let emails = input("B000000001", Some("a@x.com, b@x.com,,a@x.com,"))
            .notification_emails()
            .unwrap();
        assert_eq!(emails, vec!["a@x.com", " b@x.com", "a@x.com"]);
    }

    #[test]
    fn blank_email_field_yields_no_list() {
        assert_eq!(input("B000000001", Some("  ")).notification_emails(), None);
        assert_eq!(input("B000000001", None).notification_emails(), None);
    }
}
