use serde::Serialize;

use crate::db::models::{MapMonitorJobEntry, MapMonitorJobTargetEntry};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorDto {
    pub id: String,
    pub name: Option<String>,
}

/// One monitored ASIN inside a job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapJobCandidateDto {
    pub id: String,
    pub asin: String,
    pub emails: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
}

impl From<&MapMonitorJobTargetEntry> for MapJobCandidateDto {
    fn from(target: &MapMonitorJobTargetEntry) -> Self {
        Self {
            id: target.id.to_string(),
            asin: target.asin.clone(),
            emails: target.notification_emails.clone(),
            map: target.map.map(|map| format!("${}", map)),
        }
    }
}

/// Full view of a monitoring job
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMonitorJobDto {
    pub id: String,
    pub title: String,
    pub vendor: VendorDto,
    pub status: String,
    pub created_at: i64,
    pub created_by: String,
    pub last_run_at: Option<i64>,
    pub candidate_size: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<MapJobCandidateDto>>,
}

impl MapMonitorJobDto {
    pub fn from_entry(entry: &MapMonitorJobEntry, candidates: &[MapMonitorJobTargetEntry]) -> Self {
        Self {
            id: entry.id.to_string(),
            title: entry.job_title.clone(),
            vendor: VendorDto {
                id: entry.created_by.clone(),
                name: entry.created_vendor_name.clone(),
            },
            status: entry.status.display_name().to_string(),
            created_at: entry.created_at,
            created_by: entry.created_by_user_name.clone(),
            last_run_at: entry.last_run_at,
            candidate_size: entry.candidate_size,
            candidates: (!candidates.is_empty())
                .then(|| candidates.iter().map(MapJobCandidateDto::from).collect()),
        }
    }
}

/// Response for a created job
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponseDto {
    pub id: String,
    pub title: String,
    pub vendor: VendorDto,
    pub status: String,
    pub created_at: i64,
    pub created_by: String,
    pub candidate_size: i32,
}

impl From<MapMonitorJobDto> for CreateResponseDto {
    fn from(job: MapMonitorJobDto) -> Self {
        Self {
            id: job.id,
            title: job.title,
            vendor: job.vendor,
            status: job.status,
            created_at: job.created_at,
            created_by: job.created_by,
            candidate_size: job.candidate_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::job::models::JobStatus;
    use serde_json::json;

    fn entry() -> MapMonitorJobEntry {
        MapMonitorJobEntry {
            id: 12,
            job_title: "holiday MAP sweep".to_string(),
            status: JobStatus::Ready,
            candidate_size: 2,
            created_by: "u-42".to_string(),
            created_by_user_name: "Ada Lovelace".to_string(),
            created_vendor_name: Some("Acme".to_string()),
            updated_by: "u-42".to_string(),
            created_at: 1_760_000_000,
            updated_at: 1_760_000_000,
            last_run_at: None,
        }
    }

    #[test]
    fn create_response_serializes_camel_case() {
        let dto = CreateResponseDto::from(MapMonitorJobDto::from_entry(&entry(), &[]));

        assert_eq!(
            serde_json::to_value(&dto).unwrap(),
            json!({
                "id": "12",
                "title": "holiday MAP sweep",
                "vendor": { "id": "u-42", "name": "Acme" },
                "status": "Ready",
                "createdAt": 1_760_000_000i64,
                "createdBy": "Ada Lovelace",
                "candidateSize": 2,
            })
        );
    }

    #[test]
    fn candidates_render_map_with_dollar_sign() {
        let targets = vec![
            MapMonitorJobTargetEntry {
                id: 1,
                job_id: 12,
                asin: "B000000001".to_string(),
                map: Some(19.99),
                notification_emails: Some(vec!["a@x.com".to_string()]),
                created_by: "u-42".to_string(),
                created_at: 1_760_000_000,
            },
            MapMonitorJobTargetEntry {
                id: 2,
                job_id: 12,
                asin: "B000000002".to_string(),
                map: None,
                notification_emails: None,
                created_by: "u-42".to_string(),
                created_at: 1_760_000_000,
            },
        ];

        let dto = MapMonitorJobDto::from_entry(&entry(), &targets);
        let candidates = dto.candidates.unwrap();
        assert_eq!(candidates[0].map.as_deref(), Some("$19.99"));
        assert_eq!(candidates[0].id, "1");
        assert_eq!(candidates[1].map, None);
    }

    #[test]
    fn no_candidates_are_omitted() {
        let value = serde_json::to_value(MapMonitorJobDto::from_entry(&entry(), &[])).unwrap();
        assert!(value.get("candidates").is_none());
        assert_eq!(value["lastRunAt"], serde_json::Value::Null);
    }
}
