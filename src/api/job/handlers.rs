use actix_cors::Cors;
use actix_multipart::form::{bytes::Bytes, text::Text, MultipartForm};
use actix_web::{
    get,
    web::{self, Data, Path, ServiceConfig},
    HttpResponse,
};
use tracing::info;

use super::dto::CreateResponseDto;
use super::service::{MonitorJobService, ServiceError};

/// Multipart body of a job upload. Every part is optional here so that a
/// missing part is answered with our own 400 instead of an extractor error.
#[derive(MultipartForm)]
pub struct UploadForm {
    pub file: Option<Bytes>,
    #[multipart(rename = "jobTitle")]
    pub job_title: Option<Text<String>>,
    pub token: Option<Text<String>>,
}

fn non_blank(field: Option<Text<String>>) -> Option<String> {
    field.map(Text::into_inner).filter(|value| !value.trim().is_empty())
}

async fn upload_job_sheet(
    service: Data<MonitorJobService>,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> Result<HttpResponse, ServiceError> {
    let job_title = non_blank(form.job_title);
    let token = non_blank(form.token);
    let file = form.file.filter(|file| !file.data.is_empty());

    let (Some(job_title), Some(token), Some(file)) = (job_title, token, file) else {
        return Err(ServiceError::MissingFormFields);
    };

    info!(
        "Received job upload: title={}, file={}, size={} bytes",
        job_title,
        file.file_name.as_deref().unwrap_or("<unnamed>"),
        file.data.len()
    );

    let job = service.create_job(&job_title, &file.data, &token).await?;

    info!("Job created successfully with id={}", job.id);
    Ok(HttpResponse::Created().json(CreateResponseDto::from(job)))
}

#[get("/mapmonitorjobs/{id}")]
async fn get_job(
    service: Data<MonitorJobService>,
    path: Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let job = service.find_job(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// Uploads may come from any origin
fn upload_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_any_header()
}

pub fn job_config(config: &mut ServiceConfig) {
    config
        .service(
            web::resource("/mapmonitorjobs")
                .wrap(upload_cors())
                .route(web::post().to(upload_job_sheet)),
        )
        .service(get_job);
}
