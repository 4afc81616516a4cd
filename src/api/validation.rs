use actix_multipart::{
    form::{text::TextConfig, MultipartFormConfig},
    MultipartError,
};
use actix_web::{
    error::{InternalError, PayloadError},
    http::StatusCode,
    web, HttpResponse,
};
use tracing::warn;

fn plain_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/plain; charset=utf-8")
        .body(message.to_string())
}

fn plain_bad_request(message: &str) -> HttpResponse {
    plain_response(StatusCode::BAD_REQUEST, message)
}

/// Multipart extraction settings shared by every upload route.
///
/// A body over `total_limit` bytes gets a 413. Other extraction failures
/// (not multipart, broken parts) are answered the same way as a form with
/// missing fields.
pub fn multipart_config(total_limit: usize) -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(total_limit)
        .memory_limit(total_limit)
        .error_handler(move |err, _req| {
            let response = match err {
                MultipartError::Payload(PayloadError::Overflow) => {
                    warn!("Rejected multipart upload over {} bytes", total_limit);
                    plain_response(
                        StatusCode::PAYLOAD_TOO_LARGE,
                        &format!("Uploaded file is too large. The limit is {} bytes.", total_limit),
                    )
                }
                ref other => {
                    warn!("Rejected multipart upload: {}", other);
                    plain_bad_request("Required form fields are missing...")
                }
            };
            InternalError::from_response(err, response).into()
        })
}

/// Browsers send text parts without a content type
pub fn text_config() -> TextConfig {
    TextConfig::default().validate_content_type(false)
}

/// Query string errors as plain-text 400s
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        warn!("Rejected query string: {}", err);
        let message = format!("Invalid query string: {}", err);
        InternalError::from_response(err, plain_bad_request(&message)).into()
    })
}
