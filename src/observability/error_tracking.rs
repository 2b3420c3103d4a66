use crate::error::{AppError, AppResult};
use tracing::error;
use uuid::Uuid;

/// Emits a correlatable error-tracking event for an unexpected 5xx response.
/// The event id ties the structured log line to the request id already on
/// the response.
pub fn capture_unexpected_5xx(
    path: &str,
    method: &str,
    status: u16,
    request_id: &str,
) -> AppResult<Uuid> {
    if status < 500 {
        return Err(AppError::BadRequest(
            "capture_unexpected_5xx requires an HTTP 5xx status".to_string(),
        ));
    }

    let event_id = Uuid::new_v4();
    error!(
        tracking_backend = "log",
        event_id = %event_id,
        request_id = %request_id,
        method = %method,
        path = %path,
        status = status,
        "error-tracking capture for unexpected 5xx"
    );
    Ok(event_id)
}
