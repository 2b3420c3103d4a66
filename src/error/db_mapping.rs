use super::app_error::AppError;

pub(super) fn map_database_error(
    code: Option<&str>,
    constraint: Option<&str>,
    message: &str,
) -> Option<AppError> {
    match code {
        Some("23505") => Some(AppError::Conflict(
            conflict_message_from_constraint(constraint).to_string(),
        )),
        Some("23502") => Some(AppError::validation_error(
            required_field_message_from_db(message)
                .unwrap_or_else(|| "required field is missing".to_string()),
        )),
        Some("23503") => Some(AppError::BadRequest(
            "referenced resource does not exist".to_string(),
        )),
        Some("23514") => Some(AppError::validation_error(
            "request violates validation rules",
        )),
        Some("22P02") => Some(AppError::validation_error("invalid input format")),
        Some("08001") | Some("08006") => Some(AppError::ServiceUnavailable {
            service: "database".to_string(),
            message: "Unable to connect to database. Please try again later.".to_string(),
        }),
        Some("53300") => Some(AppError::ServiceUnavailable {
            service: "database".to_string(),
            message: "Service temporarily unavailable. Please try again later.".to_string(),
        }),
        Some("55P03") => Some(AppError::Conflict(
            "Resource is currently locked. Please try again.".to_string(),
        )),
        Some("P0001") => {
            let error_msg =
                extract_raise_exception_message(message).unwrap_or("Database validation error");
            Some(AppError::validation_error(error_msg))
        }
        _ => None,
    }
}

pub(super) fn conflict_message_from_constraint(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_email_key") => "email already registered",
        Some("users_pkey") => "user already exists",
        Some("refresh_tokens_pkey") => "refresh token already exists",
        Some("refresh_tokens_user_id_user_agent_key") => "session already exists for this device",
        _ => "resource already exists",
    }
}

pub(super) fn required_field_message_from_db(message: &str) -> Option<String> {
    let marker = "column \"";
    let start = message.find(marker)?;
    let rest = &message[start + marker.len()..];
    let end = rest.find('"')?;
    let field = &rest[..end];
    Some(format!("{field} is required"))
}

pub(super) fn extract_raise_exception_message(message: &str) -> Option<&str> {
    if message.contains("RAISE EXCEPTION") || message.starts_with("ERROR:") {
        if let Some(colon_pos) = message.find(':') {
            let msg = message[colon_pos + 1..].trim();
            if !msg.is_empty() {
                return Some(msg);
            }
        }
    }
    let msg = message.trim();
    if msg.is_empty() {
        None
    } else {
        Some(msg)
    }
}
