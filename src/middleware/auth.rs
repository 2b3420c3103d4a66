use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};

use crate::config::AuthConfig;
use crate::domain::Role;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::{validate_token, Claims};

/// Extractor for any request carrying a valid bearer access token.
pub struct AuthenticatedUser(pub Claims);

/// Extractor that additionally requires the admin role in the token.
pub struct AdminUser(pub Claims);

fn authenticate(req: &HttpRequest) -> AppResult<Claims> {
    let token = match req.headers().get(AUTHORIZATION) {
        Some(header) => match header.to_str() {
            Ok(value) => match value.strip_prefix("Bearer ") {
                Some(token) if !token.is_empty() => token,
                _ => return Err(AppError::Unauthorized),
            },
            Err(_) => return Err(AppError::Unauthorized),
        },
        None => return Err(AppError::Unauthorized),
    };

    let config = req.app_data::<web::Data<AuthConfig>>().ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!("missing AuthConfig app data"))
    })?;

    validate_token(token, config.get_ref())
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<AppResult<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(AuthenticatedUser))
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<AppResult<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|claims| {
            if claims.roles.contains(&Role::Admin) {
                Ok(AdminUser(claims))
            } else {
                Err(AppError::Forbidden("admin role required".to_string()))
            }
        }))
    }
}
