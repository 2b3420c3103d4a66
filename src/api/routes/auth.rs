use actix_web::cookie::time::OffsetDateTime;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header::LOCATION;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};

use crate::api::dtos::{
    AccessTokenResponse, LoginRequest, ProviderTokenQuery, RegisterRequest, UserResponse,
};
use crate::api::routes::AppState;
use crate::application::TokenPair;
use crate::domain::Provider;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::middleware::request_logging::{client_ip, user_agent};
use crate::security::LoginThrottle;

/// Cookie carrying the raw refresh token. HttpOnly keeps it out of script
/// reach; the store only ever sees its digest.
pub const REFRESH_COOKIE: &str = "refreshtoken";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/refresh-tokens", web::get().to(refresh_tokens))
            .route("/logout", web::get().to(logout))
            .route("/yandex/callback", web::get().to(yandex_callback))
            .route("/success-yandex", web::get().to(success_yandex))
            .route("/me", web::get().to(me)),
    );
}

async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let user = state.session_service.register(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
    request: HttpRequest,
) -> AppResult<HttpResponse> {
    let ip = client_ip(&request);
    let key = LoginThrottle::key(&payload.email, ip.as_deref());
    state.login_throttle.ensure_allowed(&key)?;

    let agent = user_agent(&request);
    match state
        .session_service
        .login(payload.into_inner(), &agent)
        .await
    {
        Ok(pair) => {
            state.login_throttle.record_success(&key);
            state.metrics.record_session_issued();
            Ok(created_with_tokens(&pair, &state.app_environment))
        }
        Err(AppError::Unauthorized) => {
            state.metrics.record_auth_failure();
            Err(state.login_throttle.record_failure(&key))
        }
        Err(error) => Err(error),
    }
}

async fn refresh_tokens(
    state: web::Data<AppState>,
    request: HttpRequest,
) -> AppResult<HttpResponse> {
    let Some(cookie) = request.cookie(REFRESH_COOKIE) else {
        state.metrics.record_auth_failure();
        return Err(AppError::Unauthorized);
    };

    let agent = user_agent(&request);
    match state
        .session_service
        .refresh_tokens(cookie.value(), &agent)
        .await
    {
        Ok(pair) => {
            state.metrics.record_session_issued();
            Ok(created_with_tokens(&pair, &state.app_environment))
        }
        Err(error) => {
            if matches!(error, AppError::Unauthorized) {
                state.metrics.record_auth_failure();
            }
            Err(error)
        }
    }
}

async fn logout(state: web::Data<AppState>, request: HttpRequest) -> AppResult<HttpResponse> {
    // No cookie means nothing to revoke; logout stays idempotent.
    if let Some(cookie) = request.cookie(REFRESH_COOKIE) {
        state.session_service.logout(cookie.value()).await?;
    }

    Ok(HttpResponse::Ok()
        .cookie(expired_refresh_cookie(&state.app_environment))
        .finish())
}

/// Provider redirect target. Issues a session from the provider token and
/// forwards the browser to the web client's success page.
async fn yandex_callback(
    state: web::Data<AppState>,
    query: web::Query<ProviderTokenQuery>,
    request: HttpRequest,
) -> AppResult<HttpResponse> {
    let agent = user_agent(&request);
    let pair = state
        .session_service
        .provider_login(Provider::Yandex, &query.token, &agent)
        .await?;
    state.metrics.record_session_issued();

    let target = format!(
        "{}/auth/success-yandex?token={}",
        state.client_url, pair.access_token
    );
    Ok(HttpResponse::Found()
        .append_header((LOCATION, target))
        .cookie(refresh_cookie(
            &pair.refresh_token,
            pair.refresh_expires_at,
            &state.app_environment,
        ))
        .finish())
}

/// Direct provider entry for clients that already hold a provider token.
async fn success_yandex(
    state: web::Data<AppState>,
    query: web::Query<ProviderTokenQuery>,
    request: HttpRequest,
) -> AppResult<HttpResponse> {
    let agent = user_agent(&request);
    let pair = state
        .session_service
        .provider_login(Provider::Yandex, &query.token, &agent)
        .await?;
    state.metrics.record_session_issued();
    Ok(created_with_tokens(&pair, &state.app_environment))
}

async fn me(state: web::Data<AppState>, auth: AuthenticatedUser) -> AppResult<HttpResponse> {
    let user = state
        .user_directory
        .find_by_id(auth.0.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

fn created_with_tokens(pair: &TokenPair, environment: &str) -> HttpResponse {
    HttpResponse::Created()
        .cookie(refresh_cookie(
            &pair.refresh_token,
            pair.refresh_expires_at,
            environment,
        ))
        .json(AccessTokenResponse {
            access_token: pair.access_token.clone(),
        })
}

/// Cross-site clients need SameSite=None; in production the web client is
/// served from the same site and Lax suffices.
fn same_site_for(environment: &str) -> SameSite {
    if environment == "production" {
        SameSite::Lax
    } else {
        SameSite::None
    }
}

fn refresh_cookie(token: &str, expires_at: DateTime<Utc>, environment: &str) -> Cookie<'static> {
    let expiry = OffsetDateTime::from_unix_timestamp(expires_at.timestamp())
        .unwrap_or_else(|_| OffsetDateTime::now_utc() + actix_web::cookie::time::Duration::days(1));

    Cookie::build(REFRESH_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(same_site_for(environment))
        .expires(expiry)
        .finish()
}

fn expired_refresh_cookie(environment: &str) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(same_site_for(environment))
        .expires(OffsetDateTime::UNIX_EPOCH)
        .finish()
}
