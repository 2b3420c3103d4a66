use std::sync::Arc;
use std::time::Instant;

use actix_web::dev::Service as _;
use actix_web::{middleware::Logger, web, App, HttpServer};
use session_backend::api::routes::{self, AppState};
use session_backend::application::{SessionService, UserDirectory};
use session_backend::config::AppConfig;
use session_backend::infrastructure::db::{migrations::run_migrations, pool::create_pool};
use session_backend::infrastructure::provider::YandexIdentityProvider;
use session_backend::infrastructure::repositories::{
    RefreshTokenRepositoryImpl, UserRepositoryImpl,
};
use session_backend::observability::error_tracking::capture_unexpected_5xx;
use session_backend::observability::AppMetrics;
use session_backend::security::{cors_middleware, security_headers, LoginThrottle};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().expect("failed to load application configuration");
    config
        .validate()
        .expect("invalid application configuration");

    let registry =
        tracing_subscriber::registry().with(EnvFilter::new(config.logging.level.clone()));
    if config.logging.json_format {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .init();
    } else {
        registry.with(fmt::layer()).init();
    }

    let pool = create_pool(&config.database)
        .await
        .expect("failed to create database pool");

    run_migrations(&pool)
        .await
        .expect("database migrations failed");

    let user_repo = Arc::new(UserRepositoryImpl::new(pool.clone()));
    let token_repo = Arc::new(RefreshTokenRepositoryImpl::new(pool.clone()));

    // Cached directory entries live exactly one access-token lifetime.
    let directory = Arc::new(UserDirectory::new(
        user_repo,
        token_repo.clone(),
        config.auth.jwt_expiration_seconds,
    ));

    let identity_provider = Arc::new(
        YandexIdentityProvider::new(&config.provider)
            .expect("failed to build identity provider client"),
    );

    let state = AppState {
        session_service: Arc::new(
            SessionService::new(directory.clone(), token_repo, config.auth.clone())
                .with_identity_provider(identity_provider),
        ),
        user_directory: directory,
        security: config.security.clone(),
        login_throttle: Arc::new(LoginThrottle::new(&config.security)),
        app_environment: config.environment.clone(),
        client_url: config.client_url.clone(),
        metrics: Arc::new(AppMetrics::default()),
        db_pool: Some(pool.clone()),
    };

    let bind_host = config.host.clone();
    let bind_port = config.port;
    let security_config = config.security.clone();
    let auth_config = config.auth.clone();
    let metrics = state.metrics.clone();

    info!(host = %bind_host, port = bind_port, environment = %config.environment, "starting server");

    HttpServer::new(move || {
        let metrics = metrics.clone();
        App::new()
            .wrap(Logger::default())
            .wrap_fn(move |req, srv| {
                let request_id = Uuid::new_v4().to_string();
                let path = req.path().to_string();
                let method = req.method().to_string();
                let metrics = metrics.clone();
                let start = Instant::now();

                let fut = srv.call(req);
                async move {
                    match fut.await {
                        Ok(mut response) => {
                            response.headers_mut().insert(
                                actix_web::http::header::HeaderName::from_static("x-request-id"),
                                actix_web::http::header::HeaderValue::from_str(&request_id)
                                    .unwrap_or_else(|_| {
                                        actix_web::http::header::HeaderValue::from_static(
                                            "invalid-request-id",
                                        )
                                    }),
                            );

                            let status = response.status().as_u16();
                            let latency_ms = start.elapsed().as_millis() as u64;
                            metrics.record_request(status, latency_ms);

                            info!(
                                request_id = %request_id,
                                method = %method,
                                path = %path,
                                status = status,
                                latency_ms = latency_ms,
                                "request completed"
                            );

                            if status >= 500 {
                                let _ = capture_unexpected_5xx(&path, &method, status, &request_id);
                            }
                            Ok(response)
                        }
                        Err(error) => Err(error),
                    }
                }
            })
            .wrap(cors_middleware(&security_config))
            .wrap(security_headers())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(auth_config.clone()))
            .configure(routes::configure)
    })
    .bind((bind_host, bind_port))?
    .run()
    .await
}
