use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::api::dtos::{DeleteUserResponse, UpsertUserRequest, UserResponse};
use crate::api::routes::AppState;
use crate::application::UpsertUser;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AdminUser;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("", web::put().to(upsert_user))
            .route("/{id_or_email}", web::get().to(get_user))
            .route("/{id}", web::delete().to(delete_user)),
    );
}

async fn list_users(state: web::Data<AppState>, _auth: AdminUser) -> AppResult<HttpResponse> {
    let users = state.user_directory.list().await?;
    let result: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(result))
}

async fn upsert_user(
    state: web::Data<AppState>,
    _auth: AdminUser,
    payload: web::Json<UpsertUserRequest>,
) -> AppResult<HttpResponse> {
    payload.validate()?;
    let request = payload.into_inner();

    let user = state
        .user_directory
        .upsert(UpsertUser {
            email: request.email,
            password: request.password,
            provider: request.provider,
            roles: request.roles,
        })
        .await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

async fn get_user(
    state: web::Data<AppState>,
    _auth: AdminUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user = state
        .user_directory
        .find(&path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

async fn delete_user(
    state: web::Data<AppState>,
    _auth: AdminUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = state.user_directory.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(DeleteUserResponse { id }))
}
