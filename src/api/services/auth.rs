//! 注册与登录

use actix_web::web;
use tracing::info;

use crate::services::AppServices;

use super::helpers::{ApiResult, created_response, success_response};
use super::types::{LoginRequest, LoginResponse, RegisterRequest};

/// POST /auth/register
pub async fn register(
    services: web::Data<AppServices>,
    body: web::Json<RegisterRequest>,
) -> ApiResult {
    let body = body.into_inner();
    let user = services
        .users
        .register(&body.email, &body.username, &body.password)
        .await?;
    Ok(created_response(user))
}

/// POST /auth/login
pub async fn login(services: web::Data<AppServices>, body: web::Json<LoginRequest>) -> ApiResult {
    let (user, access_token) = services.users.login(&body.login, &body.password).await?;
    info!("Issued access token for user {}", user.id);

    Ok(success_response(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: services.jwt.access_token_minutes() * 60,
        user,
    }))
}

pub fn auth_routes() -> actix_web::Scope {
    web::scope("/auth")
        .route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
}
