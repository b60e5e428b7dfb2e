//! 终端会话接口，全部要求登录

use actix_web::{HttpResponse, web};

use crate::api::middleware::RequiredUser;
use crate::services::AppServices;

use super::helpers::{ApiResult, created_response, success_response};
use super::types::{CreateSessionRequest, ExecuteCommandRequest};

/// POST /terminal/sessions
///
/// 请求体可省略
pub async fn create_session(
    services: web::Data<AppServices>,
    user: RequiredUser,
    body: Option<web::Json<CreateSessionRequest>>,
) -> ApiResult {
    let name = body.and_then(|b| b.into_inner().name);
    let session = services.terminal.create_session(user.0, name).await?;
    Ok(created_response(session))
}

/// GET /terminal/sessions/{id}
pub async fn get_session(
    services: web::Data<AppServices>,
    user: RequiredUser,
    path: web::Path<String>,
) -> ApiResult {
    let session = services.terminal.get_session(&path, user.0).await?;
    Ok(success_response(session))
}

/// POST /terminal/sessions/{id}/commands
pub async fn execute_command(
    services: web::Data<AppServices>,
    user: RequiredUser,
    path: web::Path<String>,
    body: web::Json<ExecuteCommandRequest>,
) -> ApiResult {
    let execution = services
        .terminal
        .execute_command(&path, &body.command, user.0)
        .await?;
    Ok(success_response(execution))
}

/// GET /terminal/sessions/{id}/commands
pub async fn list_commands(
    services: web::Data<AppServices>,
    user: RequiredUser,
    path: web::Path<String>,
) -> ApiResult {
    let commands = services.terminal.list_commands(&path, user.0).await?;
    Ok(success_response(commands))
}

/// POST /terminal/sessions/{id}/close
pub async fn close_session(
    services: web::Data<AppServices>,
    user: RequiredUser,
    path: web::Path<String>,
) -> ApiResult {
    services.terminal.close_session(&path, user.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn terminal_routes() -> actix_web::Scope {
    web::scope("/terminal/sessions")
        .route("", web::post().to(create_session))
        .route("/{id}", web::get().to(get_session))
        .route("/{id}/commands", web::post().to(execute_command))
        .route("/{id}/commands", web::get().to(list_commands))
        .route("/{id}/close", web::post().to(close_session))
}
