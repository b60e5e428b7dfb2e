use actix_web::{HttpResponse, web};

use crate::api::middleware::OptionalUser;
use crate::services::AppServices;

use super::helpers::{ApiResult, created_response, success_response};
use super::types::CreatePasteRequest;

/// POST /pastes
pub async fn create_paste(
    services: web::Data<AppServices>,
    user: OptionalUser,
    body: web::Json<CreatePasteRequest>,
) -> ApiResult {
    let body = body.into_inner();
    let paste = services
        .pastes
        .create_paste(body.content, user.0, body.ttl_secs)
        .await?;
    Ok(created_response(paste))
}

/// GET /pastes/{id}
pub async fn get_paste(services: web::Data<AppServices>, path: web::Path<String>) -> ApiResult {
    let paste = services.pastes.get_paste(&path).await?;
    Ok(success_response(paste))
}

/// GET /pastes/{id}/raw
pub async fn get_paste_raw(
    services: web::Data<AppServices>,
    path: web::Path<String>,
) -> ApiResult {
    let paste = services.pastes.get_paste(&path).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(paste.content))
}

/// DELETE /pastes/{id}
pub async fn delete_paste(
    services: web::Data<AppServices>,
    user: OptionalUser,
    path: web::Path<String>,
) -> ApiResult {
    services.pastes.delete_paste(&path, user.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn paste_routes() -> actix_web::Scope {
    web::scope("/pastes")
        .route("", web::post().to(create_paste))
        .route("/{id}", web::get().to(get_paste))
        .route("/{id}", web::delete().to(delete_paste))
        .route("/{id}/raw", web::get().to(get_paste_raw))
}
