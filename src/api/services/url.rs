use actix_web::{HttpResponse, web};

use crate::api::middleware::OptionalUser;
use crate::config::RouteConfig;
use crate::services::AppServices;
use crate::storage::ShortUrl;

use super::helpers::{ApiResult, created_response, success_response};
use super::types::{CreateShortUrlRequest, ShortUrlView};

fn view(record: ShortUrl, routes: &RouteConfig) -> ShortUrlView {
    let short_path = format!(
        "{}/{}",
        routes.redirect_prefix.trim_end_matches('/'),
        record.short_id
    );
    ShortUrlView { record, short_path }
}

/// POST /urls
pub async fn create_short_url(
    services: web::Data<AppServices>,
    routes: web::Data<RouteConfig>,
    user: OptionalUser,
    body: web::Json<CreateShortUrlRequest>,
) -> ApiResult {
    let record = services
        .urls
        .create_short_url(&body.url, user.0, body.ttl_secs)
        .await?;
    Ok(created_response(view(record, &routes)))
}

/// GET /urls/{short_id}
pub async fn get_short_url_info(
    services: web::Data<AppServices>,
    routes: web::Data<RouteConfig>,
    path: web::Path<String>,
) -> ApiResult {
    let record = services.urls.get_short_url_info(&path).await?;
    Ok(success_response(view(record, &routes)))
}

/// DELETE /urls/{short_id}
pub async fn delete_short_url(
    services: web::Data<AppServices>,
    user: OptionalUser,
    path: web::Path<String>,
) -> ApiResult {
    services.urls.delete_short_url(&path, user.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn url_routes() -> actix_web::Scope {
    web::scope("/urls")
        .route("", web::post().to(create_short_url))
        .route("/{short_id}", web::get().to(get_short_url_info))
        .route("/{short_id}", web::delete().to(delete_short_url))
}
