use actix_web::{HttpResponse, http::header::LOCATION, web};
use tracing::trace;

use crate::services::AppServices;

use super::helpers::ApiResult;

/// GET {redirect_prefix}/{short_id}
///
/// 302 跳转到目标地址，并计一次点击
pub async fn handle_redirect(
    services: web::Data<AppServices>,
    path: web::Path<String>,
) -> ApiResult {
    let short_id = path.into_inner();
    let target = services.urls.redirect_to_original_url(&short_id).await?;

    trace!("Redirecting {} -> {}", short_id, target);
    Ok(HttpResponse::Found()
        .insert_header((LOCATION, target))
        .finish())
}

/// 短链跳转路由
pub fn redirect_routes() -> actix_web::Scope {
    web::scope("").route("/{short_id}", web::get().to(handle_redirect))
}
