pub mod auth;
pub mod error_code;
pub mod health;
pub mod helpers;
pub mod paste;
pub mod redirect;
pub mod terminal;
pub mod types;
pub mod url;

use actix_web::web;

use crate::config::StaticConfig;

pub use auth::auth_routes;
pub use error_code::ErrorCode;
pub use health::{AppStartTime, health_routes};
pub use helpers::{ApiError, ApiResult, json_error_handler};
pub use paste::paste_routes;
pub use redirect::redirect_routes;
pub use terminal::terminal_routes;
pub use url::url_routes;

fn scope_path(prefix: &str) -> &str {
    prefix.trim_end_matches('/')
}

/// 注册全部路由
///
/// server 与集成测试共用，调用方负责挂载 `AppServices` 和 `AppStartTime`
pub fn configure_routes(cfg: &mut web::ServiceConfig, config: &StaticConfig) {
    let routes = &config.routes;
    // 粘贴内容经过 JSON 转义可能膨胀，body 上限放宽到内容上限的 4 倍
    let json_limit = config.limits.max_paste_bytes.saturating_mul(4).max(64 * 1024);

    cfg.app_data(web::Data::new(routes.clone()))
        .app_data(
            web::JsonConfig::default()
                .limit(json_limit)
                .error_handler(json_error_handler),
        )
        .service(web::scope(scope_path(&routes.health_prefix)).service(health_routes()))
        .service(
            web::scope(scope_path(&routes.api_prefix))
                .service(auth_routes())
                .service(paste_routes())
                .service(url_routes())
                .service(terminal_routes()),
        )
        .service(web::scope(scope_path(&routes.redirect_prefix)).service(redirect_routes()));
}
