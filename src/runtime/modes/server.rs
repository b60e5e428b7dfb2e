//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all necessary routes.

use std::time::Duration;

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::api::middleware::{BearerAuth, RequestIdMiddleware};
use crate::api::services::{AppStartTime, configure_routes};
use crate::config::{CorsConfig, StaticConfig};
use crate::runtime::lifetime;
use crate::services::AppServices;

/// Build CORS middleware from configuration
fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    // 未启用时保持浏览器同源策略
    if !cors_config.enabled {
        return Cors::default();
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::AUTHORIZATION,
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::ACCEPT,
        ])
        .max_age(cors_config.max_age as usize);

    if cors_config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

/// 周期性清理过期的 paste 与短链
async fn run_purge_task(services: AppServices, interval_secs: u64) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    // 第一次 tick 立即返回
    ticker.tick().await;

    loop {
        ticker.tick().await;

        match services.pastes.purge_expired().await {
            Ok(0) => {}
            Ok(n) => info!("Purged {} expired pastes", n),
            Err(e) => error!("Failed to purge expired pastes: {}", e),
        }
        match services.urls.purge_expired().await {
            Ok(0) => {}
            Ok(n) => info!("Purged {} expired short URLs", n),
            Err(e) => error!("Failed to purge expired short URLs: {}", e),
        }
    }
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let app_start_time = AppStartTime::default();

    let startup = lifetime::startup::prepare_server_startup(config)
        .await
        .map_err(|e| {
            error!("Server startup failed: {}", e);
            e
        })?;
    let services = startup.services;

    let purge_interval = config.maintenance.purge_interval_secs;
    if purge_interval > 0 {
        debug!("Expired record purge runs every {} seconds", purge_interval);
        tokio::spawn(run_purge_task(services.clone(), purge_interval));
    } else {
        info!("Expired record purge is disabled");
    }

    if config.cors.enabled && config.cors.allowed_origins.is_empty() {
        warn!("CORS enabled but allowed_origins is empty, no cross-origin requests will be allowed");
    }

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let app_config = config.clone();
    let server = HttpServer::new(move || {
        let cors = build_cors_middleware(&app_config.cors);
        let jwt = services.jwt.clone();

        App::new()
            .wrap(BearerAuth::new(jwt))
            .wrap(cors)
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-store")))
            .wrap(RequestIdMiddleware) // 最外层，为每个请求生成 request_id
            .app_data(web::Data::new(services.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .configure(|cfg| configure_routes(cfg, &app_config))
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(&bind_address)?.run();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("Graceful shutdown: stopping server");
        }
    }

    Ok(())
}
