use std::time::Duration;

use actix_web::{HttpResponse, http::StatusCode, web};
use chrono::{DateTime, Utc};
use tracing::{error, trace};

use crate::services::AppServices;

use super::error_code::ErrorCode;
use super::helpers::json_response;
use super::types::HealthResponse;

// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: DateTime<Utc>,
}

impl Default for AppStartTime {
    fn default() -> Self {
        Self {
            start_datetime: Utc::now(),
        }
    }
}

/// GET /health
///
/// 数据库可达返回 200，否则 503
pub async fn health_check(
    services: web::Data<AppServices>,
    start: web::Data<AppStartTime>,
) -> HttpResponse {
    trace!("Received health check request");

    let storage = &services.storage;
    let error = match tokio::time::timeout(Duration::from_secs(5), storage.health_check()).await {
        Ok(Ok(())) => None,
        Ok(Err(e)) => {
            error!("Storage health check failed: {}", e);
            Some(e.message().to_string())
        }
        Err(_) => {
            error!("Storage health check timed out");
            Some("timeout".to_string())
        }
    };

    let now = Utc::now();
    let healthy = error.is_none();
    let body = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        timestamp: now.to_rfc3339(),
        uptime: (now - start.start_datetime).num_seconds().max(0) as u64,
        storage_backend: storage.backend_name().to_string(),
        error,
    };

    if healthy {
        json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(body))
    } else {
        json_response(
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::ServiceUnavailable,
            "Service Unavailable",
            Some(body),
        )
    }
}

/// 健康检查路由
pub fn health_routes() -> actix_web::Scope {
    web::scope("")
        .route("", web::get().to(health_check))
        .route("", web::head().to(health_check))
}
