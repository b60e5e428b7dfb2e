//! API 帮助函数

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError, error::JsonPayloadError};
use serde::Serialize;
use tracing::{debug, error};

use crate::errors::{ErrorKind, ToolbeltError};

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 201 Created
pub fn created_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::CREATED, ErrorCode::Success, "Created", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 ToolbeltError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_toolbelt(err: &ToolbeltError) -> HttpResponse {
    match err.kind() {
        ErrorKind::Unavailable | ErrorKind::Internal => error!("Request failed: {}", err),
        _ => debug!("Request rejected: {}", err),
    }
    error_response(err.http_status(), ErrorCode::from(err), err.message())
}

/// 处理器返回的错误类型，`?` 可直接把 ToolbeltError 转成 JSON 错误响应
#[derive(Debug)]
pub struct ApiError(pub ToolbeltError);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<ToolbeltError> for ApiError {
    fn from(err: ToolbeltError) -> Self {
        ApiError(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.0.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        error_from_toolbelt(&self.0)
    }
}

pub type ApiResult = Result<HttpResponse, ApiError>;

/// JSON 请求体解析失败时返回统一格式的 400
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::Overflow { limit }
        | JsonPayloadError::OverflowKnownLength { limit, .. } => {
            format!("Request body exceeds {} bytes", limit)
        }
        other => format!("Invalid JSON body: {}", other),
    };
    ApiError(ToolbeltError::invalid_input(message)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn test_error_from_toolbelt_envelope() {
        let resp = error_from_toolbelt(&ToolbeltError::forbidden("not yours"));
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], ErrorCode::Forbidden as i32);
        assert_eq!(json["message"], "not yours");
        assert!(json.get("data").is_none());
    }

    #[actix_rt::test]
    async fn test_created_response() {
        let resp = created_response(serde_json::json!({"id": "abc"}));
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["data"]["id"], "abc");
    }

    #[test]
    fn test_api_error_status() {
        let err = ApiError::from(ToolbeltError::invalid_state("closed"));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
