//! API 请求/响应类型

use serde::{Deserialize, Serialize};

use crate::storage::{ShortUrl, User};

/// 通用 JSON 响应包装
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// `login` 可以是用户名或邮箱
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct CreatePasteRequest {
    pub content: String,
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateShortUrlRequest {
    pub url: String,
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

/// 短链接记录加上可直接访问的跳转路径
#[derive(Debug, Serialize)]
pub struct ShortUrlView {
    #[serde(flatten)]
    pub record: ShortUrl,
    pub short_path: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteCommandRequest {
    pub command: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: u64,
    pub storage_backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
