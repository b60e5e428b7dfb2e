use std::fmt;

use actix_web::http::StatusCode;
use serde::Serialize;

/// 稳定的错误类别，边界层据此映射为传输层状态码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Forbidden,
    Unauthorized,
    Conflict,
    InvalidState,
    Unavailable,
    Internal,
}

#[derive(Debug, Clone)]
pub enum ToolbeltError {
    InvalidInput(String),
    NotFound(String),
    Forbidden(String),
    Unauthorized(String),
    Conflict(String),
    IdExhausted(String),
    InvalidState(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    PasswordHash(String),
    Token(String),
    FileOperation(String),
    Serialization(String),
}

impl ToolbeltError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ToolbeltError::InvalidInput(_) => "E001",
            ToolbeltError::NotFound(_) => "E002",
            ToolbeltError::Forbidden(_) => "E003",
            ToolbeltError::Unauthorized(_) => "E004",
            ToolbeltError::Conflict(_) => "E005",
            ToolbeltError::IdExhausted(_) => "E006",
            ToolbeltError::InvalidState(_) => "E007",
            ToolbeltError::DatabaseConfig(_) => "E008",
            ToolbeltError::DatabaseConnection(_) => "E009",
            ToolbeltError::DatabaseOperation(_) => "E010",
            ToolbeltError::PasswordHash(_) => "E011",
            ToolbeltError::Token(_) => "E012",
            ToolbeltError::FileOperation(_) => "E013",
            ToolbeltError::Serialization(_) => "E014",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ToolbeltError::InvalidInput(_) => "Invalid Input",
            ToolbeltError::NotFound(_) => "Resource Not Found",
            ToolbeltError::Forbidden(_) => "Forbidden",
            ToolbeltError::Unauthorized(_) => "Unauthorized",
            ToolbeltError::Conflict(_) => "Conflict",
            ToolbeltError::IdExhausted(_) => "Identifier Space Exhausted",
            ToolbeltError::InvalidState(_) => "Invalid State",
            ToolbeltError::DatabaseConfig(_) => "Database Configuration Error",
            ToolbeltError::DatabaseConnection(_) => "Database Connection Error",
            ToolbeltError::DatabaseOperation(_) => "Database Operation Error",
            ToolbeltError::PasswordHash(_) => "Password Hash Error",
            ToolbeltError::Token(_) => "Token Error",
            ToolbeltError::FileOperation(_) => "File Operation Error",
            ToolbeltError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ToolbeltError::InvalidInput(msg)
            | ToolbeltError::NotFound(msg)
            | ToolbeltError::Forbidden(msg)
            | ToolbeltError::Unauthorized(msg)
            | ToolbeltError::Conflict(msg)
            | ToolbeltError::IdExhausted(msg)
            | ToolbeltError::InvalidState(msg)
            | ToolbeltError::DatabaseConfig(msg)
            | ToolbeltError::DatabaseConnection(msg)
            | ToolbeltError::DatabaseOperation(msg)
            | ToolbeltError::PasswordHash(msg)
            | ToolbeltError::Token(msg)
            | ToolbeltError::FileOperation(msg)
            | ToolbeltError::Serialization(msg) => msg,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolbeltError::InvalidInput(_) => ErrorKind::InvalidInput,
            ToolbeltError::NotFound(_) => ErrorKind::NotFound,
            ToolbeltError::Forbidden(_) => ErrorKind::Forbidden,
            ToolbeltError::Unauthorized(_) | ToolbeltError::Token(_) => ErrorKind::Unauthorized,
            ToolbeltError::Conflict(_) | ToolbeltError::IdExhausted(_) => ErrorKind::Conflict,
            ToolbeltError::InvalidState(_) => ErrorKind::InvalidState,
            ToolbeltError::DatabaseConnection(_) | ToolbeltError::DatabaseOperation(_) => {
                ErrorKind::Unavailable
            }
            ToolbeltError::DatabaseConfig(_)
            | ToolbeltError::PasswordHash(_)
            | ToolbeltError::FileOperation(_)
            | ToolbeltError::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Conflict | ErrorKind::InvalidState => StatusCode::CONFLICT,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 主键冲突（可由 id 重试循环恢复）
    pub fn is_conflict(&self) -> bool {
        matches!(self, ToolbeltError::Conflict(_))
    }

    /// 格式化为彩色输出（用于启动失败时的终端输出）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ToolbeltError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ToolbeltError {}

// 便捷的构造函数
impl ToolbeltError {
    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        ToolbeltError::InvalidInput(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ToolbeltError::NotFound(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        ToolbeltError::Forbidden(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        ToolbeltError::Unauthorized(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        ToolbeltError::Conflict(msg.into())
    }

    pub fn id_exhausted<T: Into<String>>(msg: T) -> Self {
        ToolbeltError::IdExhausted(msg.into())
    }

    pub fn invalid_state<T: Into<String>>(msg: T) -> Self {
        ToolbeltError::InvalidState(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ToolbeltError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ToolbeltError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ToolbeltError::DatabaseOperation(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        ToolbeltError::PasswordHash(msg.into())
    }

    pub fn token<T: Into<String>>(msg: T) -> Self {
        ToolbeltError::Token(msg.into())
    }
}

impl From<sea_orm::DbErr> for ToolbeltError {
    fn from(err: sea_orm::DbErr) -> Self {
        ToolbeltError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ToolbeltError {
    fn from(err: std::io::Error) -> Self {
        ToolbeltError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ToolbeltError {
    fn from(err: serde_json::Error) -> Self {
        ToolbeltError::Serialization(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ToolbeltError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ToolbeltError::Token(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ToolbeltError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            ToolbeltError::id_exhausted("x").kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ToolbeltError::database_operation("x").kind(),
            ErrorKind::Unavailable
        );
        assert_eq!(ToolbeltError::token("x").kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            ToolbeltError::invalid_input("bad").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ToolbeltError::forbidden("no").http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ToolbeltError::invalid_state("closed").http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ToolbeltError::database_connection("down").http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_only_plain_conflict_is_retryable() {
        assert!(ToolbeltError::conflict("dup").is_conflict());
        assert!(!ToolbeltError::id_exhausted("dup").is_conflict());
    }

    #[test]
    fn test_display_uses_simple_format() {
        let err = ToolbeltError::not_found("Paste 'abc' not found");
        assert_eq!(err.to_string(), "Resource Not Found: Paste 'abc' not found");
    }

    #[test]
    fn test_io_and_json_errors_are_internal() {
        let io: ToolbeltError = std::io::Error::other("disk gone").into();
        assert!(matches!(io, ToolbeltError::FileOperation(_)));
        assert_eq!(io.kind(), ErrorKind::Internal);

        let json: ToolbeltError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(json, ToolbeltError::Serialization(_)));
        assert_eq!(json.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
