//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::{ErrorKind, ToolbeltError};

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: paste / 短链接错误
/// - 4000-4099: 终端会话错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    Conflict = 1009,
    ServiceUnavailable = 1030,

    // 认证错误 2000-2099
    AuthFailed = 2000,
    TokenInvalid = 2002,
    AccountExists = 2010,

    // paste / 短链接错误 3000-3099
    IdSpaceExhausted = 3010,

    // 终端会话错误 4000-4099
    SessionClosed = 4001,
}

impl From<&ToolbeltError> for ErrorCode {
    fn from(err: &ToolbeltError) -> Self {
        match err {
            ToolbeltError::Unauthorized(_) => ErrorCode::AuthFailed,
            ToolbeltError::Token(_) => ErrorCode::TokenInvalid,
            ToolbeltError::IdExhausted(_) => ErrorCode::IdSpaceExhausted,
            ToolbeltError::InvalidState(_) => ErrorCode::SessionClosed,
            other => match other.kind() {
                ErrorKind::InvalidInput => ErrorCode::BadRequest,
                ErrorKind::NotFound => ErrorCode::NotFound,
                ErrorKind::Forbidden => ErrorCode::Forbidden,
                ErrorKind::Unauthorized => ErrorCode::Unauthorized,
                ErrorKind::Conflict => ErrorCode::Conflict,
                ErrorKind::InvalidState => ErrorCode::SessionClosed,
                ErrorKind::Unavailable => ErrorCode::ServiceUnavailable,
                ErrorKind::Internal => ErrorCode::InternalServerError,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::Success).unwrap(), "0");
        assert_eq!(serde_json::to_string(&ErrorCode::NotFound).unwrap(), "1004");
    }

    #[test]
    fn test_from_error() {
        assert_eq!(
            ErrorCode::from(&ToolbeltError::not_found("x")),
            ErrorCode::NotFound
        );
        assert_eq!(
            ErrorCode::from(&ToolbeltError::invalid_state("closed")),
            ErrorCode::SessionClosed
        );
        assert_eq!(
            ErrorCode::from(&ToolbeltError::database_connection("down")),
            ErrorCode::ServiceUnavailable
        );
    }
}
