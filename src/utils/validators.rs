//! 账号字段校验

use crate::errors::{Result, ToolbeltError};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 8;

/// 用户名：3-50 个字符，仅限字母、数字、下划线和连字符
pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(ToolbeltError::invalid_input(format!(
            "Username must be {}-{} characters",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ToolbeltError::invalid_input(
            "Username may only contain letters, digits, '_' and '-'",
        ));
    }

    Ok(())
}

/// 邮箱：恰好一个 `@`，两侧非空，且不含空白
pub fn validate_email(email: &str) -> Result<()> {
    let invalid = || ToolbeltError::invalid_input(format!("Invalid email address: '{}'", email));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(invalid()),
    }
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ToolbeltError::invalid_input(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    Ok(())
}
