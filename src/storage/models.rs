use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// 注册用户
///
/// `password_hash` 不参与序列化，API 层直接返回本结构体也不会泄露。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// 新用户（尚未分配 id）
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paste {
    pub id: String,
    pub content: String,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Paste {
    pub fn is_expired(&self) -> bool {
        is_expired_at(self.expires_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrl {
    pub short_id: String,
    pub target_url: String,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub hit_count: i64,
}

impl ShortUrl {
    pub fn is_expired(&self) -> bool {
        is_expired_at(self.expires_at)
    }
}

fn is_expired_at(expires_at: Option<DateTime<Utc>>) -> bool {
    expires_at.is_some_and(|at| at <= Utc::now())
}

/// 会话状态：Open → Closed，关闭后不可重新打开
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionState {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSession {
    pub session_id: String,
    pub owner_id: i64,
    pub name: Option<String>,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl TerminalSession {
    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }
}

/// 命令执行结果
///
/// 序列化为带 `kind` 标签的 JSON，存储层原样保存。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandResult {
    /// 正常文本输出
    Output { stdout: String },
    /// 命令无法执行（未找到、被拒绝、超时等）
    Error { message: String },
    /// 外部进程退出，附带退出码与两路输出
    Exit {
        status: i32,
        stdout: String,
        stderr: String,
    },
}

impl CommandResult {
    pub fn output(stdout: impl Into<String>) -> Self {
        CommandResult::Output {
            stdout: stdout.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        CommandResult::Error {
            message: message.into(),
        }
    }
}

/// 一次已记录的命令执行，写入后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandExecution {
    pub id: i64,
    pub session_id: String,
    pub owner_id: i64,
    pub command: String,
    pub result: CommandResult,
    pub executed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::str::FromStr;

    #[test]
    fn test_command_result_json_shape() {
        let json = serde_json::to_value(CommandResult::output("hi\n")).unwrap();
        assert_eq!(json["kind"], "output");
        assert_eq!(json["stdout"], "hi\n");

        let json = serde_json::to_value(CommandResult::Exit {
            status: 2,
            stdout: String::new(),
            stderr: "boom".into(),
        })
        .unwrap();
        assert_eq!(json["kind"], "exit");
        assert_eq!(json["status"], 2);
    }

    #[test]
    fn test_command_result_parses_error_variant() {
        let parsed: CommandResult =
            serde_json::from_str(r#"{"kind":"error","message":"command not found: ls"}"#)
                .unwrap();
        assert_eq!(parsed, CommandResult::error("command not found: ls"));
    }

    #[test]
    fn test_session_state_strings() {
        assert_eq!(SessionState::Open.as_ref(), "open");
        assert_eq!(SessionState::from_str("closed").unwrap(), SessionState::Closed);
        assert!(SessionState::from_str("paused").is_err());
    }

    #[test]
    fn test_expiry() {
        let mut paste = Paste {
            id: "abc".into(),
            content: "x".into(),
            owner_id: None,
            created_at: Utc::now(),
            expires_at: None,
        };
        assert!(!paste.is_expired());

        paste.expires_at = Some(Utc::now() - Duration::seconds(1));
        assert!(paste.is_expired());

        paste.expires_at = Some(Utc::now() + Duration::hours(1));
        assert!(!paste.is_expired());
    }

    #[test]
    fn test_user_hash_not_serialized() {
        let user = User {
            id: 1,
            email: "a@b.c".into(),
            username: "alice".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
    }
}
