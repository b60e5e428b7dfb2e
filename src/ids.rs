//! 短 ID 生成与冲突重试
//!
//! 生成器本身不知道已有的 ID；唯一性由存储层的唯一键约束保证，
//! 调用方通过 [`with_unique_id`] 在冲突时重新生成。

use std::future::Future;

use tracing::{debug, warn};

use crate::config::IdConfig;
use crate::errors::{Result, ToolbeltError};

/// base62，无符号字符，可直接放进 URL 路径
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// 生成指定长度的随机短 ID
///
/// 随机源为 `rand` 的线程本地 CSPRNG。长度为 0 时按 1 处理。
pub fn new_short_id(length: usize) -> String {
    use std::iter;

    iter::repeat_with(|| ALPHABET[rand::random_range(0..ALPHABET.len())] as char)
        .take(length.max(1))
        .collect()
}

/// ID 生成策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPolicy {
    pub length: usize,
    pub max_attempts: u32,
}

impl Default for IdPolicy {
    fn default() -> Self {
        Self {
            length: 8,
            max_attempts: 5,
        }
    }
}

impl IdPolicy {
    /// paste / short url 使用的策略
    pub fn short_ids(config: &IdConfig) -> Self {
        Self {
            length: config.short_id_length,
            max_attempts: config.max_attempts,
        }
    }

    /// 终端会话使用的策略
    pub fn session_ids(config: &IdConfig) -> Self {
        Self {
            length: config.session_id_length,
            max_attempts: config.max_attempts,
        }
    }
}

/// 生成 ID 并尝试插入，遇到唯一键冲突时重新生成
///
/// 只有 `Conflict` 会触发重试；其他错误立即返回。
/// 连续 `max_attempts` 次冲突后返回 `IdExhausted`。
pub async fn with_unique_id<T, F, Fut>(entity: &str, policy: IdPolicy, mut insert: F) -> Result<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.max_attempts.max(1);

    for attempt in 1..=attempts {
        let id = new_short_id(policy.length);
        match insert(id.clone()).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} id '{}' accepted after {} attempts", entity, id, attempt);
                }
                return Ok(value);
            }
            Err(e) if e.is_conflict() => {
                warn!(
                    "{} id collision on '{}' (attempt {}/{})",
                    entity, id, attempt, attempts
                );
            }
            Err(e) => return Err(e),
        }
    }

    Err(ToolbeltError::id_exhausted(format!(
        "Could not allocate a unique {} id after {} attempts",
        entity, attempts
    )))
}
