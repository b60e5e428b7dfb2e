//! 数据库操作重试与错误归类
//!
//! 连接获取失败、死锁、SQLite BUSY 等瞬时错误按指数退避重试；
//! 重试后仍失败的错误再由 [`map_db_err`] 转成 crate 错误。
//!
//! 非幂等写入（INSERT、计数递增）使用 [`with_write_retry`]：
//! 语句执行中途断开的连接错误不重试，提交可能已生效。

use std::future::Future;
use std::time::Duration;

use sea_orm::{DbErr, SqlErr};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::errors::ToolbeltError;

/// 重试配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl From<&DatabaseConfig> for RetryConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }
}

/// 判断数据库错误是否属于瞬时错误
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => is_transient(runtime_err),
        _ => false,
    }
}

/// 可安全重放的写入错误：语句确定没有生效
///
/// 连接获取失败时语句尚未发出；死锁/BUSY 时语句已被回滚。
/// `DbErr::Conn` 可能发生在提交之后，重放会重复写入。
pub fn is_retryable_write_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => is_transient(runtime_err),
        _ => false,
    }
}

fn is_transient(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(code) = sqlx_err
                .deref()
                .as_database_error()
                .and_then(|db_err| db_err.code())
            {
                // MySQL 1213/1205, PostgreSQL 40001/40P01, SQLite 5/6
                return matches!(
                    code.as_ref(),
                    "1213" | "1205" | "40001" | "40P01" | "5" | "6"
                );
            }
            is_transient_message(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => is_transient_message(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn is_transient_message(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    ["deadlock", "lock wait timeout", "database is locked", "serialization failure"]
        .iter()
        .any(|needle| msg.contains(needle))
}

/// 指数退避执行器，用于读取与幂等写入
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    retry_loop(operation_name, config, is_retryable_error, operation).await
}

/// 非幂等写入的重试执行器
pub async fn with_write_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    retry_loop(operation_name, config, is_retryable_write_error, operation).await
}

async fn retry_loop<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    retryable: fn(&DbErr) -> bool,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("'{}' succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < config.max_retries && retryable(&e) => {
                attempt += 1;
                let delay = backoff_delay(attempt, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "'{}' failed (attempt {}/{}): {}; retrying in {} ms",
                    operation_name,
                    attempt,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// 第 `attempt` 次重试的等待时间：base * 2^(attempt-1)，封顶 max，加 0-25% 抖动
fn backoff_delay(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let exp = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp.min(max_ms);
    capped.saturating_add(rand::random_range(0..=capped / 4))
}

/// 把数据库错误转成 crate 错误
///
/// 唯一键冲突 → `Conflict`，外键冲突 → `InvalidInput`，
/// 连接类错误 → `DatabaseConnection`，其余 → `DatabaseOperation`
pub fn map_db_err(operation_name: &str, err: DbErr) -> ToolbeltError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            return ToolbeltError::conflict(format!("{}: duplicate key ({})", operation_name, detail));
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            return ToolbeltError::invalid_input(format!(
                "{}: referenced record does not exist ({})",
                operation_name, detail
            ));
        }
        _ => {}
    }

    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => ToolbeltError::database_connection(
            format!("{}: {}", operation_name, err),
        ),
        other => ToolbeltError::database_operation(format!("{}: {}", operation_name, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::error::{ConnAcquireErr, RuntimeErr};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            base_delay_ms: 5,
            max_delay_ms: 20,
        }
    }

    #[test]
    fn test_transient_errors() {
        assert!(is_retryable_error(&DbErr::ConnectionAcquire(
            ConnAcquireErr::Timeout
        )));
        assert!(is_retryable_error(&DbErr::Exec(RuntimeErr::Internal(
            "database is locked".into()
        ))));
        assert!(is_retryable_error(&DbErr::Query(RuntimeErr::Internal(
            "Deadlock found when trying to get lock".into()
        ))));
        assert!(!is_retryable_error(&DbErr::RecordNotFound("x".into())));
        assert!(!is_retryable_error(&DbErr::Custom("syntax".into())));
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let first = backoff_delay(1, 100, 2000);
        assert!((100..=125).contains(&first));

        let third = backoff_delay(3, 100, 2000);
        assert!((400..=500).contains(&third));

        let capped = backoff_delay(12, 100, 2000);
        assert!((2000..=2500).contains(&capped));
    }

    #[tokio::test]
    async fn test_retries_transient_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry("lookup", fast(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout))
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<(), DbErr> = with_retry("lookup", fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), DbErr> = with_retry("lookup", fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DbErr::Custom("bad sql".into())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_map_db_err_connection_is_unavailable() {
        let err = map_db_err("get_paste", DbErr::ConnectionAcquire(ConnAcquireErr::Timeout));
        assert!(matches!(err, ToolbeltError::DatabaseConnection(_)));
        assert_eq!(err.kind(), crate::errors::ErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn test_write_retry_skips_broken_connection() {
        let calls = AtomicU32::new(0);
        let result: Result<(), DbErr> = with_write_retry("insert", fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DbErr::Conn(RuntimeErr::Internal("connection reset".into()))) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_write_retry_still_retries_acquire_and_busy() {
        let calls = AtomicU32::new(0);
        let result = with_write_retry("insert", fast(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                match n {
                    0 => Err(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)),
                    1 => Err(DbErr::Exec(RuntimeErr::Internal("database is locked".into()))),
                    _ => Ok(n),
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_broken_connection_is_retryable_for_reads_only() {
        let err = DbErr::Conn(RuntimeErr::Internal("connection reset".into()));
        assert!(is_retryable_error(&err));
        assert!(!is_retryable_write_error(&err));
    }
}
