//! Terminal session service
//!
//! 会话状态机：Open → Closed，关闭为终态。
//! 同一会话上的命令执行与关闭由 [`SessionLocks`] 串行化，
//! 锁表条目随最后一个 guard 释放而移除。

mod executor;
mod locks;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::errors::{Result, ToolbeltError};
use crate::ids::{IdPolicy, with_unique_id};
use crate::storage::{CommandExecution, SessionState, SessionStore, TerminalSession};

pub use executor::{BuiltinExecutor, CommandExecutor, ProcessExecutor, build_executor};
pub use locks::{SessionLockGuard, SessionLocks};

/// 会话名称长度上限（字符）
pub const MAX_SESSION_NAME_LEN: usize = 100;

pub struct TerminalService {
    store: Arc<dyn SessionStore>,
    executor: Arc<dyn CommandExecutor>,
    locks: Arc<SessionLocks>,
    ids: IdPolicy,
    max_command_length: usize,
}

impl TerminalService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        executor: Arc<dyn CommandExecutor>,
        locks: Arc<SessionLocks>,
        ids: IdPolicy,
        max_command_length: usize,
    ) -> Self {
        Self {
            store,
            executor,
            locks,
            ids,
            max_command_length,
        }
    }

    pub async fn create_session(
        &self,
        user_id: i64,
        name: Option<String>,
    ) -> Result<TerminalSession> {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if let Some(ref n) = name
            && n.chars().count() > MAX_SESSION_NAME_LEN
        {
            return Err(ToolbeltError::invalid_input(format!(
                "Session name must be at most {} characters",
                MAX_SESSION_NAME_LEN
            )));
        }

        let now = Utc::now();
        let session = with_unique_id("session", self.ids, |session_id| {
            let record = TerminalSession {
                session_id,
                owner_id: user_id,
                name: name.clone(),
                state: SessionState::Open,
                created_at: now,
                closed_at: None,
            };
            self.store.insert_session(record)
        })
        .await?;

        info!(
            "TerminalService: user {} opened session '{}'",
            user_id, session.session_id
        );
        Ok(session)
    }

    /// 读取会话并校验所有者
    async fn load_owned(&self, session_id: &str, user_id: i64) -> Result<TerminalSession> {
        let session = self.store.get_session(session_id).await?;
        if session.owner_id != user_id {
            warn!(
                "TerminalService: user {} denied access to session '{}'",
                user_id, session_id
            );
            return Err(ToolbeltError::forbidden(format!(
                "Session '{}' belongs to another user",
                session_id
            )));
        }
        Ok(session)
    }

    pub async fn get_session(&self, session_id: &str, user_id: i64) -> Result<TerminalSession> {
        self.load_owned(session_id, user_id).await
    }

    /// 在会话中执行命令并记录
    ///
    /// 校验顺序：命令为空/过长 → 会话不存在 → 非所有者 → 会话已关闭。
    /// 任何校验失败都不会留下执行记录。
    pub async fn execute_command(
        &self,
        session_id: &str,
        command: &str,
        user_id: i64,
    ) -> Result<CommandExecution> {
        let command = command.trim();
        if command.is_empty() {
            return Err(ToolbeltError::invalid_input("Command cannot be empty"));
        }
        if command.len() > self.max_command_length {
            return Err(ToolbeltError::invalid_input(format!(
                "Command exceeds {} bytes",
                self.max_command_length
            )));
        }

        // 锁外先做一次检查，不存在或已关闭的会话无需排队
        let session = self.load_owned(session_id, user_id).await?;
        ensure_open(&session)?;

        let _guard = self.locks.acquire(session_id).await;

        // 持锁后重新读取：排队期间会话可能已被关闭
        let session = self.store.get_session(session_id).await?;
        ensure_open(&session)?;

        let result = self.executor.run(command).await;
        let execution = self
            .store
            .insert_command(session_id, user_id, command, &result, Utc::now())
            .await?;

        debug!(
            "TerminalService: session '{}' ran #{} {:?}",
            session_id, execution.id, command
        );
        Ok(execution)
    }

    /// 关闭会话；重复关闭返回 `InvalidState`
    pub async fn close_session(&self, session_id: &str, user_id: i64) -> Result<()> {
        let session = self.load_owned(session_id, user_id).await?;
        ensure_open(&session)?;

        let _guard = self.locks.acquire(session_id).await;
        if !self.store.mark_session_closed(session_id, Utc::now()).await? {
            return Err(already_closed(session_id));
        }

        info!(
            "TerminalService: user {} closed session '{}'",
            user_id, session_id
        );
        Ok(())
    }

    /// 会话的命令历史，按执行顺序
    pub async fn list_commands(
        &self,
        session_id: &str,
        user_id: i64,
    ) -> Result<Vec<CommandExecution>> {
        self.load_owned(session_id, user_id).await?;
        self.store.list_commands_by_session(session_id).await
    }
}

fn ensure_open(session: &TerminalSession) -> Result<()> {
    if session.is_open() {
        Ok(())
    } else {
        Err(already_closed(&session.session_id))
    }
}

fn already_closed(session_id: &str) -> ToolbeltError {
    ToolbeltError::invalid_state(format!("Session '{}' is closed", session_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CommandResult;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    /// 内存实现，便于脱离数据库验证状态机
    #[derive(Default)]
    struct MemorySessionStore {
        sessions: Mutex<HashMap<String, TerminalSession>>,
        commands: Mutex<Vec<CommandExecution>>,
        /// 置位后下一次 get_session 读取后等待 200ms 再返回
        stall_next_get: AtomicBool,
    }

    #[async_trait]
    impl SessionStore for MemorySessionStore {
        async fn insert_session(&self, session: TerminalSession) -> Result<TerminalSession> {
            let mut sessions = self.sessions.lock().unwrap();
            if sessions.contains_key(&session.session_id) {
                return Err(ToolbeltError::conflict("duplicate session id"));
            }
            sessions.insert(session.session_id.clone(), session.clone());
            Ok(session)
        }

        async fn get_session(&self, session_id: &str) -> Result<TerminalSession> {
            let session = self
                .sessions
                .lock()
                .unwrap()
                .get(session_id)
                .cloned()
                .ok_or_else(|| ToolbeltError::not_found("no such session"))?;
            // 读到的快照在等待期间可能过期
            if self.stall_next_get.swap(false, Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            Ok(session)
        }

        async fn mark_session_closed(
            &self,
            session_id: &str,
            closed_at: DateTime<Utc>,
        ) -> Result<bool> {
            let mut sessions = self.sessions.lock().unwrap();
            match sessions.get_mut(session_id) {
                Some(s) if s.is_open() => {
                    s.state = SessionState::Closed;
                    s.closed_at = Some(closed_at);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn insert_command(
            &self,
            session_id: &str,
            owner_id: i64,
            command: &str,
            result: &CommandResult,
            executed_at: DateTime<Utc>,
        ) -> Result<CommandExecution> {
            let mut commands = self.commands.lock().unwrap();
            let execution = CommandExecution {
                id: commands.len() as i64 + 1,
                session_id: session_id.to_string(),
                owner_id,
                command: command.to_string(),
                result: result.clone(),
                executed_at,
            };
            commands.push(execution.clone());
            Ok(execution)
        }

        async fn list_commands_by_session(
            &self,
            session_id: &str,
        ) -> Result<Vec<CommandExecution>> {
            Ok(self
                .commands
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.session_id == session_id)
                .cloned()
                .collect())
        }
    }

    fn service() -> (TerminalService, Arc<MemorySessionStore>, Arc<SessionLocks>) {
        let store = Arc::new(MemorySessionStore::default());
        let locks = Arc::new(SessionLocks::new());
        let service = TerminalService::new(
            store.clone(),
            Arc::new(BuiltinExecutor),
            locks.clone(),
            IdPolicy {
                length: 16,
                max_attempts: 5,
            },
            4096,
        );
        (service, store, locks)
    }

    #[tokio::test]
    async fn test_execute_then_close_then_execute_again() {
        let (service, _, _) = service();

        let session = service.create_session(42, None).await.unwrap();
        assert_eq!(session.session_id.len(), 16);
        assert_eq!(session.state, SessionState::Open);

        let execution = service
            .execute_command(&session.session_id, "echo hi", 42)
            .await
            .unwrap();
        assert_eq!(execution.result, CommandResult::output("hi\n"));
        assert_eq!(execution.owner_id, 42);

        service.close_session(&session.session_id, 42).await.unwrap();

        let err = service
            .execute_command(&session.session_id, "echo hi", 42)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolbeltError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_second_close_is_invalid_state() {
        let (service, _, locks) = service();
        let session = service.create_session(1, Some("build".into())).await.unwrap();

        service.close_session(&session.session_id, 1).await.unwrap();
        assert!(locks.is_empty());

        let err = service
            .close_session(&session.session_id, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolbeltError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_foreign_user_is_forbidden_and_nothing_recorded() {
        let (service, store, _) = service();
        let session = service.create_session(42, None).await.unwrap();

        let err = service
            .execute_command(&session.session_id, "echo hi", 7)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolbeltError::Forbidden(_)));
        assert!(store.commands.lock().unwrap().is_empty());

        let err = service.close_session(&session.session_id, 7).await.unwrap_err();
        assert!(matches!(err, ToolbeltError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_input_validation() {
        let (service, _, _) = service();
        let session = service.create_session(42, None).await.unwrap();

        let err = service
            .execute_command(&session.session_id, "   ", 42)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolbeltError::InvalidInput(_)));

        let err = service
            .execute_command("missing", "echo hi", 42)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolbeltError::NotFound(_)));

        let err = service
            .create_session(42, Some("x".repeat(MAX_SESSION_NAME_LEN + 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolbeltError::InvalidInput(_)));

        let blank = service.create_session(42, Some("   ".into())).await.unwrap();
        assert_eq!(blank.name, None);
    }

    #[tokio::test]
    async fn test_concurrent_commands_all_recorded() {
        let (service, _, _) = service();
        let service = Arc::new(service);
        let session = service.create_session(42, None).await.unwrap();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let service = service.clone();
                let id = session.session_id.clone();
                tokio::spawn(async move {
                    service
                        .execute_command(&id, &format!("echo {}", i), 42)
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let history = service.list_commands(&session.session_id, 42).await.unwrap();
        assert_eq!(history.len(), 10);
    }

    #[tokio::test]
    async fn test_close_during_execute_leaves_no_lock_entry() {
        let (service, store, locks) = service();
        let service = Arc::new(service);
        let session = service.create_session(42, None).await.unwrap();

        // execute 的锁外检查读到 Open 后停住，close 在此期间完成
        store.stall_next_get.store(true, Ordering::SeqCst);
        let execute = {
            let service = service.clone();
            let id = session.session_id.clone();
            tokio::spawn(async move { service.execute_command(&id, "echo late", 42).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        service.close_session(&session.session_id, 42).await.unwrap();

        let err = execute.await.unwrap().unwrap_err();
        assert!(matches!(err, ToolbeltError::InvalidState(_)));
        assert!(locks.is_empty());
        assert!(store.commands.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_session_keeps_no_lock_entry_between_commands() {
        let (service, _, locks) = service();
        let session = service.create_session(42, None).await.unwrap();

        for _ in 0..3 {
            service
                .execute_command(&session.session_id, "echo hi", 42)
                .await
                .unwrap();
        }
        assert!(locks.is_empty());
    }
}
