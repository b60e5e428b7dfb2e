use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// 按 session_id 划分的异步互斥锁表
///
/// 同一会话上的执行与关闭串行进行，不同会话互不阻塞。
/// 条目只在有调用方持有或等待时存在，最后一个 guard 释放时移除。
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// 会话锁 guard，drop 时清理无人引用的条目
pub struct SessionLockGuard<'a> {
    locks: &'a SessionLocks,
    session_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取会话锁，guard 释放前其他调用方等待
    pub async fn acquire(&self, session_id: &str) -> SessionLockGuard<'_> {
        // 先克隆出 Arc，避免跨 await 持有 DashMap 分片锁
        let lock = self
            .locks
            .entry(session_id.to_string())
            .or_default()
            .clone();
        let guard = lock.lock_owned().await;

        SessionLockGuard {
            locks: self,
            session_id: session_id.to_string(),
            guard: Some(guard),
        }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for SessionLockGuard<'_> {
    fn drop(&mut self) {
        // 先释放互斥锁，让 Arc 引用计数回落
        self.guard.take();
        // 计数为 1 说明只剩表内引用：没有持有者，也没有排队者
        self.locks
            .locks
            .remove_if(&self.session_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_session_is_serialized() {
        let locks = Arc::new(SessionLocks::new());
        let guard = locks.acquire("s1").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire("s1").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_sessions_do_not_block() {
        let locks = SessionLocks::new();
        let _a = locks.acquire("a").await;
        let _b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("b"))
            .await
            .expect("other session should not wait");
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_entry_removed_when_guard_drops() {
        let locks = SessionLocks::new();
        let guard = locks.acquire("s1").await;
        assert_eq!(locks.len(), 1);
        drop(guard);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_entry_kept_while_contender_waits() {
        let locks = Arc::new(SessionLocks::new());
        let guard = locks.acquire("s1").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire("s1").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        // 排队者仍引用该条目
        drop(guard);
        assert_eq!(locks.len(), 1);

        contender.await.unwrap();
        assert!(locks.is_empty());
    }
}
