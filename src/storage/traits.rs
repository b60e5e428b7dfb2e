//! 存储抽象
//!
//! 服务层只依赖这些 trait；`SeaOrmStorage` 实现全部四个。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::storage::models::{
    CommandExecution, CommandResult, NewUser, Paste, ShortUrl, TerminalSession, User,
};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// 用户名或邮箱重复时返回 `Conflict`
    async fn insert_user(&self, user: NewUser) -> Result<User>;

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// 按用户名或邮箱查找
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait PasteStore: Send + Sync {
    /// id 已存在时返回 `Conflict`，不覆盖
    async fn insert_paste(&self, paste: Paste) -> Result<Paste>;

    async fn get_paste(&self, id: &str) -> Result<Paste>;

    /// 带所有权检查的删除
    ///
    /// 不存在 → `NotFound`；有主且主人不是 `caller` → `Forbidden`
    async fn delete_paste(&self, id: &str, caller: Option<i64>) -> Result<()>;

    /// 删除 `expires_at <= now` 的记录，返回删除数量
    async fn purge_expired_pastes(&self, now: DateTime<Utc>) -> Result<u64>;
}

#[async_trait]
pub trait ShortUrlStore: Send + Sync {
    async fn insert_short_url(&self, short_url: ShortUrl) -> Result<ShortUrl>;

    async fn get_short_url(&self, short_id: &str) -> Result<ShortUrl>;

    /// 单条 UPDATE 完成自增
    async fn increment_hit_count(&self, short_id: &str) -> Result<()>;

    async fn delete_short_url(&self, short_id: &str, caller: Option<i64>) -> Result<()>;

    async fn purge_expired_short_urls(&self, now: DateTime<Utc>) -> Result<u64>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, session: TerminalSession) -> Result<TerminalSession>;

    async fn get_session(&self, session_id: &str) -> Result<TerminalSession>;

    /// 仅当会话仍为 open 时更新，返回是否有行被修改
    async fn mark_session_closed(&self, session_id: &str, closed_at: DateTime<Utc>)
    -> Result<bool>;

    async fn insert_command(
        &self,
        session_id: &str,
        owner_id: i64,
        command: &str,
        result: &CommandResult,
        executed_at: DateTime<Utc>,
    ) -> Result<CommandExecution>;

    /// 按 id 升序
    async fn list_commands_by_session(&self, session_id: &str) -> Result<Vec<CommandExecution>>;
}
