use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;
pub mod traits;

pub use backend::SeaOrmStorage;
pub use models::{
    CommandExecution, CommandResult, NewUser, Paste, SessionState, ShortUrl, TerminalSession, User,
};
pub use traits::{PasteStore, SessionStore, ShortUrlStore, UserStore};

pub struct StorageFactory;

impl StorageFactory {
    /// 按 `[database]` 配置创建存储（后端类型从 URL 推断）
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<SeaOrmStorage>> {
        let storage = SeaOrmStorage::new(&config.database_url, config).await?;
        Ok(Arc::new(storage))
    }
}
