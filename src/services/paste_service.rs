//! Paste service
//!
//! 文本片段的创建、读取与删除。读取不做权限检查，持有 id 即可访问。

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::LimitsConfig;
use crate::errors::{Result, ToolbeltError};
use crate::ids::{IdPolicy, with_unique_id};
use crate::services::expiry_from_ttl;
use crate::storage::{Paste, PasteStore};

pub struct PasteService {
    store: Arc<dyn PasteStore>,
    ids: IdPolicy,
    limits: LimitsConfig,
}

impl PasteService {
    pub fn new(store: Arc<dyn PasteStore>, ids: IdPolicy, limits: LimitsConfig) -> Self {
        Self { store, ids, limits }
    }

    /// 创建 paste
    ///
    /// 内容为空或超过 `max_paste_bytes` 时返回 `InvalidInput`。
    /// `ttl_secs` 为 `None` 表示永不过期。
    pub async fn create_paste(
        &self,
        content: String,
        owner_id: Option<i64>,
        ttl_secs: Option<u64>,
    ) -> Result<Paste> {
        if content.is_empty() {
            return Err(ToolbeltError::invalid_input("Paste content cannot be empty"));
        }
        if content.len() > self.limits.max_paste_bytes {
            return Err(ToolbeltError::invalid_input(format!(
                "Paste content is {} bytes, limit is {}",
                content.len(),
                self.limits.max_paste_bytes
            )));
        }

        let now = Utc::now();
        let expires_at = expiry_from_ttl(now, ttl_secs, self.limits.max_ttl_secs)?;

        let paste = with_unique_id("paste", self.ids, |id| {
            let record = Paste {
                id,
                content: content.clone(),
                owner_id,
                created_at: now,
                expires_at,
            };
            self.store.insert_paste(record)
        })
        .await?;

        info!(
            "PasteService: created paste '{}' ({} bytes, owner {:?})",
            paste.id,
            paste.content.len(),
            paste.owner_id
        );
        Ok(paste)
    }

    /// 读取 paste；已过期视为不存在
    pub async fn get_paste(&self, id: &str) -> Result<Paste> {
        let paste = self.store.get_paste(id).await?;
        if paste.is_expired() {
            debug!("PasteService: paste '{}' has expired", id);
            return Err(ToolbeltError::not_found(format!("Paste '{}' not found", id)));
        }
        Ok(paste)
    }

    /// 删除 paste
    ///
    /// 有主的 paste 只能由主人删除；匿名 paste 任何调用方都可删除。
    pub async fn delete_paste(&self, id: &str, owner_id: Option<i64>) -> Result<()> {
        self.store.delete_paste(id, owner_id).await?;
        info!("PasteService: deleted paste '{}'", id);
        Ok(())
    }

    /// 清理过期 paste
    pub async fn purge_expired(&self) -> Result<u64> {
        self.store.purge_expired_pastes(Utc::now()).await
    }
}
