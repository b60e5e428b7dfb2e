//! URL shortener service

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, trace};

use crate::config::LimitsConfig;
use crate::errors::{Result, ToolbeltError};
use crate::ids::{IdPolicy, with_unique_id};
use crate::services::expiry_from_ttl;
use crate::storage::{ShortUrl, ShortUrlStore};
use crate::utils::url_validator::validate_url;

pub struct UrlService {
    store: Arc<dyn ShortUrlStore>,
    ids: IdPolicy,
    limits: LimitsConfig,
}

impl UrlService {
    pub fn new(store: Arc<dyn ShortUrlStore>, ids: IdPolicy, limits: LimitsConfig) -> Self {
        Self { store, ids, limits }
    }

    /// 创建短链接
    ///
    /// 同一目标多次创建会得到不同的 short_id，不做去重。
    pub async fn create_short_url(
        &self,
        url: &str,
        owner_id: Option<i64>,
        ttl_secs: Option<u64>,
    ) -> Result<ShortUrl> {
        let target_url =
            validate_url(url).map_err(|e| ToolbeltError::invalid_input(e.to_string()))?;

        let now = Utc::now();
        let expires_at = expiry_from_ttl(now, ttl_secs, self.limits.max_ttl_secs)?;

        let short_url = with_unique_id("short url", self.ids, |short_id| {
            let record = ShortUrl {
                short_id,
                target_url: target_url.clone(),
                owner_id,
                created_at: now,
                expires_at,
                hit_count: 0,
            };
            self.store.insert_short_url(record)
        })
        .await?;

        info!(
            "UrlService: created short URL '{}' -> {}",
            short_url.short_id, short_url.target_url
        );
        Ok(short_url)
    }

    /// 查询短链接信息，不计入点击
    pub async fn get_short_url_info(&self, short_id: &str) -> Result<ShortUrl> {
        let short_url = self.store.get_short_url(short_id).await?;
        if short_url.is_expired() {
            debug!("UrlService: short URL '{}' has expired", short_id);
            return Err(expired(short_id));
        }
        Ok(short_url)
    }

    /// 解析短链接并计数
    ///
    /// 计数在存储层以单条 UPDATE 完成，并发调用不会丢失点击。
    pub async fn redirect_to_original_url(&self, short_id: &str) -> Result<String> {
        let short_url = self.get_short_url_info(short_id).await?;
        self.store.increment_hit_count(short_id).await?;

        trace!("UrlService: redirect {} -> {}", short_id, short_url.target_url);
        Ok(short_url.target_url)
    }

    pub async fn delete_short_url(&self, short_id: &str, owner_id: Option<i64>) -> Result<()> {
        self.store.delete_short_url(short_id, owner_id).await?;
        info!("UrlService: deleted short URL '{}'", short_id);
        Ok(())
    }

    pub async fn purge_expired(&self) -> Result<u64> {
        self.store.purge_expired_short_urls(Utc::now()).await
    }
}

fn expired(short_id: &str) -> ToolbeltError {
    ToolbeltError::not_found(format!("Short URL '{}' not found", short_id))
}
