use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ExprTrait, QueryFilter,
    sea_query::Expr,
};
use tracing::{debug, info, trace};

use super::SeaOrmStorage;
use super::converters::{model_to_short_url, short_url_to_active_model};
use super::retry::{map_db_err, with_retry, with_write_retry};
use crate::errors::{Result, ToolbeltError};
use crate::storage::models::ShortUrl;
use crate::storage::traits::ShortUrlStore;

use migration::entities::short_url;

#[async_trait]
impl ShortUrlStore for SeaOrmStorage {
    async fn insert_short_url(&self, record: ShortUrl) -> Result<ShortUrl> {
        let db = &self.db;
        let active = short_url_to_active_model(&record);

        let model = with_write_retry("insert_short_url", self.retry_config, || {
            let active = active.clone();
            async move { active.insert(db).await }
        })
        .await
        .map_err(|e| map_db_err("insert_short_url", e))?;

        Ok(model_to_short_url(model))
    }

    async fn get_short_url(&self, short_id: &str) -> Result<ShortUrl> {
        let db = &self.db;

        let model = with_retry(
            &format!("get_short_url({})", short_id),
            self.retry_config,
            || async { short_url::Entity::find_by_id(short_id).one(db).await },
        )
        .await
        .map_err(|e| map_db_err("get_short_url", e))?;

        model
            .map(model_to_short_url)
            .ok_or_else(|| ToolbeltError::not_found(format!("Short URL '{}' not found", short_id)))
    }

    async fn increment_hit_count(&self, short_id: &str) -> Result<()> {
        let db = &self.db;

        // UPDATE short_urls SET hit_count = hit_count + 1 WHERE short_id = ?
        let result = with_write_retry(
            &format!("increment_hit_count({})", short_id),
            self.retry_config,
            || async {
                short_url::Entity::update_many()
                    .col_expr(
                        short_url::Column::HitCount,
                        Expr::col(short_url::Column::HitCount).add(1),
                    )
                    .filter(short_url::Column::ShortId.eq(short_id))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| map_db_err("increment_hit_count", e))?;

        if result.rows_affected == 0 {
            return Err(ToolbeltError::not_found(format!(
                "Short URL '{}' not found",
                short_id
            )));
        }

        trace!("hit_count incremented for {}", short_id);
        Ok(())
    }

    async fn delete_short_url(&self, short_id: &str, caller: Option<i64>) -> Result<()> {
        let db = &self.db;

        let owner_matches = Condition::any()
            .add(short_url::Column::OwnerId.is_null())
            .add_option(caller.map(|uid| short_url::Column::OwnerId.eq(uid)));

        let result = with_write_retry(
            &format!("delete_short_url({})", short_id),
            self.retry_config,
            || {
                let owner_matches = owner_matches.clone();
                async move {
                    short_url::Entity::delete_many()
                        .filter(short_url::Column::ShortId.eq(short_id))
                        .filter(owner_matches)
                        .exec(db)
                        .await
                }
            },
        )
        .await
        .map_err(|e| map_db_err("delete_short_url", e))?;

        if result.rows_affected == 0 {
            return match self.get_short_url(short_id).await {
                Ok(_) => Err(ToolbeltError::forbidden(format!(
                    "Short URL '{}' belongs to another user",
                    short_id
                ))),
                Err(e) => Err(e),
            };
        }

        info!("Short URL deleted: {}", short_id);
        Ok(())
    }

    async fn purge_expired_short_urls(&self, now: DateTime<Utc>) -> Result<u64> {
        let db = &self.db;

        let result = with_retry("purge_expired_short_urls", self.retry_config, || async {
            short_url::Entity::delete_many()
                .filter(short_url::Column::ExpiresAt.is_not_null())
                .filter(short_url::Column::ExpiresAt.lte(now))
                .exec(db)
                .await
        })
        .await
        .map_err(|e| map_db_err("purge_expired_short_urls", e))?;

        debug!("Purged {} expired short URLs", result.rows_affected);
        Ok(result.rows_affected)
    }
}
