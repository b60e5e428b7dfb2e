use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{model_to_paste, paste_to_active_model};
use super::retry::{map_db_err, with_retry, with_write_retry};
use crate::errors::{Result, ToolbeltError};
use crate::storage::models::Paste;
use crate::storage::traits::PasteStore;

use migration::entities::paste;

#[async_trait]
impl PasteStore for SeaOrmStorage {
    async fn insert_paste(&self, record: Paste) -> Result<Paste> {
        let db = &self.db;
        let active = paste_to_active_model(&record);

        let model = with_write_retry("insert_paste", self.retry_config, || {
            let active = active.clone();
            async move { active.insert(db).await }
        })
        .await
        .map_err(|e| map_db_err("insert_paste", e))?;

        Ok(model_to_paste(model))
    }

    async fn get_paste(&self, id: &str) -> Result<Paste> {
        let db = &self.db;

        let model = with_retry(&format!("get_paste({})", id), self.retry_config, || async {
            paste::Entity::find_by_id(id).one(db).await
        })
        .await
        .map_err(|e| map_db_err("get_paste", e))?;

        model
            .map(model_to_paste)
            .ok_or_else(|| ToolbeltError::not_found(format!("Paste '{}' not found", id)))
    }

    async fn delete_paste(&self, id: &str, caller: Option<i64>) -> Result<()> {
        let db = &self.db;

        // 一条 DELETE 同时完成存在性与所有权判断：无主记录任何人可删
        let owner_matches = Condition::any()
            .add(paste::Column::OwnerId.is_null())
            .add_option(caller.map(|uid| paste::Column::OwnerId.eq(uid)));

        let result = with_write_retry(&format!("delete_paste({})", id), self.retry_config, || {
            let owner_matches = owner_matches.clone();
            async move {
                paste::Entity::delete_many()
                    .filter(paste::Column::Id.eq(id))
                    .filter(owner_matches)
                    .exec(db)
                    .await
            }
        })
        .await
        .map_err(|e| map_db_err("delete_paste", e))?;

        if result.rows_affected == 0 {
            // 区分“不存在”与“不是你的”
            return match self.get_paste(id).await {
                Ok(_) => Err(ToolbeltError::forbidden(format!(
                    "Paste '{}' belongs to another user",
                    id
                ))),
                Err(e) => Err(e),
            };
        }

        info!("Paste deleted: {}", id);
        Ok(())
    }

    async fn purge_expired_pastes(&self, now: DateTime<Utc>) -> Result<u64> {
        let db = &self.db;

        let result = with_retry("purge_expired_pastes", self.retry_config, || async {
            paste::Entity::delete_many()
                .filter(paste::Column::ExpiresAt.is_not_null())
                .filter(paste::Column::ExpiresAt.lte(now))
                .exec(db)
                .await
        })
        .await
        .map_err(|e| map_db_err("purge_expired_pastes", e))?;

        debug!("Purged {} expired pastes", result.rows_affected);
        Ok(result.rows_affected)
    }
}
