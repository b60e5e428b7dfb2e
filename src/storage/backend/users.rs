use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter};
use tracing::info;

use super::SeaOrmStorage;
use super::converters::{model_to_user, new_user_to_active_model};
use super::retry::{map_db_err, with_retry, with_write_retry};
use crate::errors::Result;
use crate::storage::models::{NewUser, User};
use crate::storage::traits::UserStore;

use migration::entities::user;

#[async_trait]
impl UserStore for SeaOrmStorage {
    async fn insert_user(&self, new_user: NewUser) -> Result<User> {
        let db = &self.db;
        let active = new_user_to_active_model(new_user, Utc::now());

        let model = with_write_retry("insert_user", self.retry_config, || {
            let active = active.clone();
            async move { active.insert(db).await }
        })
        .await
        .map_err(|e| map_db_err("insert_user", e))?;

        info!("User created: {} (id {})", model.username, model.id);
        Ok(model_to_user(model))
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let db = &self.db;

        let model = with_retry("get_user_by_id", self.retry_config, || async {
            user::Entity::find_by_id(id).one(db).await
        })
        .await
        .map_err(|e| map_db_err("get_user_by_id", e))?;

        Ok(model.map(model_to_user))
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>> {
        let db = &self.db;

        let model = with_retry("find_user_by_login", self.retry_config, || async {
            user::Entity::find()
                .filter(
                    Condition::any()
                        .add(user::Column::Username.eq(login))
                        .add(user::Column::Email.eq(login)),
                )
                .one(db)
                .await
        })
        .await
        .map_err(|e| map_db_err("find_user_by_login", e))?;

        Ok(model.map(model_to_user))
    }
}
