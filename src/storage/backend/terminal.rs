use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, EntityTrait,
    QueryFilter, QueryOrder, sea_query::Expr,
};
use tracing::debug;

use super::SeaOrmStorage;
use super::converters::{model_to_command, model_to_session, session_to_active_model};
use super::retry::{map_db_err, with_retry, with_write_retry};
use crate::errors::{Result, ToolbeltError};
use crate::storage::models::{CommandExecution, CommandResult, SessionState, TerminalSession};
use crate::storage::traits::SessionStore;

use migration::entities::{terminal_command, terminal_session};

#[async_trait]
impl SessionStore for SeaOrmStorage {
    async fn insert_session(&self, session: TerminalSession) -> Result<TerminalSession> {
        let db = &self.db;
        let active = session_to_active_model(&session);

        let model = with_write_retry("insert_session", self.retry_config, || {
            let active = active.clone();
            async move { active.insert(db).await }
        })
        .await
        .map_err(|e| map_db_err("insert_session", e))?;

        model_to_session(model)
    }

    async fn get_session(&self, session_id: &str) -> Result<TerminalSession> {
        let db = &self.db;

        let model = with_retry(
            &format!("get_session({})", session_id),
            self.retry_config,
            || async { terminal_session::Entity::find_by_id(session_id).one(db).await },
        )
        .await
        .map_err(|e| map_db_err("get_session", e))?
        .ok_or_else(|| ToolbeltError::not_found(format!("Session '{}' not found", session_id)))?;

        model_to_session(model)
    }

    async fn mark_session_closed(
        &self,
        session_id: &str,
        closed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let db = &self.db;

        // 条件更新：只有 open 状态的会话会被关闭
        let result = with_write_retry(
            &format!("mark_session_closed({})", session_id),
            self.retry_config,
            || async {
                terminal_session::Entity::update_many()
                    .col_expr(
                        terminal_session::Column::State,
                        Expr::value(SessionState::Closed.as_ref()),
                    )
                    .col_expr(terminal_session::Column::ClosedAt, Expr::value(closed_at))
                    .filter(terminal_session::Column::SessionId.eq(session_id))
                    .filter(terminal_session::Column::State.eq(SessionState::Open.as_ref()))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| map_db_err("mark_session_closed", e))?;

        Ok(result.rows_affected > 0)
    }

    async fn insert_command(
        &self,
        session_id: &str,
        owner_id: i64,
        command: &str,
        result: &CommandResult,
        executed_at: DateTime<Utc>,
    ) -> Result<CommandExecution> {
        let db = &self.db;
        let active = terminal_command::ActiveModel {
            id: NotSet,
            session_id: Set(session_id.to_string()),
            owner_id: Set(owner_id),
            command: Set(command.to_string()),
            result: Set(serde_json::to_string(result)?),
            executed_at: Set(executed_at),
        };

        let model = with_write_retry("insert_command", self.retry_config, || {
            let active = active.clone();
            async move { active.insert(db).await }
        })
        .await
        .map_err(|e| map_db_err("insert_command", e))?;

        debug!("Command #{} recorded for session {}", model.id, session_id);
        model_to_command(model)
    }

    async fn list_commands_by_session(&self, session_id: &str) -> Result<Vec<CommandExecution>> {
        let db = &self.db;

        let models = with_retry(
            &format!("list_commands_by_session({})", session_id),
            self.retry_config,
            || async {
                terminal_command::Entity::find()
                    .filter(terminal_command::Column::SessionId.eq(session_id))
                    .order_by_asc(terminal_command::Column::Id)
                    .all(db)
                    .await
            },
        )
        .await
        .map_err(|e| map_db_err("list_commands_by_session", e))?;

        let commands = models
            .into_iter()
            .map(model_to_command)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Loaded {} commands for session {}",
            commands.len(),
            session_id
        );
        Ok(commands)
    }
}
