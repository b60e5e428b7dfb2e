use std::str::FromStr;

use sea_orm::ActiveValue::{NotSet, Set};

use crate::errors::{Result, ToolbeltError};
use crate::storage::models::{
    CommandExecution, NewUser, Paste, SessionState, ShortUrl, TerminalSession, User,
};
use migration::entities::{paste, short_url, terminal_command, terminal_session, user};

pub fn model_to_user(model: user::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        username: model.username,
        password_hash: model.password_hash,
        created_at: model.created_at,
    }
}

pub fn new_user_to_active_model(
    user: NewUser,
    created_at: chrono::DateTime<chrono::Utc>,
) -> user::ActiveModel {
    user::ActiveModel {
        id: NotSet,
        email: Set(user.email),
        username: Set(user.username),
        password_hash: Set(user.password_hash),
        created_at: Set(created_at),
    }
}

pub fn model_to_paste(model: paste::Model) -> Paste {
    Paste {
        id: model.id,
        content: model.content,
        owner_id: model.owner_id,
        created_at: model.created_at,
        expires_at: model.expires_at,
    }
}

pub fn paste_to_active_model(paste: &Paste) -> paste::ActiveModel {
    paste::ActiveModel {
        id: Set(paste.id.clone()),
        content: Set(paste.content.clone()),
        owner_id: Set(paste.owner_id),
        created_at: Set(paste.created_at),
        expires_at: Set(paste.expires_at),
    }
}

pub fn model_to_short_url(model: short_url::Model) -> ShortUrl {
    ShortUrl {
        short_id: model.short_id,
        target_url: model.target_url,
        owner_id: model.owner_id,
        created_at: model.created_at,
        expires_at: model.expires_at,
        hit_count: model.hit_count.max(0),
    }
}

pub fn short_url_to_active_model(short_url: &ShortUrl) -> short_url::ActiveModel {
    short_url::ActiveModel {
        short_id: Set(short_url.short_id.clone()),
        target_url: Set(short_url.target_url.clone()),
        owner_id: Set(short_url.owner_id),
        created_at: Set(short_url.created_at),
        expires_at: Set(short_url.expires_at),
        hit_count: Set(short_url.hit_count),
    }
}

pub fn model_to_session(model: terminal_session::Model) -> Result<TerminalSession> {
    let state = SessionState::from_str(&model.state).map_err(|_| {
        ToolbeltError::database_operation(format!(
            "Session '{}' has unknown state '{}'",
            model.session_id, model.state
        ))
    })?;

    Ok(TerminalSession {
        session_id: model.session_id,
        owner_id: model.owner_id,
        name: model.name,
        state,
        created_at: model.created_at,
        closed_at: model.closed_at,
    })
}

pub fn session_to_active_model(session: &TerminalSession) -> terminal_session::ActiveModel {
    terminal_session::ActiveModel {
        session_id: Set(session.session_id.clone()),
        owner_id: Set(session.owner_id),
        name: Set(session.name.clone()),
        state: Set(session.state.as_ref().to_string()),
        created_at: Set(session.created_at),
        closed_at: Set(session.closed_at),
    }
}

pub fn model_to_command(model: terminal_command::Model) -> Result<CommandExecution> {
    let result = serde_json::from_str(&model.result)?;
    Ok(CommandExecution {
        id: model.id,
        session_id: model.session_id,
        owner_id: model.owner_id,
        command: model.command,
        result,
        executed_at: model.executed_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::CommandResult;
    use chrono::Utc;

    #[test]
    fn test_session_state_roundtrip() {
        let session = TerminalSession {
            session_id: "s1".into(),
            owner_id: 42,
            name: Some("build".into()),
            state: SessionState::Closed,
            created_at: Utc::now(),
            closed_at: Some(Utc::now()),
        };
        let active = session_to_active_model(&session);
        assert_eq!(active.state, Set("closed".to_string()));
    }

    #[test]
    fn test_unknown_state_is_an_error() {
        let model = terminal_session::Model {
            session_id: "s1".into(),
            owner_id: 1,
            name: None,
            state: "paused".into(),
            created_at: Utc::now(),
            closed_at: None,
        };
        assert!(model_to_session(model).is_err());
    }

    #[test]
    fn test_command_result_decoded() {
        let model = terminal_command::Model {
            id: 3,
            session_id: "s1".into(),
            owner_id: 42,
            command: "echo hi".into(),
            result: r#"{"kind":"output","stdout":"hi\n"}"#.into(),
            executed_at: Utc::now(),
        };
        let execution = model_to_command(model).unwrap();
        assert_eq!(execution.result, CommandResult::output("hi\n"));
    }

    #[test]
    fn test_negative_hit_count_clamped() {
        let model = short_url::Model {
            short_id: "abc".into(),
            target_url: "https://example.com".into(),
            owner_id: None,
            created_at: Utc::now(),
            expires_at: None,
            hit_count: -3,
        };
        assert_eq!(model_to_short_url(model).hit_count, 0);
    }
}
