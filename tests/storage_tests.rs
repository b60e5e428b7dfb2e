//! SeaOrmStorage 集成测试（SQLite 临时库）

use chrono::{Duration, Utc};
use tempfile::TempDir;

use toolbelt::config::DatabaseConfig;
use toolbelt::errors::{ErrorKind, ToolbeltError};
use toolbelt::storage::{
    CommandResult, NewUser, Paste, PasteStore, SeaOrmStorage, SessionState, SessionStore,
    ShortUrl, ShortUrlStore, TerminalSession, UserStore,
};

async fn setup() -> (SeaOrmStorage, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("storage_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = SeaOrmStorage::new(&db_url, &DatabaseConfig::default())
        .await
        .expect("Failed to create storage");
    (storage, temp_dir)
}

async fn insert_user(storage: &SeaOrmStorage, name: &str) -> i64 {
    storage
        .insert_user(NewUser {
            email: format!("{}@example.com", name),
            username: name.to_string(),
            password_hash: "hash".to_string(),
        })
        .await
        .expect("Failed to insert user")
        .id
}

fn paste(id: &str, owner_id: Option<i64>) -> Paste {
    Paste {
        id: id.to_string(),
        content: "hello".to_string(),
        owner_id,
        created_at: Utc::now(),
        expires_at: None,
    }
}

fn short_url(short_id: &str, owner_id: Option<i64>) -> ShortUrl {
    ShortUrl {
        short_id: short_id.to_string(),
        target_url: "https://example.com/".to_string(),
        owner_id,
        created_at: Utc::now(),
        expires_at: None,
        hit_count: 0,
    }
}

fn session(session_id: &str, owner_id: i64) -> TerminalSession {
    TerminalSession {
        session_id: session_id.to_string(),
        owner_id,
        name: None,
        state: SessionState::Open,
        created_at: Utc::now(),
        closed_at: None,
    }
}

#[tokio::test]
async fn test_backend_name_and_health() {
    let (storage, _dir) = setup().await;
    assert_eq!(storage.backend_name(), "sqlite");
    assert!(storage.health_check().await.is_ok());
}

#[tokio::test]
async fn test_users_unique_and_lookup() {
    let (storage, _dir) = setup().await;
    let id = insert_user(&storage, "alice").await;

    let by_name = storage.find_user_by_login("alice").await.unwrap().unwrap();
    let by_email = storage
        .find_user_by_login("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_name.id, id);
    assert_eq!(by_email.id, id);
    assert!(storage.find_user_by_login("bob").await.unwrap().is_none());
    assert!(storage.get_user_by_id(id + 100).await.unwrap().is_none());

    let dup = storage
        .insert_user(NewUser {
            email: "other@example.com".to_string(),
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
        })
        .await;
    assert!(matches!(dup, Err(ToolbeltError::Conflict(_))));
}

#[tokio::test]
async fn test_paste_insert_does_not_overwrite() {
    let (storage, _dir) = setup().await;
    storage.insert_paste(paste("abc", None)).await.unwrap();

    let mut other = paste("abc", None);
    other.content = "replaced".to_string();
    let err = storage.insert_paste(other).await.unwrap_err();
    assert!(err.is_conflict());

    assert_eq!(storage.get_paste("abc").await.unwrap().content, "hello");
}

#[tokio::test]
async fn test_paste_delete_ownership() {
    let (storage, _dir) = setup().await;
    let alice = insert_user(&storage, "alice").await;
    let bob = insert_user(&storage, "bob").await;

    storage.insert_paste(paste("owned", Some(alice))).await.unwrap();
    storage.insert_paste(paste("anon", None)).await.unwrap();

    let err = storage.delete_paste("owned", Some(bob)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    let err = storage.delete_paste("owned", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert!(storage.get_paste("owned").await.is_ok());

    storage.delete_paste("owned", Some(alice)).await.unwrap();
    storage.delete_paste("anon", Some(bob)).await.unwrap();

    let err = storage.delete_paste("owned", Some(alice)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_purge_expired_records() {
    let (storage, _dir) = setup().await;
    let now = Utc::now();

    let mut expired = paste("old", None);
    expired.expires_at = Some(now - Duration::seconds(10));
    let mut live = paste("new", None);
    live.expires_at = Some(now + Duration::hours(1));
    storage.insert_paste(expired).await.unwrap();
    storage.insert_paste(live).await.unwrap();
    storage.insert_paste(paste("forever", None)).await.unwrap();

    let mut expired_url = short_url("oldurl", None);
    expired_url.expires_at = Some(now - Duration::seconds(10));
    storage.insert_short_url(expired_url).await.unwrap();
    storage.insert_short_url(short_url("newurl", None)).await.unwrap();

    assert_eq!(storage.purge_expired_pastes(now).await.unwrap(), 1);
    assert_eq!(storage.purge_expired_short_urls(now).await.unwrap(), 1);
    assert!(storage.get_paste("old").await.is_err());
    assert!(storage.get_paste("new").await.is_ok());
    assert!(storage.get_paste("forever").await.is_ok());
    assert!(storage.get_short_url("newurl").await.is_ok());
}

#[tokio::test]
async fn test_increment_hit_count() {
    let (storage, _dir) = setup().await;
    storage.insert_short_url(short_url("hits", None)).await.unwrap();

    for _ in 0..3 {
        storage.increment_hit_count("hits").await.unwrap();
    }
    assert_eq!(storage.get_short_url("hits").await.unwrap().hit_count, 3);

    let err = storage.increment_hit_count("missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_session_close_is_conditional() {
    let (storage, _dir) = setup().await;
    let alice = insert_user(&storage, "alice").await;
    storage.insert_session(session("sess1", alice)).await.unwrap();

    assert!(storage.mark_session_closed("sess1", Utc::now()).await.unwrap());
    assert!(!storage.mark_session_closed("sess1", Utc::now()).await.unwrap());

    let loaded = storage.get_session("sess1").await.unwrap();
    assert_eq!(loaded.state, SessionState::Closed);
    assert!(loaded.closed_at.is_some());
}

#[tokio::test]
async fn test_commands_listed_in_order() {
    let (storage, _dir) = setup().await;
    let alice = insert_user(&storage, "alice").await;
    storage.insert_session(session("sess1", alice)).await.unwrap();
    storage.insert_session(session("sess2", alice)).await.unwrap();

    for cmd in ["one", "two", "three"] {
        storage
            .insert_command("sess1", alice, cmd, &CommandResult::output(cmd), Utc::now())
            .await
            .unwrap();
    }
    storage
        .insert_command(
            "sess2",
            alice,
            "other",
            &CommandResult::error("nope"),
            Utc::now(),
        )
        .await
        .unwrap();

    let commands = storage.list_commands_by_session("sess1").await.unwrap();
    let names: Vec<&str> = commands.iter().map(|c| c.command.as_str()).collect();
    assert_eq!(names, vec!["one", "two", "three"]);
    assert!(commands.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(commands[1].result, CommandResult::output("two"));

    let other = storage.list_commands_by_session("sess2").await.unwrap();
    assert_eq!(other.len(), 1);
    assert_eq!(other[0].result, CommandResult::error("nope"));
}
