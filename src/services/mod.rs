//! Service layer for business logic
//!
//! HTTP 处理器只调用这里的服务；服务只依赖 `storage::traits` 中的抽象。

mod paste_service;
pub mod terminal;
mod url_service;
mod user_service;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::api::jwt::JwtService;
use crate::config::StaticConfig;
use crate::errors::{Result, ToolbeltError};
use crate::ids::IdPolicy;
use crate::storage::SeaOrmStorage;

pub use paste_service::PasteService;
pub use terminal::{SessionLocks, TerminalService};
pub use url_service::UrlService;
pub use user_service::UserService;

/// 把 TTL 换算为过期时间
///
/// `None` 表示不过期；0 与超过 `max_ttl_secs`（非 0 时）的值无效
pub(crate) fn expiry_from_ttl(
    now: DateTime<Utc>,
    ttl_secs: Option<u64>,
    max_ttl_secs: u64,
) -> Result<Option<DateTime<Utc>>> {
    let Some(ttl) = ttl_secs else {
        return Ok(None);
    };

    if ttl == 0 {
        return Err(ToolbeltError::invalid_input("ttl_secs must be positive"));
    }
    if max_ttl_secs > 0 && ttl > max_ttl_secs {
        return Err(ToolbeltError::invalid_input(format!(
            "ttl_secs must not exceed {}",
            max_ttl_secs
        )));
    }

    i64::try_from(ttl)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .map(Some)
        .ok_or_else(|| ToolbeltError::invalid_input("ttl_secs is out of range"))
}

/// 所有服务的集合，启动时构建一次，在 HTTP worker 间共享
#[derive(Clone)]
pub struct AppServices {
    pub storage: Arc<SeaOrmStorage>,
    pub pastes: Arc<PasteService>,
    pub urls: Arc<UrlService>,
    pub terminal: Arc<TerminalService>,
    pub users: Arc<UserService>,
    pub jwt: Arc<JwtService>,
}

impl AppServices {
    pub fn new(storage: Arc<SeaOrmStorage>, jwt: Arc<JwtService>, config: &StaticConfig) -> Self {
        let short_ids = IdPolicy::short_ids(&config.ids);
        let executor = terminal::build_executor(&config.terminal);

        let pastes = PasteService::new(storage.clone(), short_ids, config.limits.clone());
        let urls = UrlService::new(storage.clone(), short_ids, config.limits.clone());
        let terminal = TerminalService::new(
            storage.clone(),
            executor,
            Arc::new(SessionLocks::new()),
            IdPolicy::session_ids(&config.ids),
            config.terminal.max_command_length,
        );
        let users = UserService::new(storage.clone(), jwt.clone());

        Self {
            storage,
            pastes: Arc::new(pastes),
            urls: Arc::new(urls),
            terminal: Arc::new(terminal),
            users: Arc::new(users),
            jwt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_from_ttl() {
        let now = Utc::now();
        assert_eq!(expiry_from_ttl(now, None, 60).unwrap(), None);
        assert_eq!(
            expiry_from_ttl(now, Some(30), 60).unwrap(),
            Some(now + Duration::seconds(30))
        );
        assert!(expiry_from_ttl(now, Some(0), 60).is_err());
        assert!(expiry_from_ttl(now, Some(61), 60).is_err());
        // 0 表示不设上限
        assert!(expiry_from_ttl(now, Some(10_000_000), 0).is_ok());
        assert!(expiry_from_ttl(now, Some(u64::MAX), 0).is_err());
    }
}
