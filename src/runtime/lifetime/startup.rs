use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::jwt::JwtService;
use crate::config::StaticConfig;
use crate::services::AppServices;
use crate::storage::{SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub services: AppServices,
}

/// 准备服务器启动的上下文
/// 包括存储连接、迁移、JWT 与各业务服务
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let jwt = Arc::new(JwtService::from_config(&config.auth));
    let services = AppServices::new(storage.clone(), jwt, config);

    if config.terminal.allowed_programs.is_empty()
        && config.terminal.executor == crate::config::ExecutorKind::Process
    {
        warn!("Process executor enabled with an empty allowlist, every command will be rejected");
    }

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext { storage, services })
}
