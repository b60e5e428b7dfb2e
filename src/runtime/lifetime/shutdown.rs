use tokio::signal;
use tracing::{info, warn};

/// 等待 Ctrl+C（unix 下另监听 SIGTERM）
pub async fn listen_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal as unix_signal};

        match unix_signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    res = signal::ctrl_c() => log_ctrl_c(res),
                    _ = sigterm.recv() => info!("SIGTERM received, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                log_ctrl_c(signal::ctrl_c().await);
            }
        }
    }

    #[cfg(not(unix))]
    log_ctrl_c(signal::ctrl_c().await);
}

fn log_ctrl_c(res: std::io::Result<()>) {
    match res {
        Ok(()) => info!("Shutdown signal received, shutting down..."),
        Err(e) => warn!(
            "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
            e
        ),
    }
}
