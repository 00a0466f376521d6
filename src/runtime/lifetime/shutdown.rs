use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::logging::Logger;

/// 关闭超时时间（秒）
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// 等待 Ctrl+C
pub async fn wait_for_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping server...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}

/// Hands every queued log line to the sink before the process exits.
///
/// The drain blocks on the flush thread, so it runs on the blocking pool
/// and is bounded by [`SHUTDOWN_TIMEOUT_SECS`].
pub async fn drain_logger(logger: &Logger) {
    drain_logger_within(logger, Duration::from_secs(SHUTDOWN_TIMEOUT_SECS)).await;
}

pub async fn drain_logger_within(logger: &Logger, limit: Duration) {
    let logger = logger.clone();
    let drain = tokio::task::spawn_blocking(move || {
        logger.shutdown();
        logger.dropped()
    });

    match timeout(limit, drain).await {
        Ok(Ok(dropped)) => {
            if dropped > 0 {
                warn!("Log shipper dropped {} entries during this run", dropped);
            }
            info!("Log shipper drained");
        }
        Ok(Err(e)) => {
            error!("Log shipper drain task failed: {}", e);
        }
        Err(_) => {
            error!(
                "Log shipper drain timed out after {:?}, remaining entries are lost",
                limit
            );
        }
    }
}
