//! Server mode
//!
//! Starts the HTTP server, waits for Ctrl+C, stops accepting requests and
//! then drains the log shipper.

use std::time::Duration;

use actix_web::{App, HttpServer, middleware::Compress, web};
use anyhow::Result;
use tracing::{info, warn};

use crate::api;
use crate::api::middleware::RequestLogger;
use crate::config::StaticConfig;
use crate::logging::Logger;
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: the local log sink must be initialized before calling this
/// function. The logger is drained before it returns.
pub async fn run_server(config: &StaticConfig, logger: Logger) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(config)
        .await
        .inspect_err(|e| {
            logger.error(
                "Server startup failed",
                &[("error", serde_json::json!(e.to_string()))],
            )
        })?;

    let store = startup.store.clone();
    let shortener = startup.shortener.clone();
    let ui_page = startup.ui_page.clone();
    let app_logger = logger.clone();

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(RequestLogger::new(app_logger.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(shortener.clone()))
            .app_data(web::Data::new(app_logger.clone()))
            .app_data(web::Data::new(ui_page.clone()))
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .configure(api::configure)
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .disable_signals();

    if let Some(workers) = config.server.workers {
        server = server.workers(workers.clamp(1, 32));
    }

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    logger.info(
        "Starting server",
        &[("address", serde_json::json!(bind_address))],
    );

    let server = server.bind(&bind_address)?.run();
    let handle = server.handle();

    actix_web::rt::spawn(async move {
        lifetime::shutdown::wait_for_signal().await;
        handle.stop(true).await;
    });

    server.await?;
    info!("HTTP server stopped");

    lifetime::shutdown::drain_logger(&logger).await;
    Ok(())
}
