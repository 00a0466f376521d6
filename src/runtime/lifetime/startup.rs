use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::api::services::UiPage;
use crate::config::StaticConfig;
use crate::shortener::{RandomShortener, Shortener};
use crate::store::{Store, StoreFactory};

/// Everything the HTTP workers share.
pub struct StartupContext {
    pub store: Arc<dyn Store>,
    pub shortener: Arc<dyn Shortener>,
    pub ui_page: UiPage,
}

/// 初始化存储后端、短码生成器和 UI 页面位置
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let store = StoreFactory::create(&config.storage)
        .await
        .context("Failed to initialize store")?;
    info!("Using store backend: {}", store.backend_name());

    let ui_page = UiPage::new(&config.server.ui_path);
    if !ui_page.path().exists() {
        info!(
            "UI page {} not present, GET / will return 404",
            ui_page.path().display()
        );
    }

    Ok(StartupContext {
        store,
        shortener: Arc::new(RandomShortener::new()),
        ui_page,
    })
}
