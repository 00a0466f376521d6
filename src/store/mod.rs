//! URL storage
//!
//! `Store` maps short codes to long URLs. Two backends:
//! - `MemoryStore`: DashMap, lost on restart
//! - `DatabaseStore`: sea-orm over SQLite / MySQL / PostgreSQL

mod database;
mod memory;

use std::sync::Arc;

use tracing::{error, warn};

use crate::config::StorageConfig;
use crate::errors::{Result, UrlxError};

pub use database::{DatabaseStore, infer_backend_from_url};
pub use memory::MemoryStore;

#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Inserts or overwrites the mapping for `short`.
    async fn set(&self, short: &str, long: &str) -> Result<()>;
    async fn get(&self, short: &str) -> Result<Option<String>>;
    /// Removing an unknown code is not an error.
    async fn delete(&self, short: &str) -> Result<()>;
    fn backend_name(&self) -> &'static str;
}

pub struct StoreFactory;

impl StoreFactory {
    /// 按配置创建存储后端
    ///
    /// backend 未设置时：配置了 database_url 用数据库，否则用内存
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn Store>> {
        let database_url = config
            .database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty());

        let backend = match config.backend.as_deref() {
            Some(backend) => backend.to_ascii_lowercase(),
            None if database_url.is_some() => "database".to_string(),
            None => "memory".to_string(),
        };

        match backend.as_str() {
            "memory" => {
                warn!("Using in-memory store, links are lost on restart");
                Ok(Arc::new(MemoryStore::new()) as Arc<dyn Store>)
            }
            "database" => {
                let url = database_url.ok_or_else(|| {
                    UrlxError::database_config("storage.backend = database requires DATABASE_URL")
                })?;
                let store = DatabaseStore::connect(url, config.pool_size).await?;
                Ok(Arc::new(store) as Arc<dyn Store>)
            }
            other => {
                error!("Unknown store backend: {}", other);
                Err(UrlxError::config(format!(
                    "Unknown store backend: {}. Supported: memory, database",
                    other
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_factory_defaults_to_memory() {
        let store = StoreFactory::create(&StorageConfig::default()).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_factory_rejects_unknown_backend() {
        let config = StorageConfig {
            backend: Some("redis".to_string()),
            ..StorageConfig::default()
        };
        assert!(matches!(
            StoreFactory::create(&config).await,
            Err(UrlxError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_factory_database_without_url() {
        let config = StorageConfig {
            backend: Some("database".to_string()),
            database_url: Some("   ".to_string()),
            ..StorageConfig::default()
        };
        assert!(matches!(
            StoreFactory::create(&config).await,
            Err(UrlxError::DatabaseConfig(_))
        ));
    }
}
