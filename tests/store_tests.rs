//! Store 集成测试（内存 + SQLite）

use std::sync::Arc;

use tempfile::TempDir;

use urlx::config::StorageConfig;
use urlx::store::{DatabaseStore, MemoryStore, Store, StoreFactory};

fn sqlite_url(dir: &TempDir, name: &str) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join(name).display())
}

async fn exercise(store: Arc<dyn Store>) {
    assert!(store.get("abc123").await.unwrap().is_none());

    store.set("abc123", "https://example.com/one").await.unwrap();
    assert_eq!(
        store.get("abc123").await.unwrap().as_deref(),
        Some("https://example.com/one")
    );

    // 覆盖写入
    store.set("abc123", "https://example.com/two").await.unwrap();
    assert_eq!(
        store.get("abc123").await.unwrap().as_deref(),
        Some("https://example.com/two")
    );

    store.delete("abc123").await.unwrap();
    assert!(store.get("abc123").await.unwrap().is_none());

    // 删除不存在的短码不报错
    store.delete("abc123").await.unwrap();
}

#[tokio::test]
async fn test_memory_store_contract() {
    exercise(Arc::new(MemoryStore::new())).await;
}

#[tokio::test]
async fn test_sqlite_store_contract() {
    let dir = TempDir::new().unwrap();
    let store = DatabaseStore::connect(&sqlite_url(&dir, "contract.db"), 5)
        .await
        .unwrap();
    assert_eq!(store.kind(), "sqlite");
    exercise(Arc::new(store)).await;
}

#[tokio::test]
async fn test_sqlite_store_persists_across_connections() {
    let dir = TempDir::new().unwrap();
    let url = sqlite_url(&dir, "persist.db");

    {
        let store = DatabaseStore::connect(&url, 5).await.unwrap();
        store.set("keep01", "https://example.com/kept").await.unwrap();
    }

    let store = DatabaseStore::connect(&url, 5).await.unwrap();
    assert_eq!(
        store.get("keep01").await.unwrap().as_deref(),
        Some("https://example.com/kept")
    );
}

#[tokio::test]
async fn test_factory_picks_database_when_url_set() {
    let dir = TempDir::new().unwrap();
    let config = StorageConfig {
        database_url: Some(sqlite_url(&dir, "factory.db")),
        ..StorageConfig::default()
    };

    let store = StoreFactory::create(&config).await.unwrap();
    assert_eq!(store.backend_name(), "database");
}

#[tokio::test]
async fn test_factory_explicit_memory_ignores_url() {
    let config = StorageConfig {
        backend: Some("Memory".to_string()),
        database_url: Some("postgres://nobody@localhost/none".to_string()),
        ..StorageConfig::default()
    };

    let store = StoreFactory::create(&config).await.unwrap();
    assert_eq!(store.backend_name(), "memory");
}

#[tokio::test]
async fn test_unparseable_database_url() {
    assert!(DatabaseStore::connect("ftp://example.com/db", 5).await.is_err());
}
