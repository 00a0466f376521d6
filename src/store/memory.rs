use dashmap::DashMap;

use super::Store;
use crate::errors::Result;

/// In-process store.
#[derive(Default)]
pub struct MemoryStore {
    urls: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn set(&self, short: &str, long: &str) -> Result<()> {
        self.urls.insert(short.to_string(), long.to_string());
        Ok(())
    }

    async fn get(&self, short: &str) -> Result<Option<String>> {
        Ok(self.urls.get(short).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, short: &str) -> Result<()> {
        self.urls.remove(short);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
