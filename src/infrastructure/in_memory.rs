use crate::domain::ports::ProfileMedium;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory profile medium.
///
/// Uses `Arc<RwLock<HashMap<String, Vec<u8>>>>` so clones share the same map.
/// Used by tests and by the CLI when no database path is given.
#[derive(Default, Clone)]
pub struct InMemoryProfileMedium {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryProfileMedium {
    /// Creates a new, empty in-memory medium.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileMedium for InMemoryProfileMedium {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn write(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}
