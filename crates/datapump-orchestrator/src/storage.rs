//! Object storage seam.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

/// Object storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage backend outage.
    #[error("Object storage unavailable: {0}")]
    Unavailable(String),
}

/// A stored object as seen by the retention sweeper.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    /// Object name within its bucket.
    pub name: String,

    /// Creation time from object metadata.
    pub created_at: DateTime<Utc>,
}

/// Bucketed object storage, the minimum surface retention needs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List a bucket's objects. Unknown buckets list as empty.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<StoredObject>, StorageError>;

    /// Delete one object. Deleting a missing object is a no-op.
    async fn delete_object(&self, bucket: &str, name: &str) -> Result<(), StorageError>;
}

/// In-memory object store.
#[derive(Default)]
pub struct InMemoryObjectStore {
    buckets: RwLock<HashMap<String, HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an object with an explicit creation time.
    pub async fn put_object(&self, bucket: &str, name: &str, created_at: DateTime<Utc>) {
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default()
            .insert(name.to_string(), created_at);
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn list_objects(&self, bucket: &str) -> Result<Vec<StoredObject>, StorageError> {
        let buckets = self.buckets.read().await;
        Ok(buckets
            .get(bucket)
            .map(|objects| {
                objects
                    .iter()
                    .map(|(name, created_at)| StoredObject {
                        name: name.clone(),
                        created_at: *created_at,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete_object(&self, bucket: &str, name: &str) -> Result<(), StorageError> {
        if let Some(objects) = self.buckets.write().await.get_mut(bucket) {
            objects.remove(name);
        }
        Ok(())
    }
}
