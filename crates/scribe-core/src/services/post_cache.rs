//! Typed post cache on top of a string key-value `Cache` backend.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::Post;
use crate::ports::{Cache, CacheError};

/// Time-to-live for cached posts.
pub const POST_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Post cache keyed by `post:{id}`, storing JSON-serialized posts.
#[derive(Clone)]
pub struct PostCache {
    backend: Arc<dyn Cache>,
    ttl: Duration,
}

impl PostCache {
    pub fn new(backend: Arc<dyn Cache>) -> Self {
        Self::with_ttl(backend, POST_CACHE_TTL)
    }

    pub fn with_ttl(backend: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    pub fn key(id: i32) -> String {
        format!("post:{id}")
    }

    /// `Ok(None)` on a clean miss. An undecodable entry is a cache failure,
    /// not a miss.
    pub async fn get(&self, id: i32) -> Result<Option<Post>, CacheError> {
        let Some(raw) = self.backend.get(&Self::key(id)).await? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CacheError::Serialization(e.to_string()))
    }

    pub async fn set(&self, post: &Post) -> Result<(), CacheError> {
        let raw =
            serde_json::to_string(post).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.backend
            .set(&Self::key(post.id), &raw, Some(self.ttl))
            .await
    }

    pub async fn invalidate(&self, id: i32) -> Result<(), CacheError> {
        self.backend.delete(&Self::key(id)).await
    }
}
