//! Application state - store lifecycle and the handle shared across handlers.

use std::sync::Arc;

use anyhow::Context;

use scribe_core::ports::{Cache, JobQueue, PostRepository, SearchIndex};
use scribe_core::{PostCache, PostService};
use scribe_infra::{InMemoryCache, InMemoryPostRepository, InMemorySearchIndex};

use crate::config::AppConfig;

#[cfg(feature = "postgres")]
use sea_orm::DatabaseConnection;

/// The three stores, acquired once at startup and released once at shutdown.
pub struct Stores {
    pub posts: Arc<dyn PostRepository>,
    pub cache: Arc<dyn Cache>,
    pub search: Arc<dyn SearchIndex>,
    #[cfg(feature = "postgres")]
    db: Option<DatabaseConnection>,
}

impl Stores {
    /// Connect every configured store.
    ///
    /// If a later store fails, the ones already acquired are released before
    /// the error is returned.
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let mut stores = Self::connect_post_store(config).await?;

        match Self::connect_cache(config).await {
            Ok(cache) => stores.cache = cache,
            Err(e) => {
                stores.close().await;
                return Err(e);
            }
        }

        match Self::connect_search(config).await {
            Ok(search) => stores.search = search,
            Err(e) => {
                stores.close().await;
                return Err(e);
            }
        }

        tracing::info!("Stores initialized");
        Ok(stores)
    }

    /// Build the post service over these stores, indexing through `indexer`.
    pub fn post_service(&self, indexer: Arc<dyn JobQueue>) -> PostService {
        PostService::new(
            self.posts.clone(),
            PostCache::new(self.cache.clone()),
            self.search.clone(),
            indexer,
        )
    }

    /// Release every store handle. Only the database pool holds resources
    /// that need an explicit close.
    pub async fn close(self) {
        #[cfg(feature = "postgres")]
        if let Some(db) = self.db {
            match db.close().await {
                Ok(()) => tracing::info!("Database pool closed"),
                Err(e) => tracing::warn!(error = %e, "Failed to close database pool"),
            }
        }
    }

    fn in_memory_posts() -> Self {
        Self {
            posts: Arc::new(InMemoryPostRepository::new()),
            cache: Arc::new(InMemoryCache::new()),
            search: Arc::new(InMemorySearchIndex::new()),
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    #[cfg(feature = "postgres")]
    async fn connect_post_store(config: &AppConfig) -> anyhow::Result<Self> {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Ok(Self::in_memory_posts());
        };

        let db = scribe_infra::database::connect(db_config)
            .await
            .context("Failed to connect to database")?;

        Ok(Self {
            posts: Arc::new(scribe_infra::PostgresPostRepository::new(db.clone())),
            db: Some(db),
            ..Self::in_memory_posts()
        })
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect_post_store(config: &AppConfig) -> anyhow::Result<Self> {
        if config.database.is_some() {
            tracing::warn!("DATABASE_URL set but postgres feature disabled - using in-memory store");
        } else {
            tracing::info!("Running without database - using in-memory store");
        }
        Ok(Self::in_memory_posts())
    }

    #[cfg(feature = "redis")]
    async fn connect_cache(config: &AppConfig) -> anyhow::Result<Arc<dyn Cache>> {
        let Some(redis_config) = &config.redis else {
            tracing::info!("REDIS_URL not set. Using in-memory cache.");
            return Ok(Arc::new(InMemoryCache::new()));
        };

        match scribe_infra::RedisCache::new(redis_config).await {
            Ok(cache) => Ok(Arc::new(cache)),
            Err(e) if redis_config.fallback_to_memory => {
                tracing::warn!(error = %e, "Redis unavailable. Falling back to in-memory cache.");
                Ok(Arc::new(InMemoryCache::new()))
            }
            Err(e) => Err(e).context("Failed to connect to Redis"),
        }
    }

    #[cfg(not(feature = "redis"))]
    async fn connect_cache(_config: &AppConfig) -> anyhow::Result<Arc<dyn Cache>> {
        tracing::info!("Running without redis feature - using in-memory cache");
        Ok(Arc::new(InMemoryCache::new()))
    }

    #[cfg(feature = "elasticsearch")]
    async fn connect_search(config: &AppConfig) -> anyhow::Result<Arc<dyn SearchIndex>> {
        let Some(search_config) = &config.search else {
            tracing::info!("ELASTICSEARCH_URL not set. Using in-memory search index.");
            return Ok(Arc::new(InMemorySearchIndex::new()));
        };

        let index = scribe_infra::ElasticsearchIndex::new(search_config)
            .context("Failed to build Elasticsearch client")?;
        index
            .ping()
            .await
            .context("Failed to connect to Elasticsearch")?;
        Ok(Arc::new(index))
    }

    #[cfg(not(feature = "elasticsearch"))]
    async fn connect_search(_config: &AppConfig) -> anyhow::Result<Arc<dyn SearchIndex>> {
        tracing::info!("Running without elasticsearch feature - using in-memory search index");
        Ok(Arc::new(InMemorySearchIndex::new()))
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
}

impl AppState {
    pub fn new(posts: PostService) -> Self {
        Self {
            posts: Arc::new(posts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::domain::PostDraft;

    #[tokio::test]
    async fn in_memory_stores_without_urls() {
        let stores = Stores::connect(&AppConfig::in_memory()).await.unwrap();

        let post = stores
            .posts
            .create_with_audit(PostDraft::new("t", "c", vec![]))
            .await
            .unwrap();
        assert_eq!(post.id, 1);
        stores.search.ping().await.unwrap();

        stores.close().await;
    }
}
