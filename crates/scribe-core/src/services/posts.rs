//! Post service - read/write orchestration across the post store, the cache,
//! and the search index.
//!
//! Consistency policy:
//! - The post store is the source of truth. Only its failures reach callers.
//! - Cache failures degrade to the store path and are logged, never returned.
//! - Search propagation runs on the indexing queue after the write responds.
//!   Its failures are logged, never returned, never retried.
//! - Concurrent updates of one post are last-writer-wins at the row level.

use std::sync::Arc;

use crate::domain::{Post, PostDraft, PostWithRelated, RelatedPost, ScoredPost, TaggedPost};
use crate::error::DomainError;
use crate::ports::{JobHandler, JobQueue, JobQueueError, PostRepository, SearchIndex};
use crate::services::indexing::{IndexTask, index_job_handler};
use crate::services::post_cache::PostCache;

/// Orchestrates post reads and writes over the three stores.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    cache: PostCache,
    search: Arc<dyn SearchIndex>,
    indexer: Arc<dyn JobQueue>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        cache: PostCache,
        search: Arc<dyn SearchIndex>,
        indexer: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            posts,
            cache,
            search,
            indexer,
        }
    }

    /// Handler to register on the indexing queue's workers.
    pub fn indexing_handler(&self) -> JobHandler {
        index_job_handler(self.posts.clone(), self.search.clone())
    }

    /// Create a post with its audit row, then schedule indexing.
    ///
    /// Returns before the search index sees the post.
    pub async fn create_post(&self, draft: PostDraft) -> Result<Post, DomainError> {
        draft.validate().map_err(DomainError::Validation)?;

        let post = self.posts.create_with_audit(draft).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to create post");
            DomainError::from(e)
        })?;

        tracing::info!(post_id = post.id, "Post created");
        self.schedule_indexing(IndexTask::Index { post: post.clone() })
            .await;

        Ok(post)
    }

    /// Cache-aside read of a post, augmented with tag-related posts.
    pub async fn get_post(&self, id: i32) -> Result<PostWithRelated, DomainError> {
        let post = match self.cache.get(id).await {
            Ok(Some(post)) => {
                tracing::debug!(post_id = id, "Cache hit");
                post
            }
            Ok(None) => {
                tracing::debug!(post_id = id, "Cache miss");
                self.load_and_populate(id).await?
            }
            Err(e) => {
                tracing::warn!(post_id = id, error = %e, "Cache read failed, falling back to store");
                self.load_and_populate(id).await?
            }
        };

        let related = self.related_posts(&post).await;
        Ok(PostWithRelated { post, related })
    }

    /// Replace a post's fields, invalidate its cache entry, then schedule a
    /// reindex from the committed row.
    pub async fn update_post(&self, id: i32, draft: PostDraft) -> Result<(), DomainError> {
        draft.validate().map_err(DomainError::Validation)?;

        self.posts.update(id, draft).await.map_err(|e| {
            let err = DomainError::from_repo(e, id);
            if matches!(err, DomainError::Store(_)) {
                tracing::error!(post_id = id, error = %err, "Failed to update post");
            }
            err
        })?;

        // Invalidation is synchronous so by-id reads never see the old row.
        match self.cache.invalidate(id).await {
            Ok(()) => tracing::debug!(post_id = id, "Cache invalidated"),
            Err(e) => tracing::warn!(post_id = id, error = %e, "Failed to invalidate cache"),
        }

        self.schedule_indexing(IndexTask::Reindex { post_id: id })
            .await;
        Ok(())
    }

    /// Exact tag membership search against the post store.
    pub async fn search_by_tag(&self, tag: &str) -> Result<Vec<TaggedPost>, DomainError> {
        if tag.is_empty() {
            return Err(DomainError::Validation(
                "Tag parameter is required".to_string(),
            ));
        }

        self.posts.find_by_tag(tag).await.map_err(|e| {
            tracing::error!(tag, error = %e, "Failed to search posts by tag");
            DomainError::from(e)
        })
    }

    /// Full-text search against the search index.
    pub async fn search(&self, query: &str) -> Result<Vec<ScoredPost>, DomainError> {
        if query.is_empty() {
            return Err(DomainError::Validation(
                "Query parameter is required".to_string(),
            ));
        }

        self.search.full_text_search(query).await.map_err(|e| {
            tracing::error!(query, error = %e, "Failed to search posts");
            DomainError::Store(e.to_string())
        })
    }

    async fn load_and_populate(&self, id: i32) -> Result<Post, DomainError> {
        let post = self
            .posts
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::from_repo(e, id))?;

        // A concurrent update may invalidate between the read above and this
        // write, leaving a stale entry until the TTL expires.
        if let Err(e) = self.cache.set(&post).await {
            tracing::warn!(post_id = id, error = %e, "Failed to cache post");
        }

        Ok(post)
    }

    async fn related_posts(&self, post: &Post) -> Vec<RelatedPost> {
        match self.search.find_related(post.id, &post.tags).await {
            Ok(related) => related,
            Err(e) => {
                tracing::warn!(post_id = post.id, error = %e, "Related posts unavailable");
                Vec::new()
            }
        }
    }

    async fn schedule_indexing(&self, task: IndexTask) {
        let post_id = task.post_id();
        let job = match task.into_job() {
            Ok(job) => job,
            Err(e) => {
                tracing::error!(post_id, error = %e, "Failed to encode index task");
                return;
            }
        };

        match self.indexer.enqueue(job).await {
            Ok(()) => {}
            Err(JobQueueError::QueueFull) => {
                tracing::warn!(post_id, "Indexing queue full, dropping index task");
            }
            Err(e) => {
                tracing::error!(post_id, error = %e, "Failed to schedule indexing");
            }
        }
    }
}
