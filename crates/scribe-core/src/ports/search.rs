//! Search index port - full-text and tag-similarity queries.

use async_trait::async_trait;

use crate::domain::{Post, RelatedPost, ScoredPost};

/// Maximum number of related posts returned by `find_related`.
pub const RELATED_LIMIT: usize = 5;

/// Search index trait - abstraction over search backends (Elasticsearch, in-memory).
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Create the post document schema. Succeeds if it already exists.
    async fn ensure_schema(&self) -> Result<(), SearchError>;

    /// Replace the document for `post.id`. Visible to queries once this returns.
    async fn upsert(&self, post: &Post) -> Result<(), SearchError>;

    /// Relevance-ranked match of `query` against title and content.
    async fn full_text_search(&self, query: &str) -> Result<Vec<ScoredPost>, SearchError>;

    /// Up to `RELATED_LIMIT` posts sharing at least one of `tags`, never `exclude_id`.
    /// Empty `tags` yields an empty result without querying the backend.
    async fn find_related(
        &self,
        exclude_id: i32,
        tags: &[String],
    ) -> Result<Vec<RelatedPost>, SearchError>;

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<(), SearchError>;
}

/// Search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Search backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Failed to decode search response: {0}")]
    Decode(String),
}
