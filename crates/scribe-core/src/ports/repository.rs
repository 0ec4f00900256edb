use async_trait::async_trait;

use crate::domain::{Post, PostDraft, TaggedPost};
use crate::error::RepoError;

/// Post repository - the transactional source of truth.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post and its `new_post` activity-log row in one transaction.
    ///
    /// Rejects an empty title or content with `RepoError::Constraint`. If any
    /// statement fails the whole transaction is rolled back.
    async fn create_with_audit(&self, draft: PostDraft) -> Result<Post, RepoError>;

    /// Find a post by id. `RepoError::NotFound` when no row matches.
    async fn find_by_id(&self, id: i32) -> Result<Post, RepoError>;

    /// Replace title, content, and tags. Last writer wins.
    async fn update(&self, id: i32, draft: PostDraft) -> Result<(), RepoError>;

    /// Posts whose tag array contains `tag` exactly, ordered by id.
    async fn find_by_tag(&self, tag: &str) -> Result<Vec<TaggedPost>, RepoError>;
}
