//! In-memory post repository - used when no database is configured.
//!
//! A single lock guards posts and the activity log together, so a post and
//! its audit row become visible at the same instant.
//! Note: Data is lost on process restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use scribe_core::domain::{ActivityLogEntry, Post, PostDraft, TaggedPost};
use scribe_core::error::RepoError;
use scribe_core::ports::PostRepository;

#[derive(Default)]
struct Tables {
    posts: BTreeMap<i32, Post>,
    activity_logs: Vec<ActivityLogEntry>,
    next_post_id: i32,
    next_log_id: i32,
}

/// In-memory post repository backed by ordered maps.
#[derive(Default)]
pub struct InMemoryPostRepository {
    tables: RwLock<Tables>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the activity log, in insertion order.
    pub async fn activity_logs(&self) -> Vec<ActivityLogEntry> {
        self.tables.read().await.activity_logs.clone()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create_with_audit(&self, draft: PostDraft) -> Result<Post, RepoError> {
        draft.validate().map_err(RepoError::Constraint)?;

        let mut tables = self.tables.write().await;
        let now = Utc::now();

        tables.next_post_id += 1;
        tables.next_log_id += 1;
        let post = Post {
            id: tables.next_post_id,
            title: draft.title,
            content: draft.content,
            tags: draft.tags,
            created_at: now,
        };
        let log = ActivityLogEntry {
            id: tables.next_log_id,
            action: ActivityLogEntry::NEW_POST.to_string(),
            post_id: post.id,
            logged_at: now,
        };

        tables.posts.insert(post.id, post.clone());
        tables.activity_logs.push(log);

        Ok(post)
    }

    async fn find_by_id(&self, id: i32) -> Result<Post, RepoError> {
        self.tables
            .read()
            .await
            .posts
            .get(&id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn update(&self, id: i32, draft: PostDraft) -> Result<(), RepoError> {
        draft.validate().map_err(RepoError::Constraint)?;

        let mut tables = self.tables.write().await;
        let post = tables.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.title = draft.title;
        post.content = draft.content;
        post.tags = draft.tags;
        Ok(())
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<TaggedPost>, RepoError> {
        Ok(self
            .tables
            .read()
            .await
            .posts
            .values()
            .filter(|post| post.has_tag(tag))
            .map(Post::to_tagged)
            .collect())
    }
}
