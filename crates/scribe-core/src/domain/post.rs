use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity - the unit of storage, caching, and indexing.
///
/// `id` and `created_at` are assigned by the post store and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Project the post into the summary shape used for tag listings.
    pub fn to_tagged(&self) -> TaggedPost {
        TaggedPost {
            id: self.id,
            title: self.title.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Whether the post carries `tag` exactly (case-sensitive membership).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// The mutable fields of a post, as submitted for create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags,
        }
    }

    /// Title and content must be non-empty. Tags are free-form.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.is_empty() || self.content.is_empty() {
            return Err("Title and content are required".to_string());
        }
        Ok(())
    }
}

/// Audit row written in the same transaction as a post insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: i32,
    pub action: String,
    pub post_id: i32,
    pub logged_at: DateTime<Utc>,
}

impl ActivityLogEntry {
    /// Action label recorded for every successful post creation.
    pub const NEW_POST: &'static str = "new_post";
}

/// Post summary returned by exact tag search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedPost {
    pub id: i32,
    pub title: String,
    pub tags: Vec<String>,
}

/// Tag-similar post computed from the search index. Never persisted or cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedPost {
    pub id: i32,
    pub title: String,
    pub tags: Vec<String>,
}

impl RelatedPost {
    /// Whether this summary shares at least one tag with `tags`.
    pub fn overlaps(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }
}

/// Full-text search hit with the engine's relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPost {
    pub post: Post,
    pub score: f64,
}

/// A post as served by the read path, with its related posts attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostWithRelated {
    pub post: Post,
    pub related: Vec<RelatedPost>,
}
