//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /posts` and `PUT /posts/{id}`.
///
/// Missing `title` or `content` decode as empty strings so the service can
/// answer with its own validation message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A post as returned by create and get.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_posts: Vec<RelatedPostResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedPostResponse {
    pub id: i32,
    pub title: String,
    pub tags: Vec<String>,
}

/// Tag search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedPostResponse {
    pub id: i32,
    pub title: String,
    pub tags: Vec<String>,
}

/// Full-text search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPostResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub score: f64,
}

/// Search result listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub posts: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(posts: Vec<T>) -> Self {
        Self {
            total: posts.len(),
            posts,
        }
    }
}

/// Query string of `GET /posts/search-by-tag`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagQuery {
    #[serde(default)]
    pub tag: String,
}

/// Query string of `GET /posts/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}
