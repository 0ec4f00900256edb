//! In-memory search index - used when no Elasticsearch is configured.
//!
//! Scores documents by term frequency, weighting title hits twice as much as
//! content hits. Good enough for development and tests, not a relevance model.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use scribe_core::domain::{Post, RelatedPost, ScoredPost};
use scribe_core::ports::{RELATED_LIMIT, SearchError, SearchIndex};

const TITLE_WEIGHT: f64 = 2.0;

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// In-memory search index keyed by post id.
#[derive(Default)]
pub struct InMemorySearchIndex {
    documents: RwLock<BTreeMap<i32, Post>>,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The indexed document for `id`, if any.
    pub async fn document(&self, id: i32) -> Option<Post> {
        self.documents.read().await.get(&id).cloned()
    }

    fn score(post: &Post, terms: &[String]) -> f64 {
        let count = |text: &str| -> f64 {
            tokenize(text).filter(|t| terms.contains(t)).count() as f64
        };
        count(&post.title) * TITLE_WEIGHT + count(&post.content)
    }
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn ensure_schema(&self) -> Result<(), SearchError> {
        Ok(())
    }

    async fn upsert(&self, post: &Post) -> Result<(), SearchError> {
        self.documents.write().await.insert(post.id, post.clone());
        Ok(())
    }

    async fn full_text_search(&self, query: &str) -> Result<Vec<ScoredPost>, SearchError> {
        let terms: Vec<String> = tokenize(query).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let documents = self.documents.read().await;
        let mut hits: Vec<ScoredPost> = documents
            .values()
            .filter_map(|post| {
                let score = Self::score(post, &terms);
                (score > 0.0).then(|| ScoredPost {
                    post: post.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.post.id.cmp(&b.post.id)));
        Ok(hits)
    }

    async fn find_related(
        &self,
        exclude_id: i32,
        tags: &[String],
    ) -> Result<Vec<RelatedPost>, SearchError> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let documents = self.documents.read().await;
        let mut related: Vec<(usize, RelatedPost)> = documents
            .values()
            .filter(|post| post.id != exclude_id)
            .filter_map(|post| {
                let shared = post.tags.iter().filter(|t| tags.contains(t)).count();
                (shared > 0).then(|| {
                    (
                        shared,
                        RelatedPost {
                            id: post.id,
                            title: post.title.clone(),
                            tags: post.tags.clone(),
                        },
                    )
                })
            })
            .collect();

        related.sort_by(|(a_shared, a), (b_shared, b)| b_shared.cmp(a_shared).then(a.id.cmp(&b.id)));
        Ok(related
            .into_iter()
            .take(RELATED_LIMIT)
            .map(|(_, post)| post)
            .collect())
    }

    async fn ping(&self) -> Result<(), SearchError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: i32, title: &str, content: &str, tags: &[&str]) -> Post {
        Post {
            id,
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_document() {
        let index = InMemorySearchIndex::new();
        index
            .upsert(&post(1, "Old", "alpha", &["a", "b"]))
            .await
            .unwrap();
        index.upsert(&post(1, "New", "beta", &[])).await.unwrap();

        let doc = index.document(1).await.unwrap();
        assert_eq!(doc.title, "New");
        assert!(doc.tags.is_empty());
        assert!(index.full_text_search("alpha").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_text_ranks_title_above_content() {
        let index = InMemorySearchIndex::new();
        index
            .upsert(&post(1, "Notes", "tokio runtime internals", &[]))
            .await
            .unwrap();
        index
            .upsert(&post(2, "Tokio tips", "scheduling", &[]))
            .await
            .unwrap();
        index
            .upsert(&post(3, "Unrelated", "nothing here", &[]))
            .await
            .unwrap();

        let hits = index.full_text_search("Tokio").await.unwrap();
        let ids: Vec<i32> = hits.iter().map(|h| h.post.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_related_excludes_self_and_requires_overlap() {
        let index = InMemorySearchIndex::new();
        for (id, tags) in [
            (1, vec!["go", "backend"]),
            (2, vec!["go"]),
            (3, vec!["frontend"]),
            (4, vec!["backend", "go"]),
        ] {
            index.upsert(&post(id, "t", "c", &tags)).await.unwrap();
        }

        let tags = vec!["go".to_string(), "backend".to_string()];
        let related = index.find_related(1, &tags).await.unwrap();
        let ids: Vec<i32> = related.iter().map(|r| r.id).collect();

        assert_eq!(ids, vec![4, 2]);
        assert!(related.iter().all(|r| r.overlaps(&tags)));
        assert!(index.find_related(1, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_related_is_capped() {
        let index = InMemorySearchIndex::new();
        for id in 1..=10 {
            index.upsert(&post(id, "t", "c", &["shared"])).await.unwrap();
        }

        let related = index
            .find_related(1, &["shared".to_string()])
            .await
            .unwrap();
        assert_eq!(related.len(), RELATED_LIMIT);
    }
}
