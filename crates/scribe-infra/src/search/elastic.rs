//! Elasticsearch search index over the REST API.
//!
//! Request bodies follow the Query DSL; responses are decoded into typed
//! documents and rejected when fields or scores have unexpected types.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use scribe_core::domain::{Post, RelatedPost, ScoredPost};
use scribe_core::ports::{RELATED_LIMIT, SearchError, SearchIndex};

/// Elasticsearch connection configuration.
#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    /// Base URL (e.g., http://localhost:9200)
    pub url: String,
    /// Index holding post documents
    pub index: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ElasticsearchConfig {
    /// Load configuration from environment variables.
    /// Returns `None` when `ELASTICSEARCH_URL` is unset.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("ELASTICSEARCH_URL").ok()?;
        Some(Self {
            url,
            index: std::env::var("SEARCH_INDEX").unwrap_or_else(|_| "posts".to_string()),
            timeout: Duration::from_secs(
                std::env::var("SEARCH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        })
    }
}

/// Stored document. Field names are the index mapping's.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PostDocument {
    id: i32,
    title: String,
    content: String,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<&Post> for PostDocument {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            tags: post.tags.clone(),
            created_at: post.created_at,
        }
    }
}

impl From<PostDocument> for Post {
    fn from(doc: PostDocument) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            content: doc.content,
            tags: doc.tags,
            created_at: doc.created_at,
        }
    }
}

/// `_source`-filtered projection returned by the related-posts query.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RelatedDocument {
    id: i32,
    title: String,
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    hits: HitsEnvelope<T>,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope<T> {
    hits: Vec<Hit<T>>,
}

#[derive(Debug, Deserialize)]
struct Hit<T> {
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source")]
    source: T,
}

fn index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": {"type": "integer"},
                "title": {"type": "text"},
                "content": {"type": "text"},
                "tags": {"type": "keyword"},
                "created_at": {"type": "date"}
            }
        }
    })
}

fn full_text_query(query: &str) -> Value {
    json!({
        "query": {
            "multi_match": {
                "query": query,
                "fields": ["title", "content"]
            }
        },
        "track_total_hits": true
    })
}

fn related_query(exclude_id: i32, tags: &[String]) -> Value {
    let should: Vec<Value> = tags
        .iter()
        .map(|tag| json!({"term": {"tags": tag}}))
        .collect();

    json!({
        "query": {
            "bool": {
                "should": should,
                "must_not": {"term": {"id": exclude_id}},
                "minimum_should_match": 1
            }
        },
        "_source": ["id", "title", "tags"],
        "size": RELATED_LIMIT
    })
}

/// Elasticsearch-backed search index.
pub struct ElasticsearchIndex {
    base_url: String,
    index: String,
    http: reqwest::Client,
}

impl ElasticsearchIndex {
    pub fn new(config: &ElasticsearchConfig) -> Result<Self, SearchError> {
        let base_url = config.url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(SearchError::Connection("ELASTICSEARCH_URL is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SearchError::Connection(e.to_string()))?;

        Ok(Self {
            base_url,
            index: config.index.clone(),
            http,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.http.request(method, url)
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<(StatusCode, String), SearchError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| SearchError::Connection(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SearchError::Connection(e.to_string()))?;
        Ok((status, body))
    }

    async fn search<T: DeserializeOwned>(&self, body: &Value) -> Result<Vec<Hit<T>>, SearchError> {
        let (status, text) = self
            .send(
                self.request(Method::POST, &format!("/{}/_search", self.index))
                    .json(body),
            )
            .await?;
        if !status.is_success() {
            return Err(backend_error(status, text));
        }

        let parsed: SearchResponse<T> =
            serde_json::from_str(&text).map_err(|e| SearchError::Decode(e.to_string()))?;
        Ok(parsed.hits.hits)
    }
}

fn backend_error(status: StatusCode, body: String) -> SearchError {
    SearchError::Backend {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn ensure_schema(&self) -> Result<(), SearchError> {
        let (status, body) = self
            .send(
                self.request(Method::PUT, &format!("/{}", self.index))
                    .json(&index_mapping()),
            )
            .await?;

        if status.is_success() {
            tracing::info!(index = %self.index, "Search index created");
            return Ok(());
        }
        if body.contains("resource_already_exists_exception") {
            tracing::debug!(index = %self.index, "Search index already exists");
            return Ok(());
        }
        Err(backend_error(status, body))
    }

    async fn upsert(&self, post: &Post) -> Result<(), SearchError> {
        let (status, body) = self
            .send(
                self.request(Method::PUT, &format!("/{}/_doc/{}", self.index, post.id))
                    .query(&[("refresh", "true")])
                    .json(&PostDocument::from(post)),
            )
            .await?;

        if !status.is_success() {
            return Err(backend_error(status, body));
        }
        tracing::debug!(post_id = post.id, "Document indexed successfully");
        Ok(())
    }

    async fn full_text_search(&self, query: &str) -> Result<Vec<ScoredPost>, SearchError> {
        self.search::<PostDocument>(&full_text_query(query))
            .await?
            .into_iter()
            .map(|hit| {
                let score = hit
                    .score
                    .ok_or_else(|| SearchError::Decode("hit without _score".to_string()))?;
                Ok(ScoredPost {
                    post: hit.source.into(),
                    score,
                })
            })
            .collect()
    }

    async fn find_related(
        &self,
        exclude_id: i32,
        tags: &[String],
    ) -> Result<Vec<RelatedPost>, SearchError> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let hits = self
            .search::<RelatedDocument>(&related_query(exclude_id, tags))
            .await?;

        Ok(hits
            .into_iter()
            .map(|hit| RelatedPost {
                id: hit.source.id,
                title: hit.source.title,
                tags: hit.source.tags,
            })
            .filter(|related| related.id != exclude_id && related.overlaps(tags))
            .take(RELATED_LIMIT)
            .collect())
    }

    async fn ping(&self) -> Result<(), SearchError> {
        let (status, body) = self.send(self.request(Method::GET, "/")).await?;
        if !status.is_success() {
            return Err(backend_error(status, body));
        }
        tracing::info!(url = %self.base_url, "Connected to Elasticsearch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{any, body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn index_for(server: &MockServer) -> ElasticsearchIndex {
        ElasticsearchIndex::new(&ElasticsearchConfig {
            url: server.uri(),
            index: "posts".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn sample_post() -> Post {
        Post {
            id: 1,
            title: "Getting Started with Go".to_string(),
            content: "Goroutines and channels".to_string(),
            tags: vec!["golang".to_string(), "backend".to_string()],
            created_at: "2025-01-02T03:04:05Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_related_query_shape() {
        let query = related_query(7, &["rust".to_string(), "db".to_string()]);
        assert_eq!(query["size"], 5);
        assert_eq!(query["query"]["bool"]["minimum_should_match"], 1);
        assert_eq!(query["query"]["bool"]["must_not"]["term"]["id"], 7);
        assert_eq!(
            query["query"]["bool"]["should"],
            json!([{"term": {"tags": "rust"}}, {"term": {"tags": "db"}}])
        );
    }

    #[tokio::test]
    async fn test_ensure_schema_tolerates_existing_index() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"type": "resource_already_exists_exception"},
                "status": 400
            })))
            .expect(1)
            .mount(&server)
            .await;

        index_for(&server).ensure_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_schema_surfaces_other_errors() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = index_for(&server).ensure_schema().await.unwrap_err();
        assert!(matches!(err, SearchError::Backend { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_upsert_replaces_document_with_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/posts/_doc/1"))
            .and(query_param("refresh", "true"))
            .and(body_json(json!({
                "id": 1,
                "title": "Getting Started with Go",
                "content": "Goroutines and channels",
                "tags": ["golang", "backend"],
                "created_at": "2025-01-02T03:04:05Z"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"result": "created"})))
            .expect(1)
            .mount(&server)
            .await;

        index_for(&server).upsert(&sample_post()).await.unwrap();
    }

    #[tokio::test]
    async fn test_full_text_search_decodes_scored_hits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/posts/_search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": {
                    "total": {"value": 1, "relation": "eq"},
                    "hits": [{
                        "_index": "posts",
                        "_id": "1",
                        "_score": 1.25,
                        "_source": {
                            "id": 1,
                            "title": "Getting Started with Go",
                            "content": "Goroutines and channels",
                            "tags": ["golang", "backend"],
                            "created_at": "2025-01-02T03:04:05Z"
                        }
                    }]
                }
            })))
            .mount(&server)
            .await;

        let hits = index_for(&server)
            .full_text_search("channels")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, 1.25);
        assert_eq!(hits[0].post, sample_post());
    }

    #[tokio::test]
    async fn test_full_text_search_rejects_malformed_score() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/posts/_search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": {"hits": [{
                    "_score": "high",
                    "_source": {
                        "id": 1, "title": "t", "content": "c",
                        "tags": [], "created_at": "2025-01-02T03:04:05Z"
                    }
                }]}
            })))
            .mount(&server)
            .await;

        let err = index_for(&server).full_text_search("t").await.unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_find_related_without_tags_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let related = index_for(&server).find_related(1, &[]).await.unwrap();
        assert!(related.is_empty());
    }

    #[tokio::test]
    async fn test_find_related_filters_excluded_and_unrelated_hits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/posts/_search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": {"hits": [
                    {"_score": 2.0, "_source": {"id": 1, "title": "self", "tags": ["golang"]}},
                    {"_score": 1.5, "_source": {"id": 2, "title": "peer", "tags": ["golang"]}},
                    {"_score": 1.0, "_source": {"id": 3, "title": "stray", "tags": ["css"]}}
                ]}
            })))
            .mount(&server)
            .await;

        let related = index_for(&server)
            .find_related(1, &["golang".to_string()])
            .await
            .unwrap();

        assert_eq!(related.len(), 1);
        assert_eq!(related[0].id, 2);
    }
}
