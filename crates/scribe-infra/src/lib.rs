//! # Scribe Infrastructure
//!
//! Concrete implementations of the ports defined in `scribe-core`.
//! This crate contains the post store, cache, search index, and job queue
//! integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL post store via SeaORM
//! - `redis` - Redis post cache
//! - `elasticsearch` - Elasticsearch search index over HTTP

pub mod cache;
pub mod database;
pub mod jobs;
pub mod search;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use database::{DatabaseConfig, InMemoryPostRepository};
pub use jobs::{InMemoryJobQueue, InMemoryJobQueueConfig};
pub use search::InMemorySearchIndex;

// Re-exports - External stores
#[cfg(feature = "postgres")]
pub use database::PostgresPostRepository;
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
#[cfg(feature = "elasticsearch")]
pub use search::{ElasticsearchConfig, ElasticsearchIndex};
