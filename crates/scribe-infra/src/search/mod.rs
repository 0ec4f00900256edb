//! Search index implementations - Elasticsearch and in-memory fallback.

mod memory;

pub use memory::InMemorySearchIndex;

#[cfg(feature = "elasticsearch")]
mod elastic;
#[cfg(feature = "elasticsearch")]
pub use elastic::{ElasticsearchConfig, ElasticsearchIndex};
