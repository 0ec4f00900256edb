//! Services - orchestration over the ports.

pub mod indexing;
mod post_cache;
mod posts;

pub use indexing::{INDEX_JOB_TYPE, IndexTask};
pub use post_cache::{POST_CACHE_TTL, PostCache};
pub use posts::PostService;
