//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod cache;
mod job_queue;
mod repository;
mod search;

pub use cache::{Cache, CacheError};
pub use job_queue::{Job, JobHandler, JobQueue, JobQueueError, JobResult, QueueStats, job_handler};
pub use repository::PostRepository;
pub use search::{RELATED_LIMIT, SearchError, SearchIndex};
