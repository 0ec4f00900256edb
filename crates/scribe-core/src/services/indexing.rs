//! Background propagation of post writes into the search index.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::Post;
use crate::ports::{Job, JobHandler, JobResult, PostRepository, SearchIndex, job_handler};

/// Job type for all search-index propagation tasks.
pub const INDEX_JOB_TYPE: &str = "search.index_post";

/// A unit of search-index propagation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexTask {
    /// Index the post exactly as committed by a create.
    Index { post: Post },
    /// Re-read the post from the store, then index it. Used after updates so
    /// the document reflects the committed row, not the request body.
    Reindex { post_id: i32 },
}

impl IndexTask {
    pub fn post_id(&self) -> i32 {
        match self {
            IndexTask::Index { post } => post.id,
            IndexTask::Reindex { post_id } => *post_id,
        }
    }

    /// Wrap the task in a job. Indexing is never retried.
    pub fn into_job(self) -> Result<Job, serde_json::Error> {
        Ok(Job::new(INDEX_JOB_TYPE, serde_json::to_value(self)?))
    }
}

/// Build the queue handler that executes `IndexTask`s.
pub fn index_job_handler(
    posts: Arc<dyn PostRepository>,
    search: Arc<dyn SearchIndex>,
) -> JobHandler {
    job_handler(move |job: Job| {
        let posts = posts.clone();
        let search = search.clone();
        async move { run_index_job(posts.as_ref(), search.as_ref(), job).await }
    })
}

async fn run_index_job(posts: &dyn PostRepository, search: &dyn SearchIndex, job: Job) -> JobResult {
    if job.job_type != INDEX_JOB_TYPE {
        return JobResult::Failed(format!("unknown job type {}", job.job_type));
    }

    let task: IndexTask = match serde_json::from_value(job.payload) {
        Ok(task) => task,
        Err(e) => return JobResult::Failed(format!("malformed index task: {e}")),
    };
    let post_id = task.post_id();

    let post = match task {
        IndexTask::Index { post } => post,
        IndexTask::Reindex { post_id } => match posts.find_by_id(post_id).await {
            Ok(post) => post,
            Err(e) => {
                tracing::error!(post_id, error = %e, "Failed to get post for indexing");
                return JobResult::Failed(e.to_string());
            }
        },
    };

    match search.upsert(&post).await {
        Ok(()) => {
            tracing::debug!(post_id, "Document indexed");
            JobResult::Success
        }
        Err(e) => {
            tracing::error!(post_id, error = %e, "Failed to index post");
            JobResult::Failed(e.to_string())
        }
    }
}
