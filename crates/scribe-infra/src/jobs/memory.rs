//! In-memory job queue implementation.
//!
//! A bounded channel drained by a fixed pool of worker tasks. When the channel
//! is full, `enqueue` rejects the new job instead of waiting, so producers are
//! never blocked and the number of in-flight jobs never exceeds
//! `max_size + workers`.
//! Note: Jobs are lost on server restart.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;

use scribe_core::ports::{Job, JobHandler, JobQueue, JobQueueError, JobResult, QueueStats};

/// In-memory job queue configuration.
#[derive(Debug, Clone)]
pub struct InMemoryJobQueueConfig {
    /// Channel capacity. Jobs beyond it are rejected.
    pub max_size: usize,
    /// Number of worker tasks.
    pub workers: usize,
    /// How long `shutdown` waits for queued jobs to drain.
    pub drain_timeout: Duration,
}

impl Default for InMemoryJobQueueConfig {
    fn default() -> Self {
        Self {
            max_size: 1024,
            workers: 4,
            drain_timeout: Duration::from_secs(10),
        }
    }
}

impl InMemoryJobQueueConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_size: std::env::var("JOB_QUEUE_MAX_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_size),
            workers: std::env::var("JOB_QUEUE_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.workers),
            drain_timeout: std::env::var("JOB_QUEUE_DRAIN_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.drain_timeout),
        }
    }
}

/// In-memory job queue.
pub struct InMemoryJobQueue {
    stats: Arc<JobStats>,
    config: InMemoryJobQueueConfig,
    /// `None` once the queue is shut down.
    job_sender: RwLock<Option<mpsc::Sender<Job>>>,
    job_receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

#[derive(Debug, Default)]
struct JobStats {
    pending: AtomicUsize,
    processing: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    rejected: AtomicUsize,
}

impl InMemoryJobQueue {
    pub fn new(config: InMemoryJobQueueConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.max_size.max(1));

        Self {
            stats: Arc::new(JobStats::default()),
            config,
            job_sender: RwLock::new(Some(tx)),
            job_receiver: Arc::new(Mutex::new(rx)),
            workers: Mutex::new(Vec::new()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(InMemoryJobQueueConfig::from_env())
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: Job) -> Result<(), JobQueueError> {
        let sender = self.job_sender.read().await;
        let Some(sender) = sender.as_ref() else {
            return Err(JobQueueError::Closed);
        };

        // Count before sending so a fast worker never decrements below zero.
        self.stats.pending.fetch_add(1, Ordering::Relaxed);
        match sender.try_send(job) {
            Ok(()) => {
                tracing::debug!(
                    pending = self.stats.pending.load(Ordering::Relaxed),
                    "Job enqueued"
                );
                Ok(())
            }
            Err(TrySendError::Full(job)) => {
                self.stats.pending.fetch_sub(1, Ordering::Relaxed);
                self.stats.rejected.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(job_id = %job.id, job_type = %job.job_type, "Job queue full, job rejected");
                Err(JobQueueError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => {
                self.stats.pending.fetch_sub(1, Ordering::Relaxed);
                Err(JobQueueError::Closed)
            }
        }
    }

    async fn start_worker(&self, handler: JobHandler) -> Result<(), JobQueueError> {
        if self.job_sender.read().await.is_none() {
            return Err(JobQueueError::Closed);
        }
        let handler = Arc::new(handler);
        let mut workers = self.workers.lock().await;

        for worker_id in 0..self.config.workers {
            let handler = handler.clone();
            let receiver = self.job_receiver.clone();
            let stats = self.stats.clone();

            workers.push(tokio::spawn(async move {
                tracing::info!("Job worker {} started", worker_id);

                loop {
                    let job = {
                        let mut rx = receiver.lock().await;
                        rx.recv().await
                    };

                    let Some(job) = job else {
                        tracing::info!("Job worker {} shutting down", worker_id);
                        break;
                    };

                    stats.pending.fetch_sub(1, Ordering::Relaxed);
                    stats.processing.fetch_add(1, Ordering::Relaxed);

                    tracing::debug!(
                        worker = worker_id,
                        job_id = %job.id,
                        job_type = %job.job_type,
                        "Processing job"
                    );

                    let job_id = job.id.clone();
                    let result = handler(job).await;

                    stats.processing.fetch_sub(1, Ordering::Relaxed);

                    match result {
                        JobResult::Success => {
                            stats.completed.fetch_add(1, Ordering::Relaxed);
                            tracing::debug!(job_id = %job_id, "Job completed successfully");
                        }
                        JobResult::Failed(reason) => {
                            stats.failed.fetch_add(1, Ordering::Relaxed);
                            tracing::error!(job_id = %job_id, reason = %reason, "Job failed");
                        }
                    }
                }
            }));
        }

        Ok(())
    }

    async fn shutdown(&self) -> Result<(), JobQueueError> {
        // Dropping the sender lets workers drain the channel and then exit.
        if self.job_sender.write().await.take().is_none() {
            return Ok(());
        }

        let workers: Vec<_> = self.workers.lock().await.drain(..).collect();
        tracing::info!(workers = workers.len(), "Draining job queue");

        let aborts: Vec<_> = workers.iter().map(|w| w.abort_handle()).collect();
        match tokio::time::timeout(self.config.drain_timeout, futures::future::join_all(workers))
            .await
        {
            Ok(_) => {
                tracing::info!("Job queue drained");
                Ok(())
            }
            Err(_) => {
                aborts.iter().for_each(|a| a.abort());
                let pending = self.stats.pending.load(Ordering::Relaxed);
                tracing::warn!(pending, "Job queue drain timed out, abandoning jobs");
                Err(JobQueueError::Backend(format!(
                    "drain timed out with {pending} pending jobs"
                )))
            }
        }
    }

    async fn stats(&self) -> Result<QueueStats, JobQueueError> {
        Ok(QueueStats {
            pending: self.stats.pending.load(Ordering::Relaxed),
            processing: self.stats.processing.load(Ordering::Relaxed),
            completed: self.stats.completed.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
            rejected: self.stats.rejected.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::ports::job_handler;
    use std::sync::atomic::AtomicU32;

    fn queue(max_size: usize, workers: usize) -> InMemoryJobQueue {
        InMemoryJobQueue::new(InMemoryJobQueueConfig {
            max_size,
            workers,
            drain_timeout: Duration::from_secs(5),
        })
    }

    #[tokio::test]
    async fn test_rejects_new_jobs_when_full() {
        let queue = queue(2, 1);

        // No workers yet, so nothing drains the channel.
        queue.enqueue(Job::new("t", serde_json::json!(1))).await.unwrap();
        queue.enqueue(Job::new("t", serde_json::json!(2))).await.unwrap();
        let err = queue
            .enqueue(Job::new("t", serde_json::json!(3)))
            .await
            .unwrap_err();

        assert!(matches!(err, JobQueueError::QueueFull));
        let stats = queue.stats().await.unwrap();
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.rejected, 1);
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_jobs() {
        let queue = queue(16, 2);
        let seen = Arc::new(AtomicU32::new(0));

        for i in 0..5 {
            queue.enqueue(Job::new("t", serde_json::json!(i))).await.unwrap();
        }

        let counter = seen.clone();
        queue
            .start_worker(job_handler(move |_job| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    JobResult::Success
                }
            }))
            .await
            .unwrap();

        queue.shutdown().await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 5);
        assert_eq!(queue.stats().await.unwrap().completed, 5);
        assert!(matches!(
            queue.enqueue(Job::new("t", serde_json::json!(6))).await,
            Err(JobQueueError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_failed_jobs_run_once() {
        let queue = queue(4, 1);
        let calls = Arc::new(AtomicU32::new(0));

        let counter = calls.clone();
        queue
            .start_worker(job_handler(move |_job| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    JobResult::Failed("boom".to_string())
                }
            }))
            .await
            .unwrap();

        queue
            .enqueue(Job::new("t", serde_json::Value::Null))
            .await
            .unwrap();
        queue.shutdown().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(queue.stats().await.unwrap().failed, 1);
    }
}
