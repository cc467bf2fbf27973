//! Fixed-size worker pool.
//!
//! Spawns exactly `workers` tasks that pull items from a shared queue until
//! it is empty. Each item runs on tokio's blocking pool (the HTTP client is
//! blocking), and its result or panic is captured per item so one failure
//! never stops the batch.

use anyhow::Result;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;

/// Outcome of one work item.
#[derive(Debug)]
pub struct ItemReport<T, R> {
    pub item: T,
    pub result: Result<R>,
}

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Pool with `workers` workers (at least one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `job` once for every item and returns one report per item, in
    /// completion order.
    pub async fn run<T, R, F>(&self, items: Vec<T>, job: F) -> Vec<ItemReport<T, R>>
    where
        T: Clone + Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Result<R> + Send + Sync + 'static,
    {
        if items.is_empty() {
            return Vec::new();
        }

        let total = items.len();
        let queue = Arc::new(Mutex::new(VecDeque::from(items)));
        let job = Arc::new(job);
        let mut join_set = JoinSet::new();

        for worker in 0..self.workers {
            let queue = Arc::clone(&queue);
            let job = Arc::clone(&job);
            join_set.spawn(async move {
                let mut reports = Vec::new();
                while let Some(item) = next_item(&queue) {
                    let job = Arc::clone(&job);
                    let arg = item.clone();
                    let result = match tokio::task::spawn_blocking(move || (*job)(arg)).await {
                        Ok(result) => result,
                        Err(e) => Err(anyhow::anyhow!("worker {} item task failed: {}", worker, e)),
                    };
                    reports.push(ItemReport { item, result });
                }
                tracing::trace!(worker, done = reports.len(), "worker drained queue");
                reports
            });
        }

        let mut reports = Vec::with_capacity(total);
        while let Some(res) = join_set.join_next().await {
            match res {
                Ok(batch) => reports.extend(batch),
                Err(e) => tracing::error!("worker task join: {}", e),
            }
        }
        reports
    }
}

fn next_item<T>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    queue
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .pop_front()
}
