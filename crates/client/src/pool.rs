//! Fixed-size worker pool over a list of jobs.
//!
//! Jobs go into one shared queue. A fixed number of worker tasks pull from it
//! until it is empty, and every outcome is written back to the slot of the
//! job it came from, so `outcomes[i]` always belongs to `jobs[i]` whatever
//! order the jobs finish in.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::task::JoinSet;
use upfeed_core::Error;

/// Bounded-concurrency executor.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        Self { workers }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `task` over every job with at most `workers` in flight.
    ///
    /// Returns one outcome per job, in job order. A per-job error lands in
    /// that job's slot; `Err` is returned only when the pool itself cannot
    /// finish (no workers, or a worker task panicked or was cancelled), in
    /// which case no partial outcomes are returned.
    pub async fn run<J, T, E, F, Fut>(&self, jobs: Vec<J>, task: F) -> Result<Vec<Result<T, E>>, Error>
    where
        J: Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        F: Fn(J) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        if self.workers == 0 {
            return Err(Error::WorkerPool("worker count must be at least 1".into()));
        }

        let total = jobs.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let workers = self.workers.min(total);
        tracing::debug!(jobs = total, workers, "starting worker pool");

        let queue = Arc::new(Mutex::new(jobs.into_iter().enumerate()));
        let task = Arc::new(task);
        let mut join_set = JoinSet::new();

        for _ in 0..workers {
            let queue = Arc::clone(&queue);
            let task = Arc::clone(&task);

            join_set.spawn(async move {
                let mut finished = Vec::new();
                loop {
                    let next = {
                        let mut queue = queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                        queue.next()
                    };
                    let Some((index, job)) = next else { break };
                    finished.push((index, (*task)(job).await));
                }
                finished
            });
        }

        let mut slots: Vec<Option<Result<T, E>>> = std::iter::repeat_with(|| None).take(total).collect();

        while let Some(joined) = join_set.join_next().await {
            let finished = joined.map_err(|e| Error::WorkerPool(format!("worker task failed: {e}")))?;
            for (index, outcome) in finished {
                slots[index] = Some(outcome);
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or_else(|| Error::WorkerPool(format!("job {index} produced no outcome"))))
            .collect()
    }
}
