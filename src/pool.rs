//! Worker pool and per-run completion barrier.
//!
//! Batches are sent over a shared channel to a fixed set of named worker
//! threads. Every dispatched batch holds a [`BatchToken`] that keeps the
//! run's [`CompletionBarrier`] open until the batch has finished, so the
//! caller can block on the barrier instead of polling a counter.

use crate::error::{EngineError, Result};
use crossbeam::channel::{self, Sender};
use crossbeam::sync::WaitGroup;
use log::{debug, error};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size pool of OS threads executing dispatched batches.
///
/// The pool can serve any number of runs; each run brings its own barrier.
/// Dropping the pool closes the job channel and joins every worker.
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `workers` threads (at least one).
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let (sender, receiver) = channel::unbounded::<Job>();

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let rx = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("ledger-worker-{idx}"))
                .spawn(move || {
                    for job in rx.iter() {
                        job();
                    }
                })?;
            handles.push(handle);
        }
        debug!("Started worker pool with {} threads", workers);

        Ok(WorkerPool {
            sender: Some(sender),
            handles,
        })
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Closes the job channel and joins every worker after it drains.
    ///
    /// Later calls to [`WorkerPool::execute`] fail with
    /// [`EngineError::Interrupted`].
    pub fn shutdown(&mut self) {
        drop(self.sender.take());
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                error!("Worker thread exited abnormally");
            }
        }
    }

    /// Queues `job` on the pool, registered with `barrier`.
    ///
    /// The barrier will not release until `job` has returned. A job that
    /// panics, or that can no longer be queued, marks the barrier as failed.
    pub fn execute<F>(&self, barrier: &mut CompletionBarrier, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(EngineError::Interrupted)?;
        let token = barrier.register();
        sender
            .send(Box::new(move || token.run(job)))
            .map_err(|_| EngineError::Interrupted)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Synchronization point for one aggregation run.
///
/// `wait` blocks until every batch registered through [`WorkerPool::execute`]
/// has finished. Reading the ledger before that is a torn read.
pub struct CompletionBarrier {
    wait_group: WaitGroup,
    failed: Arc<AtomicBool>,
    dispatched: usize,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        CompletionBarrier {
            wait_group: WaitGroup::new(),
            failed: Arc::new(AtomicBool::new(false)),
            dispatched: 0,
        }
    }

    /// Number of batches registered so far.
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    fn register(&mut self) -> BatchToken {
        self.dispatched += 1;
        BatchToken {
            _member: self.wait_group.clone(),
            failed: Arc::clone(&self.failed),
            completed: false,
        }
    }

    /// Blocks until all registered batches are done.
    ///
    /// Returns [`EngineError::Interrupted`] if any of them did not complete.
    pub fn wait(self) -> Result<()> {
        debug!("Waiting for {} dispatched batches", self.dispatched);
        self.wait_group.wait();

        if self.failed.load(Ordering::Acquire) {
            return Err(EngineError::Interrupted);
        }
        Ok(())
    }
}

impl Default for CompletionBarrier {
    fn default() -> Self {
        Self::new()
    }
}

/// Membership of one dispatched batch in a barrier.
///
/// Dropping the token releases the membership; a token dropped before its
/// batch completed flags the run as failed.
struct BatchToken {
    _member: WaitGroup,
    failed: Arc<AtomicBool>,
    completed: bool,
}

impl BatchToken {
    fn run<F: FnOnce()>(mut self, job: F) {
        match panic::catch_unwind(AssertUnwindSafe(job)) {
            Ok(()) => self.completed = true,
            Err(_) => error!(
                "Batch panicked on {}",
                thread::current().name().unwrap_or("unnamed worker")
            ),
        }
    }
}

impl Drop for BatchToken {
    fn drop(&mut self) {
        if !self.completed {
            self.failed.store(true, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn test_pool_has_at_least_one_worker() {
        let pool = WorkerPool::new(0).unwrap();
        assert_eq!(pool.size(), 1);
    }

    #[test]
    fn test_barrier_without_batches_releases_immediately() {
        let barrier = CompletionBarrier::new();
        assert_eq!(barrier.dispatched(), 0);
        assert!(barrier.wait().is_ok());
    }

    #[test]
    fn test_wait_blocks_until_all_jobs_finish() {
        let pool = WorkerPool::new(4).unwrap();
        let mut barrier = CompletionBarrier::new();
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..16 {
            let done = Arc::clone(&done);
            pool.execute(&mut barrier, move || {
                thread::sleep(Duration::from_millis(5));
                done.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        assert_eq!(barrier.dispatched(), 16);
        barrier.wait().unwrap();
        assert_eq!(done.load(Ordering::SeqCst), 16);
    }

    #[test]
    fn test_panicking_job_fails_the_barrier() {
        let pool = WorkerPool::new(2).unwrap();
        let mut barrier = CompletionBarrier::new();

        pool.execute(&mut barrier, || {}).unwrap();
        pool.execute(&mut barrier, || panic!("boom")).unwrap();

        let err = barrier.wait().unwrap_err();
        assert!(matches!(err, EngineError::Interrupted));
    }

    #[test]
    fn test_execute_after_shutdown_is_rejected() {
        let mut pool = WorkerPool::new(2).unwrap();
        pool.shutdown();
        assert_eq!(pool.size(), 0);

        let mut barrier = CompletionBarrier::new();
        let err = pool.execute(&mut barrier, || {}).unwrap_err();
        assert!(matches!(err, EngineError::Interrupted));
        assert_eq!(barrier.dispatched(), 0);
        assert!(barrier.wait().is_ok());
    }

    #[test]
    fn test_pool_survives_a_failed_run() {
        let pool = WorkerPool::new(1).unwrap();

        let mut first = CompletionBarrier::new();
        pool.execute(&mut first, || panic!("boom")).unwrap();
        assert!(first.wait().is_err());

        let mut second = CompletionBarrier::new();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        pool.execute(&mut second, move || flag.store(true, Ordering::SeqCst))
            .unwrap();
        assert!(second.wait().is_ok());
        assert!(ran.load(Ordering::SeqCst));
    }
}
