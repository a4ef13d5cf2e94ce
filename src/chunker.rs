//! Splits validated transactions into batches and dispatches them.

use crate::error::Result;
use crate::ledger::LedgerStore;
use crate::pool::{CompletionBarrier, WorkerPool};
use crate::transaction::Transaction;
use crate::worker::apply_batch;
use log::{debug, error};
use std::sync::Arc;

/// Batching policy over a worker pool.
///
/// Input is cut into contiguous batches of `chunk_size`. A full batch is sent
/// to the pool; a shorter one (only ever the last) is applied on the calling
/// thread. Inputs smaller than `chunk_size` therefore never reach the pool.
pub struct Chunker<'a> {
    pool: &'a WorkerPool,
    chunk_size: usize,
}

impl<'a> Chunker<'a> {
    /// Creates a chunker; a `chunk_size` of zero is treated as one.
    pub fn new(pool: &'a WorkerPool, chunk_size: usize) -> Self {
        Chunker {
            pool,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Applies all `transactions` to `ledger`.
    ///
    /// Returns the run's barrier once every batch is either applied inline or
    /// queued. The caller must [`CompletionBarrier::wait`] before reading the
    /// ledger.
    pub fn process(
        &self,
        ledger: &Arc<LedgerStore>,
        transactions: Vec<Transaction>,
    ) -> Result<CompletionBarrier> {
        let mut barrier = CompletionBarrier::new();
        let mut remaining = transactions.into_iter();

        loop {
            let batch: Vec<Transaction> = remaining.by_ref().take(self.chunk_size).collect();
            if batch.is_empty() {
                break;
            }

            if batch.len() < self.chunk_size {
                debug!("Applying final batch of {} inline", batch.len());
                apply_batch(ledger, &batch);
                break;
            }

            let ledger = Arc::clone(ledger);
            if let Err(err) = self
                .pool
                .execute(&mut barrier, move || apply_batch(&ledger, &batch))
            {
                // Batches already queued must not outlive this run.
                if let Err(wait_err) = barrier.wait() {
                    error!("Queued batches failed after dispatch error: {}", wait_err);
                }
                return Err(err);
            }
        }

        debug!(
            "Dispatched {} batches of {} to the pool",
            barrier.dispatched(),
            self.chunk_size
        );
        Ok(barrier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountAggregate;
    use crate::decimal::Money;
    use crate::error::EngineError;
    use crate::transaction::AccountId;

    fn transfers(count: usize) -> Vec<Transaction> {
        (0..count)
            .map(|i| {
                Transaction::new(
                    AccountId::parse(&format!("{:026}", i % 7)).unwrap(),
                    AccountId::parse(&format!("{:026}", 100 + i % 5)).unwrap(),
                    Money::from_minor_units(1 + (i % 13) as i128),
                )
            })
            .collect()
    }

    fn run(chunk_size: usize, workers: usize, count: usize) -> (usize, Vec<AccountAggregate>) {
        let pool = WorkerPool::new(workers).unwrap();
        let ledger = Arc::new(LedgerStore::new());
        let barrier = Chunker::new(&pool, chunk_size)
            .process(&ledger, transfers(count))
            .unwrap();
        let dispatched = barrier.dispatched();
        barrier.wait().unwrap();
        (dispatched, ledger.snapshot())
    }

    #[test]
    fn test_small_input_never_reaches_pool() {
        let (dispatched, snapshot) = run(10_000, 2, 9_999);
        assert_eq!(dispatched, 0);
        assert_eq!(snapshot.len(), 12);
    }

    #[test]
    fn test_full_batches_are_dispatched_remainder_inline() {
        let (dispatched, _) = run(10, 2, 25);
        assert_eq!(dispatched, 2);

        let (dispatched, _) = run(10, 2, 30);
        assert_eq!(dispatched, 3);
    }

    #[test]
    fn test_empty_input() {
        let (dispatched, snapshot) = run(10, 1, 0);
        assert_eq!(dispatched, 0);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let pool = WorkerPool::new(1).unwrap();
        assert_eq!(Chunker::new(&pool, 0).chunk_size(), 1);
    }

    #[test]
    fn test_dispatch_failure_is_reported() {
        let mut pool = WorkerPool::new(1).unwrap();
        pool.shutdown();
        let ledger = Arc::new(LedgerStore::new());

        let result = Chunker::new(&pool, 10).process(&ledger, transfers(25));

        assert!(matches!(result, Err(EngineError::Interrupted)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_result_independent_of_chunking() {
        let (_, sequential) = run(1, 1, 2_000);
        let (_, parallel) = run(64, 4, 2_000);
        let (_, inline) = run(10_000, 4, 2_000);

        assert_eq!(sequential, parallel);
        assert_eq!(sequential, inline);
    }
}
