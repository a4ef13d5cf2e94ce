//! Top-level aggregation engine.
//!
//! Reads transfers, validates all of them, then aggregates them through the
//! chunker and worker pool. Nothing reaches the ledger until the whole input
//! has validated, so a rejected request leaves no account behind.

use crate::chunker::Chunker;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::ledger::LedgerStore;
use crate::pool::WorkerPool;
use crate::report::Report;
use crate::transaction::{check_headers, Transaction, TransactionRecord};
use csv::{ReaderBuilder, Trim};
use log::{debug, info, warn};
use std::io::Read;
use std::sync::Arc;
use std::time::Instant;

/// The ledger aggregation engine.
///
/// Owns the worker pool; every call to [`AggregationEngine::aggregate`] is an
/// independent run with its own ledger and barrier.
pub struct AggregationEngine {
    config: EngineConfig,
    pool: WorkerPool,
}

impl AggregationEngine {
    /// Creates an engine and starts its worker pool.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let pool = WorkerPool::new(config.workers)?;
        Ok(AggregationEngine { config, pool })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reads and validates every record from a CSV reader.
    ///
    /// Stops at the first invalid record and returns its error. Only headers
    /// are trimmed; field values reach validation as written.
    pub fn read_transactions<R: Read>(&self, reader: R) -> Result<Vec<Transaction>> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::Headers).from_reader(reader);
        check_headers(csv_reader.headers()?.iter())?;

        let mut transactions = Vec::new();
        for (row_idx, result) in csv_reader.deserialize::<TransactionRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            let record = result?;
            match record.validate(row_num) {
                Ok(tx) => transactions.push(tx),
                Err(e) => {
                    warn!("Rejecting input: {}", e);
                    return Err(e);
                }
            }
        }

        debug!("Validated {} transactions", transactions.len());
        Ok(transactions)
    }

    /// Applies `transactions` to `ledger` and blocks until all work is done.
    pub fn aggregate_into(
        &self,
        ledger: &Arc<LedgerStore>,
        transactions: Vec<Transaction>,
    ) -> Result<()> {
        let started = Instant::now();
        let count = transactions.len();

        let chunker = Chunker::new(&self.pool, self.config.chunk_size);
        let barrier = chunker.process(ledger, transactions)?;
        barrier.wait()?;

        info!(
            "Aggregated {} transactions into {} accounts in {:?}",
            count,
            ledger.len(),
            started.elapsed()
        );
        Ok(())
    }

    /// Runs one aggregation over already-validated transactions.
    pub fn aggregate(&self, transactions: Vec<Transaction>) -> Result<Report> {
        let ledger = Arc::new(LedgerStore::new());
        self.aggregate_into(&ledger, transactions)?;
        Ok(Report::from_ledger(&ledger))
    }

    /// Validates the whole CSV input, then aggregates it into `ledger`.
    pub fn process_csv_into<R: Read>(&self, reader: R, ledger: &Arc<LedgerStore>) -> Result<()> {
        let transactions = self.read_transactions(reader)?;
        self.aggregate_into(ledger, transactions)
    }

    /// Validates and aggregates a CSV input into a fresh report.
    pub fn process_csv<R: Read>(&self, reader: R) -> Result<Report> {
        let ledger = Arc::new(LedgerStore::new());
        self.process_csv_into(reader, &ledger)?;
        Ok(Report::from_ledger(&ledger))
    }
}
