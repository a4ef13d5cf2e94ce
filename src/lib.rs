//! # Ledger Report
//!
//! A batch aggregation engine that turns a list of account-to-account
//! transfers into per-account debit counts, credit counts and balances.
//!
//! ## Design Principles
//!
//! - **Exact arithmetic**: Balances accumulate as integer hundredths; `rust_decimal`
//!   is used only to parse amounts and render balances
//! - **Validate, then commit**: The whole input is validated before the ledger
//!   sees a single transfer
//! - **Chunked parallelism**: Full batches run on a worker pool, the remainder inline
//! - **Blocking completion**: Results are read only after a wait-group barrier releases
//! - **Deterministic output**: Accounts sorted by account id, identical for any
//!   chunk size or thread count
//!
//! ## Example
//!
//! ```no_run
//! use ledger_report::{AggregationEngine, EngineConfig};
//! use std::io::Cursor;
//!
//! let csv = "debitAccount,creditAccount,amount\n\
//!            32309111922661937852684864,06105023389842834748547303,100.00\n";
//! let engine = AggregationEngine::new(EngineConfig::default()).unwrap();
//! let report = engine.process_csv(Cursor::new(csv)).unwrap();
//! report.write_csv(std::io::stdout()).unwrap();
//! ```

pub mod account;
pub mod chunker;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod pool;
pub mod report;
pub mod transaction;
pub mod worker;

pub use account::{AccountAggregate, AccountEntry};
pub use chunker::Chunker;
pub use config::EngineConfig;
pub use decimal::Money;
pub use engine::AggregationEngine;
pub use error::{EngineError, Result};
pub use ledger::LedgerStore;
pub use pool::{CompletionBarrier, WorkerPool};
pub use report::Report;
pub use transaction::{AccountId, Transaction, TransactionRecord};
