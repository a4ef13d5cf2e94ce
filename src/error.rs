//! Error types for the ledger report engine.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur during engine operation.
///
/// Validation variants are only ever produced before the ledger is touched,
/// so a failed request never leaves partial account state behind.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Debit account id is not exactly 26 characters
    #[error("Invalid debit account number. (row {row})")]
    InvalidDebitAccount { row: usize },

    /// Credit account id is not exactly 26 characters
    #[error("Invalid credit account number. (row {row})")]
    InvalidCreditAccount { row: usize },

    /// Amount is non-numeric, not strictly positive, or has more than 2 decimals
    #[error("Invalid amount value. (row {row})")]
    InvalidAmount { row: usize },

    /// Input header is missing a required column or carries an unknown one
    #[error("Invalid property key: {field}")]
    UnexpectedField { field: String },

    /// A dispatched batch did not complete before the barrier released
    #[error("Request processing interrupted")]
    Interrupted,

    /// Rejected engine configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Missing input file argument
    #[error("Missing input file argument. Usage: ledger-report <transactions.csv>")]
    MissingArgument,
}
