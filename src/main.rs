//! Ledger Report CLI
//!
//! Reads transfers from a CSV file and writes the per-account report to
//! stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- transactions.csv > report.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity
//! - `LEDGER_CHUNK_SIZE`: Transactions per dispatched batch (default 10000)
//! - `LEDGER_WORKERS`: Worker threads (default: available parallelism)

use ledger_report::{AggregationEngine, EngineConfig, EngineError, Result};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(EngineError::MissingArgument);
    }

    let config = EngineConfig::from_env()?;
    let engine = AggregationEngine::new(config)?;

    let input_path = &args[1];
    let file = File::open(input_path)?;
    let reader = BufReader::new(file);

    let report = engine.process_csv(reader)?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    report.write_csv(handle)?;

    Ok(())
}
