//! Engine configuration: chunk threshold and worker pool size.

use crate::error::{EngineError, Result};
use config::{Config, Environment};
use serde::Deserialize;
use std::thread;

/// Batch size at or above which work is handed to the pool.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Prefix of the environment variables read by [`EngineConfig::from_env`].
pub const ENV_PREFIX: &str = "LEDGER";

/// Tunables of the aggregation engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Transactions per batch; only full batches are dispatched to the pool.
    pub chunk_size: usize,

    /// Number of worker threads.
    pub workers: usize,
}

impl EngineConfig {
    pub fn new(chunk_size: usize, workers: usize) -> Self {
        EngineConfig {
            chunk_size,
            workers,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Defaults overridden by `LEDGER_CHUNK_SIZE` and `LEDGER_WORKERS`.
    pub fn from_env() -> Result<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    fn load(environment: Environment) -> Result<Self> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("chunk_size", defaults.chunk_size as i64)
            .and_then(|b| b.set_default("workers", defaults.workers as i64))
            .map(|b| b.add_source(environment.try_parsing(true)))
            .and_then(|b| b.build())
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(EngineError::InvalidConfig(
                "chunk size must be at least 1".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(EngineError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        EngineConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers,
        }
    }
}
