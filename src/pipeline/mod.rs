//! Batch processing pipeline
//!
//! Drives a complete ledger run: seed the store from an optional snapshot,
//! apply funding operations in file order, execute transfer operations
//! concurrently, and write the final coin set as CSV.
//!
//! # Architecture
//!
//! ```text
//! LedgerPipeline
//!     ├── PipelineConfig           (worker threads, concurrency bound)
//!     ├── MemoryCoinStore          (thread-safe coin state)
//!     └── LedgerEngine             (transfer orchestration)
//! ```
//!
//! # Concurrency
//!
//! Funding is sequential so the snapshot plus fund rows produce a
//! deterministic starting set. Transfers then run concurrently with a
//! bounded fan-out, which is exactly the hazard the engine and store are
//! built for: conflicting selections resolve via commit-time checks and
//! bounded retries, never by double-spending a coin.
//!
//! # Error Handling
//!
//! Fatal errors (unreadable files, runtime construction) abort the run.
//! Individual operation failures are logged to stderr and the batch
//! continues, mirroring how a request handler would reject one transfer
//! without taking down the service.

use crate::core::memory_store::MemoryCoinStore;
use crate::core::traits::RateProvider;
use crate::core::{EngineConfig, LedgerEngine};
use crate::io::csv_format::write_coins_csv;
use crate::io::reader::{read_coin_snapshot, read_ops_file};
use crate::types::{LedgerError, OpKind};
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Maximum number of transfers processing concurrently
    pub max_concurrent: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: num_cpus::get(),
        }
    }
}

impl PipelineConfig {
    /// Create a config with a custom concurrency bound
    ///
    /// Zero falls back to the default with a warning, matching the CLI's
    /// permissive handling of bad tuning values.
    pub fn new(max_concurrent: usize) -> Self {
        let default = Self::default();

        let max_concurrent = if max_concurrent == 0 {
            eprintln!(
                "Warning: Invalid max_concurrent (0), using default ({})",
                default.max_concurrent
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self { max_concurrent }
    }
}

/// Outcome counters for a pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Funding operations applied
    pub funded: usize,
    /// Transfers that committed
    pub transfers_committed: usize,
    /// Transfers rejected with a ledger error
    pub transfers_rejected: usize,
    /// Input rows that failed to parse
    pub rows_skipped: usize,
}

/// Batch pipeline over an in-memory ledger
#[derive(Debug, Clone)]
pub struct LedgerPipeline {
    config: PipelineConfig,
}

impl LedgerPipeline {
    /// Create a pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Process an operations file and write the final coin set
    ///
    /// Builds a multi-threaded tokio runtime sized to the concurrency bound
    /// and executes the run on it.
    ///
    /// # Arguments
    ///
    /// * `ops_path` - Path to the operations CSV (`op,amount` rows)
    /// * `snapshot_path` - Optional coin snapshot seeding the ledger
    /// * `engine_config` - Engine tuning (pair, minimum, timeouts, retries)
    /// * `rates` - Rate provider used for transfer conversion
    /// * `output` - Writer receiving the final coin set as CSV
    ///
    /// # Returns
    ///
    /// * `Ok(PipelineSummary)` with outcome counters
    /// * `Err(String)` if a fatal error occurred
    pub fn process(
        &self,
        ops_path: &Path,
        snapshot_path: Option<&Path>,
        engine_config: EngineConfig,
        rates: Arc<dyn RateProvider>,
        output: &mut dyn Write,
    ) -> Result<PipelineSummary, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent)
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(self.run(ops_path, snapshot_path, engine_config, rates, output))
    }

    /// The async body of a pipeline run
    async fn run(
        &self,
        ops_path: &Path,
        snapshot_path: Option<&Path>,
        engine_config: EngineConfig,
        rates: Arc<dyn RateProvider>,
        output: &mut dyn Write,
    ) -> Result<PipelineSummary, String> {
        let seed = match snapshot_path {
            Some(path) => read_coin_snapshot(path).map_err(|e| e.to_string())?,
            None => Vec::new(),
        };

        let store = Arc::new(
            MemoryCoinStore::with_records(seed).map_err(|e| format!("Invalid snapshot: {}", e))?,
        );
        let engine = Arc::new(LedgerEngine::with_config(
            Arc::clone(&store) as Arc<dyn crate::core::CoinStore>,
            rates,
            engine_config,
        ));

        let ops_file = read_ops_file(ops_path).map_err(|e| e.to_string())?;
        for row_error in &ops_file.row_errors {
            eprintln!("Skipping row: {}", row_error);
        }

        let mut summary = PipelineSummary {
            rows_skipped: ops_file.row_errors.len(),
            ..PipelineSummary::default()
        };

        // Funding first, in file order, so the spendable set is deterministic
        // before any transfer runs.
        let mut transfers = Vec::new();
        for op in ops_file.ops {
            match op.kind {
                OpKind::Fund => match engine.fund(op.amount).await {
                    Ok(_) => summary.funded += 1,
                    Err(e) => eprintln!("Funding of {} failed: {}", op.amount, e),
                },
                OpKind::Transfer => transfers.push(op.amount),
            }
        }

        // Transfers run concurrently with a bounded fan-out.
        let results: Vec<(rust_decimal::Decimal, Result<_, LedgerError>)> =
            stream::iter(transfers)
                .map(|amount| {
                    let engine = Arc::clone(&engine);
                    async move { (amount, engine.transfer(amount).await) }
                })
                .buffer_unordered(self.config.max_concurrent)
                .collect()
                .await;

        for (amount, result) in results {
            match result {
                Ok(outcome) => {
                    summary.transfers_committed += 1;
                    log::debug!(
                        "transfer of {} spent {} coin(s)",
                        amount,
                        outcome.spent_ids.len()
                    );
                }
                Err(e) => {
                    summary.transfers_rejected += 1;
                    eprintln!("Transfer of {} failed: {}", amount, e);
                }
            }
        }

        let history = engine.history().await.map_err(|e| e.to_string())?;
        write_coins_csv(&history, output)?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::FixedRateProvider;
    use rust_decimal::Decimal;
    use std::io::Write as IoWrite;
    use tempfile::NamedTempFile;

    fn temp_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn unit_rate() -> Arc<dyn RateProvider> {
        Arc::new(FixedRateProvider::new(Decimal::ONE))
    }

    #[test]
    fn test_pipeline_funds_then_transfers() {
        let ops = temp_csv("op,amount\nfund,5.0\nfund,3.0\ntransfer,4.0\n");
        let pipeline = LedgerPipeline::new(PipelineConfig::new(2));
        let mut output = Vec::new();

        let summary = pipeline
            .process(
                ops.path(),
                None,
                EngineConfig::default(),
                unit_rate(),
                &mut output,
            )
            .unwrap();

        assert_eq!(summary.funded, 2);
        assert_eq!(summary.transfers_committed, 1);
        assert_eq!(summary.transfers_rejected, 0);

        // 2 funded coins + 1 change coin (5 selected for target 4)
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().count(), 4); // header + 3 coins
    }

    #[test]
    fn test_pipeline_rejects_uncoverable_transfer() {
        let ops = temp_csv("op,amount\nfund,1.0\ntransfer,5.0\n");
        let pipeline = LedgerPipeline::new(PipelineConfig::default());
        let mut output = Vec::new();

        let summary = pipeline
            .process(
                ops.path(),
                None,
                EngineConfig::default(),
                unit_rate(),
                &mut output,
            )
            .unwrap();

        assert_eq!(summary.transfers_committed, 0);
        assert_eq!(summary.transfers_rejected, 1);
    }

    #[test]
    fn test_pipeline_seeds_from_snapshot() {
        let snapshot = temp_csv(
            "id,amount,spent,created_at\n\
             aaa,5.0,false,2024-03-01T12:00:00+00:00\n",
        );
        let ops = temp_csv("op,amount\ntransfer,5.0\n");
        let pipeline = LedgerPipeline::new(PipelineConfig::default());
        let mut output = Vec::new();

        let summary = pipeline
            .process(
                ops.path(),
                Some(snapshot.path()),
                EngineConfig::default(),
                unit_rate(),
                &mut output,
            )
            .unwrap();

        assert_eq!(summary.transfers_committed, 1);
        let text = String::from_utf8(output).unwrap();
        assert!(text.lines().any(|l| l.starts_with("aaa,5,true,")));
    }

    #[test]
    fn test_pipeline_counts_skipped_rows() {
        let ops = temp_csv("op,amount\nfund,5.0\nstake,1.0\n");
        let pipeline = LedgerPipeline::new(PipelineConfig::default());
        let mut output = Vec::new();

        let summary = pipeline
            .process(
                ops.path(),
                None,
                EngineConfig::default(),
                unit_rate(),
                &mut output,
            )
            .unwrap();

        assert_eq!(summary.funded, 1);
        assert_eq!(summary.rows_skipped, 1);
    }

    #[test]
    fn test_pipeline_missing_ops_file_is_fatal() {
        let pipeline = LedgerPipeline::new(PipelineConfig::default());
        let mut output = Vec::new();

        let result = pipeline.process(
            Path::new("/nonexistent/ops.csv"),
            None,
            EngineConfig::default(),
            unit_rate(),
            &mut output,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_config_zero_falls_back_to_default() {
        let config = PipelineConfig::new(0);
        assert_eq!(config.max_concurrent, num_cpus::get());
    }
}
