//! Coin Ledger CLI
//!
//! Command-line interface for running ledger operation batches.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --rate 50000 ops.csv > coins.csv
//! cargo run -- --rate-url http://api.example/ticker --pair BTC/EUR ops.csv > coins.csv
//! cargo run -- --rate 50000 --snapshot coins.csv --max-concurrent 8 ops.csv > final.csv
//! ```
//!
//! The program seeds the ledger from an optional coin snapshot, applies the
//! operations from the input CSV (funding rows in order, transfer rows
//! concurrently), and writes the final coin set to stdout.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, invalid snapshot, etc.)

use coin_ledger::cli;
use coin_ledger::core::RateProvider;
use coin_ledger::pipeline::LedgerPipeline;
use coin_ledger::rate::{FixedRateProvider, HttpRateProvider};
use std::process;
use std::sync::Arc;

fn main() {
    // Parse command-line arguments using clap
    let args = cli::parse_args();

    // One of --rate / --rate-url is guaranteed present by the arg group
    let rates: Arc<dyn RateProvider> = if let Some(rate) = args.rate {
        Arc::new(FixedRateProvider::new(rate))
    } else {
        let url = args.rate_url.clone().unwrap_or_default();
        let timeout = std::time::Duration::from_secs(args.rate_timeout_secs);
        match HttpRateProvider::with_timeout(url, timeout) {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    };

    let pipeline = LedgerPipeline::new(args.to_pipeline_config());

    // Final coin set goes to stdout
    let mut output = std::io::stdout();
    match pipeline.process(
        &args.input_file,
        args.snapshot.as_deref(),
        args.to_engine_config(),
        rates,
        &mut output,
    ) {
        Ok(summary) => {
            eprintln!(
                "Funded {}, committed {} transfer(s), rejected {}, skipped {} row(s)",
                summary.funded,
                summary.transfers_committed,
                summary.transfers_rejected,
                summary.rows_skipped
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
