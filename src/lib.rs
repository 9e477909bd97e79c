//! Coin Ledger Library
//! # Overview
//!
//! This library tracks a spendable set of value-bearing coin records and
//! processes transfer requests that consume coins to satisfy a requested
//! amount, producing change when needed.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (CoinRecord, LedgerOp, errors)
//! - [`cli`] - CLI argument parsing
//! - [`core`] - Business logic components:
//!   - [`core::selector`] - Pure oldest-first coin selection
//!   - [`core::engine`] - Transfer and balance orchestration
//!   - [`core::memory_store`] - Thread-safe in-memory coin store
//! - [`rate`] - Exchange-rate providers (HTTP ticker, fixed)
//! - [`io`] - CSV reading and writing for operations and snapshots
//! - [`pipeline`] - Batch processing with concurrent transfer execution
//!
//! # Transfer Semantics
//!
//! A transfer converts a fiat amount to native units at the current exchange
//! rate, selects unspent coins oldest-first until the target is covered,
//! then atomically marks them spent and books the surplus as a single change
//! coin. Commits are conditioned on every chosen coin still being unspent,
//! so concurrent transfers can never double-spend; a lost race is retried
//! from a fresh read a bounded number of times.
//!
//! # Coin Lifecycle
//!
//! Each coin carries:
//! - `id`: 128-bit random hex token, immutable
//! - `amount`: strictly positive native-unit value
//! - `spent`: `false -> true` exactly once, never reversed
//! - `created_at`: creation timestamp driving selection order

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod rate;
pub mod types;

pub use core::{CoinStore, EngineConfig, LedgerEngine, MemoryCoinStore, RateProvider};
pub use io::write_coins_csv;
pub use pipeline::{LedgerPipeline, PipelineConfig, PipelineSummary};
pub use rate::{FixedRateProvider, HttpRateProvider};
pub use types::{BalanceQuote, CoinId, CoinRecord, LedgerError, LedgerOp, OpKind, TransferOutcome};
