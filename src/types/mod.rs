//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `coin`: Coin records, identifiers, and transfer outcomes
//! - `operation`: Batch-input operation types
//! - `error`: Error types for the ledger

pub mod coin;
pub mod error;
pub mod operation;

pub use coin::{generate_coin_id, BalanceQuote, CoinId, CoinRecord, TransferOutcome};
pub use error::LedgerError;
pub use operation::{LedgerOp, OpKind};
