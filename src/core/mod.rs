//! Core business logic module
//!
//! This module contains the ledger's core components:
//! - `traits` - Collaborator seams (coin store, rate provider)
//! - `selector` - Pure coin selection
//! - `engine` - Transfer and balance orchestration
//! - `memory_store` - Thread-safe in-memory `CoinStore`

pub mod engine;
pub mod memory_store;
pub mod selector;
pub mod traits;

pub use engine::{EngineConfig, LedgerEngine};
pub use memory_store::MemoryCoinStore;
pub use selector::{select_coins, Selection};
pub use traits::{CoinStore, RateProvider};
