//! Collaborator traits for the ledger engine
//!
//! The engine depends on two external collaborators behind trait seams: a
//! durable coin store and an exchange-rate provider. Both are `Send + Sync`
//! so a single engine can serve concurrent transfer requests.

use crate::types::{CoinId, CoinRecord, LedgerError};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Persistence seam for coin records
///
/// Implementations own the persisted state exclusively; the engine holds no
/// cached copy across calls and re-reads the unspent set for every operation.
///
/// # Atomicity contract
///
/// `commit_spend` is the single mutation point of a transfer and must be
/// atomic: either every chosen coin is marked spent and the change record is
/// inserted, or nothing changes. The update must be conditioned on every
/// chosen coin still being unspent; a blind mark-spent is a double-spend bug.
#[async_trait]
pub trait CoinStore: Send + Sync {
    /// Return all unspent coins, ordered oldest-first
    ///
    /// Ties on `created_at` are broken by id so the order is deterministic.
    ///
    /// # Errors
    ///
    /// Returns `StoreFailure` if the underlying read fails.
    async fn list_unspent(&self) -> Result<Vec<CoinRecord>, LedgerError>;

    /// Return every record, spent included, ordered oldest-first
    ///
    /// Audit/history view; retired coins stay visible here forever.
    ///
    /// # Errors
    ///
    /// Returns `StoreFailure` if the underlying read fails.
    async fn list_all(&self) -> Result<Vec<CoinRecord>, LedgerError>;

    /// Persist a new coin record
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for a non-positive amount, `StoreFailure` for
    /// a duplicate id or a persistence failure.
    async fn save(&self, record: CoinRecord) -> Result<(), LedgerError>;

    /// Atomically mark the chosen coins spent and insert the change record
    ///
    /// # Errors
    ///
    /// Returns `ConcurrencyConflict` if any chosen coin is no longer unspent;
    /// in that case no coin is marked and no change record exists. Returns
    /// `StoreFailure` on a persistence failure, with the same all-or-nothing
    /// guarantee.
    async fn commit_spend(
        &self,
        chosen: &[CoinId],
        change: Option<CoinRecord>,
    ) -> Result<(), LedgerError>;
}

/// Exchange-rate seam
///
/// Converts between the ledger's native unit and an external currency. The
/// provider has no side effects to roll back, so the engine calls it before
/// entering the commit path.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the current rate for a currency pair such as `BTC/EUR`
    ///
    /// The returned rate is fiat units per native unit.
    ///
    /// # Errors
    ///
    /// Returns `RateUnavailable` if the provider fails, times out, or does
    /// not carry the pair.
    async fn get_rate(&self, pair: &str) -> Result<Decimal, LedgerError>;
}
