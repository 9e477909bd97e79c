//! Coin-related types for the coin ledger
//!
//! This module defines the CoinRecord structure that every ledger operation
//! works with, plus the outcome type returned by a successful transfer.

use chrono::{DateTime, Utc};
use rand::RngCore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Coin identifier
///
/// An opaque 32-character lowercase hex token generated from 16 random bytes
/// (128 bits of entropy). Immutable once assigned.
pub type CoinId = String;

/// Generate a fresh coin identifier
///
/// Draws 16 bytes from the thread-local CSPRNG and hex-encodes them,
/// producing a 32-character lowercase token. Collision probability across
/// any realistic ledger size is negligible.
pub fn generate_coin_id() -> CoinId {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// A single value-bearing record in the ledger
///
/// A coin is created either by an external funding event or as the change
/// output of a transfer. It is retired by being marked spent; retired coins
/// are kept for audit history but never contribute to balance or get
/// selected again.
///
/// # State machine
///
/// `spent` starts `false` and transitions only `false -> true`, exactly once,
/// at transfer commit time. There are no other transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinRecord {
    /// Unique coin identifier, immutable once created
    pub id: CoinId,

    /// Value in the ledger's native unit
    ///
    /// Invariant: strictly positive for every record ever created.
    pub amount: Decimal,

    /// Whether this coin has been consumed by a transfer
    pub spent: bool,

    /// Creation timestamp
    ///
    /// Set once at creation and used to impose the deterministic
    /// oldest-first selection order.
    pub created_at: DateTime<Utc>,
}

impl CoinRecord {
    /// Create a new unspent coin with a fresh id and the current timestamp
    ///
    /// The caller is responsible for ensuring `amount` is positive; stores
    /// reject non-positive amounts on save.
    pub fn new(amount: Decimal) -> Self {
        CoinRecord {
            id: generate_coin_id(),
            amount,
            spent: false,
            created_at: Utc::now(),
        }
    }

    /// Reconstruct a coin from persisted fields
    ///
    /// Used when loading records out of a store or snapshot; performs no
    /// generation or validation.
    pub fn with_parts(
        id: CoinId,
        amount: Decimal,
        spent: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        CoinRecord {
            id,
            amount,
            spent,
            created_at,
        }
    }
}

/// Result of a committed transfer
///
/// Captures which coins were consumed and the change coin created, if the
/// selected total strictly exceeded the target.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    /// Ids of the coins marked spent by this transfer
    pub spent_ids: Vec<CoinId>,

    /// Sum of the amounts of the spent coins
    pub spent_total: Decimal,

    /// Native-unit amount the transfer was for
    pub target: Decimal,

    /// Id of the change coin, when `spent_total > target`
    pub change_id: Option<CoinId>,
}

/// Ledger balance expressed in both the native unit and a fiat currency
///
/// Produced by quoting the unspent total at the current exchange rate.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceQuote {
    /// Sum of all unspent coin amounts
    pub native_total: Decimal,

    /// Native total multiplied by the current rate
    pub fiat_total: Decimal,

    /// The rate the quote was computed at
    pub rate: Decimal,
}
