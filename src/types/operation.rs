//! Ledger operation types for batch processing
//!
//! An operations file drives the batch pipeline: funding events create new
//! unspent coins in the native unit, transfer requests consume coins to
//! satisfy a fiat amount.

use rust_decimal::Decimal;

/// Operation kinds accepted by the batch pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Create a new unspent coin of a native-unit amount
    ///
    /// Funding is an external event as far as the ledger core is concerned;
    /// in the batch surface it seeds the spendable set.
    Fund,

    /// Transfer a fiat amount out of the ledger
    ///
    /// The amount is converted to native units via the rate provider, then
    /// covered by selecting unspent coins oldest-first.
    Transfer,
}

/// A single parsed operation from the batch input
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerOp {
    /// What to do
    pub kind: OpKind,

    /// Native-unit amount for `Fund`, fiat amount for `Transfer`
    ///
    /// Always strictly positive; non-positive rows are rejected at parse
    /// time.
    pub amount: Decimal,
}
