//! Ledger engine
//!
//! This module provides the `LedgerEngine` that orchestrates transfers by
//! coordinating the rate provider, the coin selector, and the coin store.
//!
//! The engine enforces the ledger's business rules:
//! - Amounts are validated before any store access
//! - The exchange rate is fetched (with a timeout) before the commit path,
//!   so a slow provider can never hold up a commit
//! - Dust transfers below the configured minimum are rejected
//! - The read-select-commit sequence is retried a bounded number of times
//!   when a concurrent transfer wins a chosen coin
//!
//! # Concurrency
//!
//! The engine holds no coin state of its own; every transfer re-reads the
//! unspent set from the store. Double-spend prevention lives at the store's
//! commit: `commit_spend` only succeeds if every chosen coin is still
//! unspent. A lost race surfaces as `ConcurrencyConflict`, and the engine
//! retries from a fresh read. Dropping a `transfer` future before the commit
//! leaves no partial mutation, because all mutation happens inside the
//! store's atomic commit.

use crate::core::selector::select_coins;
use crate::core::traits::{CoinStore, RateProvider};
use crate::types::{BalanceQuote, CoinId, CoinRecord, LedgerError, TransferOutcome};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

/// Tuning knobs for the ledger engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Currency pair requested from the rate provider
    pub pair: String,

    /// Minimum native-unit transfer amount
    ///
    /// Converted targets below this are rejected as dust.
    pub min_transfer: Decimal,

    /// Upper bound on a single rate-provider call
    pub rate_timeout: Duration,

    /// How many commit attempts a transfer makes before surfacing
    /// `ConcurrencyConflict`
    pub max_commit_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pair: "BTC/EUR".to_string(),
            min_transfer: Decimal::new(1, 5), // 0.00001
            rate_timeout: Duration::from_secs(5),
            max_commit_attempts: 3,
        }
    }
}

/// Orchestrates balance queries, funding, and transfers
///
/// Collaborators are constructor-injected and shared behind `Arc`, so one
/// engine instance can be cloned across concurrent request handlers.
#[derive(Clone)]
pub struct LedgerEngine {
    store: Arc<dyn CoinStore>,
    rates: Arc<dyn RateProvider>,
    config: EngineConfig,
}

impl LedgerEngine {
    /// Create an engine over the given collaborators
    pub fn new(store: Arc<dyn CoinStore>, rates: Arc<dyn RateProvider>) -> Self {
        Self::with_config(store, rates, EngineConfig::default())
    }

    /// Create an engine with explicit configuration
    pub fn with_config(
        store: Arc<dyn CoinStore>,
        rates: Arc<dyn RateProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            rates,
            config,
        }
    }

    /// The engine's configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Sum of all unspent coin amounts
    ///
    /// Pure read; fails only if the store read fails.
    pub async fn balance(&self) -> Result<Decimal, LedgerError> {
        let unspent = self.store.list_unspent().await?;
        Ok(unspent.iter().map(|c| c.amount).sum())
    }

    /// Balance in both native units and fiat at the current rate
    pub async fn quote_balance(&self) -> Result<BalanceQuote, LedgerError> {
        let native_total = self.balance().await?;
        let rate = self.fetch_rate().await?;

        Ok(BalanceQuote {
            native_total,
            fiat_total: native_total * rate,
            rate,
        })
    }

    /// The current unspent set, ordered oldest-first
    pub async fn unspent(&self) -> Result<Vec<CoinRecord>, LedgerError> {
        self.store.list_unspent().await
    }

    /// Every coin ever created, spent included, ordered oldest-first
    pub async fn history(&self) -> Result<Vec<CoinRecord>, LedgerError> {
        self.store.list_all().await
    }

    /// Record an external funding event as a new unspent coin
    ///
    /// # Arguments
    ///
    /// * `amount` - Native-unit value of the new coin, strictly positive
    ///
    /// # Returns
    ///
    /// The id of the created coin.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for a non-positive amount, `StoreFailure` if
    /// persisting fails.
    pub async fn fund(&self, amount: Decimal) -> Result<CoinId, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(
                &amount.to_string(),
                "funding amount must be positive",
            ));
        }

        let coin = CoinRecord::new(amount);
        let id = coin.id.clone();
        self.store.save(coin).await?;
        Ok(id)
    }

    /// Transfer a fiat amount out of the ledger
    ///
    /// Converts the fiat amount to native units at the current rate, selects
    /// unspent coins oldest-first until the target is covered, then atomically
    /// marks them spent and books the surplus as a single change coin.
    ///
    /// # Arguments
    ///
    /// * `fiat_amount` - Requested amount in the configured pair's fiat
    ///   currency, strictly positive
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` - non-positive request
    /// - `RateUnavailable` - provider failed, timed out, or returned a
    ///   non-positive rate
    /// - `AmountTooSmall` - converted target below the configured minimum
    /// - `InsufficientBalance` - unspent total cannot cover the target
    /// - `ConcurrencyConflict` - every commit attempt lost a coin to a
    ///   concurrent transfer
    /// - `StoreFailure` - persistence error; no partial state is left behind
    pub async fn transfer(&self, fiat_amount: Decimal) -> Result<TransferOutcome, LedgerError> {
        if fiat_amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(
                &fiat_amount.to_string(),
                "transfer amount must be positive",
            ));
        }

        // Rate first: the provider call has no side effects and must never
        // overlap the commit path.
        let rate = self.fetch_rate().await?;
        let target = fiat_amount / rate;

        if target < self.config.min_transfer {
            return Err(LedgerError::amount_too_small(
                target,
                self.config.min_transfer,
            ));
        }

        let max_attempts = self.config.max_commit_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.try_commit(target).await {
                Ok(outcome) => return Ok(outcome),
                Err(LedgerError::ConcurrencyConflict { .. }) if attempt < max_attempts => {
                    // A concurrent transfer won one of our coins; the unspent
                    // set has changed, so re-read and re-select.
                    log::warn!(
                        "transfer commit conflict on attempt {}/{}, retrying",
                        attempt,
                        max_attempts
                    );
                }
                Err(LedgerError::ConcurrencyConflict { .. }) => {
                    return Err(LedgerError::concurrency_conflict(max_attempts));
                }
                Err(err) => return Err(err),
            }
        }

        Err(LedgerError::concurrency_conflict(max_attempts))
    }

    /// One read-select-commit attempt for a native-unit target
    async fn try_commit(&self, target: Decimal) -> Result<TransferOutcome, LedgerError> {
        let coins = self.store.list_unspent().await?;
        let selection = select_coins(&coins, target);

        if !selection.covered {
            // selection.total is the whole unspent sum when uncovered
            return Err(LedgerError::insufficient_balance(selection.total, target));
        }

        let spent_ids: Vec<CoinId> = selection.chosen.iter().map(|c| c.id.clone()).collect();
        let surplus = selection.surplus(target);

        let change = if surplus > Decimal::ZERO {
            Some(CoinRecord::new(surplus))
        } else {
            None
        };
        let change_id = change.as_ref().map(|c| c.id.clone());

        self.store.commit_spend(&spent_ids, change).await?;

        log::debug!(
            "transfer committed: {} coin(s) spent totalling {}, change {:?}",
            spent_ids.len(),
            selection.total,
            change_id
        );

        Ok(TransferOutcome {
            spent_ids,
            spent_total: selection.total,
            target,
            change_id,
        })
    }

    /// Fetch the configured pair's rate, bounded by the engine timeout
    async fn fetch_rate(&self) -> Result<Decimal, LedgerError> {
        let rate = tokio::time::timeout(self.config.rate_timeout, self.rates.get_rate(&self.config.pair))
            .await
            .map_err(|_| {
                LedgerError::rate_unavailable(
                    &self.config.pair,
                    format!("timed out after {:?}", self.config.rate_timeout),
                )
            })??;

        if rate <= Decimal::ZERO {
            return Err(LedgerError::rate_unavailable(
                &self.config.pair,
                format!("provider returned non-positive rate {}", rate),
            ));
        }

        Ok(rate)
    }
}
