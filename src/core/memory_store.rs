//! In-memory coin store
//!
//! This module provides `MemoryCoinStore`, a thread-safe `CoinStore`
//! implementation backed by `DashMap`. It is the store used by the batch
//! pipeline and by tests; a durable store implementing the same trait can be
//! swapped in without touching the engine.
//!
//! # Thread Safety
//!
//! Individual record reads and inserts go through DashMap's per-entry
//! locking. `commit_spend` needs atomicity across several records at once,
//! which per-entry locks cannot give, so commits are serialized behind a
//! dedicated mutex: the unspent check and the flips happen under one guard,
//! making a conflicting concurrent commit impossible.
//!
//! `list_unspent` copies whole records out of the map without taking the
//! commit lock; a reader sees each coin either before or after a commit,
//! never a torn record.

use crate::core::traits::CoinStore;
use crate::types::{CoinId, CoinRecord, LedgerError};
use async_trait::async_trait;
use dashmap::{DashMap, Entry};
use rust_decimal::Decimal;
use std::sync::Mutex;

/// Thread-safe in-memory coin store
///
/// Spent coins are retained for audit history; they never appear in
/// `list_unspent` and can never be selected again.
#[derive(Debug, Default)]
pub struct MemoryCoinStore {
    /// All coin records, spent and unspent, keyed by id
    coins: DashMap<CoinId, CoinRecord>,

    /// Serializes `commit_spend` invocations
    ///
    /// Held only for the duration of the in-memory check-and-flip; no I/O and
    /// no awaits happen under this lock.
    commit_lock: Mutex<()>,
}

impl MemoryCoinStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with existing records
    ///
    /// Non-positive amounts are rejected just like in `save`; duplicate ids
    /// keep the first occurrence.
    pub fn with_records(records: Vec<CoinRecord>) -> Result<Self, LedgerError> {
        let store = Self::new();
        for record in records {
            store.insert_record(record)?;
        }
        Ok(store)
    }

    /// Number of records in the store, spent included
    pub fn len(&self) -> usize {
        self.coins.len()
    }

    /// Whether the store holds no records at all
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    fn insert_record(&self, record: CoinRecord) -> Result<(), LedgerError> {
        if record.amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(
                &record.amount.to_string(),
                "coin amount must be positive",
            ));
        }

        match self.coins.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(LedgerError::store_failure(format!(
                "duplicate coin id {}",
                record.id
            ))),
            Entry::Vacant(entry) => {
                entry.insert(record);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl CoinStore for MemoryCoinStore {
    /// Return all unspent coins ordered by creation time, id as tiebreak
    async fn list_unspent(&self) -> Result<Vec<CoinRecord>, LedgerError> {
        let mut unspent: Vec<CoinRecord> = self
            .coins
            .iter()
            .filter(|e| !e.value().spent)
            .map(|e| e.value().clone())
            .collect();

        unspent.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(unspent)
    }

    /// Every record in the store, spent included, ordered oldest-first
    async fn list_all(&self) -> Result<Vec<CoinRecord>, LedgerError> {
        let mut all: Vec<CoinRecord> = self.coins.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(all)
    }

    async fn save(&self, record: CoinRecord) -> Result<(), LedgerError> {
        self.insert_record(record)
    }

    /// Atomically spend the chosen coins and insert the change record
    ///
    /// Verifies under the commit lock that every chosen coin is still
    /// unspent before flipping any flag. On a conflict nothing is mutated
    /// and the caller gets `ConcurrencyConflict`, so a retry can re-read the
    /// changed unspent set.
    async fn commit_spend(
        &self,
        chosen: &[CoinId],
        change: Option<CoinRecord>,
    ) -> Result<(), LedgerError> {
        let _guard = self
            .commit_lock
            .lock()
            .map_err(|e| LedgerError::store_failure(format!("commit lock poisoned: {}", e)))?;

        // Validation phase: nothing is mutated until every check passes.
        for id in chosen {
            match self.coins.get(id) {
                Some(coin) if !coin.spent => {}
                Some(_) => return Err(LedgerError::concurrency_conflict(1)),
                None => {
                    return Err(LedgerError::store_failure(format!(
                        "unknown coin id {} in commit",
                        id
                    )))
                }
            }
        }

        if let Some(ref change_coin) = change {
            if change_coin.amount <= Decimal::ZERO {
                return Err(LedgerError::invalid_amount(
                    &change_coin.amount.to_string(),
                    "change amount must be positive",
                ));
            }
            if self.coins.contains_key(&change_coin.id) {
                return Err(LedgerError::store_failure(format!(
                    "duplicate coin id {}",
                    change_coin.id
                )));
            }
        }

        // Mutation phase: cannot fail, so the commit is all-or-nothing.
        for id in chosen {
            if let Some(mut coin) = self.coins.get_mut(id) {
                coin.spent = true;
            }
        }
        if let Some(change_coin) = change {
            self.coins.insert(change_coin.id.clone(), change_coin);
        }

        Ok(())
    }
}
