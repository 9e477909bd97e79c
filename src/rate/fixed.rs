//! Fixed-rate provider
//!
//! A constant-rate `RateProvider` for offline runs, demos, and tests. The
//! rate applies to every pair asked for.

use crate::core::traits::RateProvider;
use crate::types::LedgerError;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Rate provider that always answers with the same rate
#[derive(Debug, Clone)]
pub struct FixedRateProvider {
    rate: Decimal,
}

impl FixedRateProvider {
    /// Create a provider answering `rate` for every pair
    pub fn new(rate: Decimal) -> Self {
        Self { rate }
    }
}

#[async_trait]
impl RateProvider for FixedRateProvider {
    async fn get_rate(&self, _pair: &str) -> Result<Decimal, LedgerError> {
        Ok(self.rate)
    }
}
