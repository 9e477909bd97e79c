//! HTTP rate provider
//!
//! Fetches a ticker document from a configurable endpoint and extracts the
//! rate for one currency pair. The response is decoded into a typed contract
//! at this boundary; raw JSON never reaches the engine.
//!
//! # Response format
//!
//! ```json
//! { "data": [ { "symbol": "BTC/EUR", "value": "59321.50" }, ... ] }
//! ```
//!
//! If the document carries the pair more than once, the first entry wins;
//! entry order is preserved from the response body, so the match is
//! deterministic for a given document.

use crate::core::traits::RateProvider;
use crate::types::LedgerError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// One ticker entry in the provider response
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TickerEntry {
    /// Currency pair, e.g. `BTC/EUR`
    pub symbol: String,
    /// Rate as a decimal string
    pub value: String,
}

/// Typed ticker document
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TickerResponse {
    /// All pairs the provider quotes
    pub data: Vec<TickerEntry>,
}

/// Extract the rate for `pair` from a decoded ticker document
///
/// Pure so the matching and parsing rules are testable without a server.
/// First matching entry wins.
///
/// # Errors
///
/// Returns `RateUnavailable` if the pair is absent or its value does not
/// parse as a decimal.
pub fn rate_from_ticker(response: &TickerResponse, pair: &str) -> Result<Decimal, LedgerError> {
    let entry = response
        .data
        .iter()
        .find(|e| e.symbol == pair)
        .ok_or_else(|| LedgerError::rate_unavailable(pair, "pair not found in ticker response"))?;

    Decimal::from_str(&entry.value).map_err(|e| {
        LedgerError::rate_unavailable(pair, format!("unparseable rate '{}': {}", entry.value, e))
    })
}

/// Rate provider backed by an HTTP ticker endpoint
///
/// Every transport, decode, or lookup failure maps to `RateUnavailable`; the
/// engine treats them all the same way (abort before the commit path).
#[derive(Debug, Clone)]
pub struct HttpRateProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRateProvider {
    /// Default per-request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Create a provider for the given ticker endpoint
    pub fn new(endpoint: impl Into<String>) -> Result<Self, LedgerError> {
        Self::with_timeout(endpoint, Self::DEFAULT_TIMEOUT)
    }

    /// Create a provider with an explicit request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::IoError {
                message: format!("http client init: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn get_rate(&self, pair: &str) -> Result<Decimal, LedgerError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| LedgerError::rate_unavailable(pair, format!("request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| LedgerError::rate_unavailable(pair, format!("bad status: {}", e)))?;

        let ticker: TickerResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::rate_unavailable(pair, format!("invalid body: {}", e)))?;

        rate_from_ticker(&ticker, pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn decode(body: &str) -> TickerResponse {
        serde_json::from_str(body).expect("test body must decode")
    }

    #[test]
    fn test_rate_from_ticker_finds_pair() {
        let ticker = decode(
            r#"{"data":[
                {"symbol":"ETH/EUR","value":"3100.25"},
                {"symbol":"BTC/EUR","value":"59321.50"}
            ]}"#,
        );

        let rate = rate_from_ticker(&ticker, "BTC/EUR").unwrap();
        assert_eq!(rate, Decimal::from_str("59321.50").unwrap());
    }

    #[test]
    fn test_rate_from_ticker_first_match_wins() {
        let ticker = decode(
            r#"{"data":[
                {"symbol":"BTC/EUR","value":"100.0"},
                {"symbol":"BTC/EUR","value":"200.0"}
            ]}"#,
        );

        let rate = rate_from_ticker(&ticker, "BTC/EUR").unwrap();
        assert_eq!(rate, Decimal::from_str("100.0").unwrap());
    }

    #[rstest]
    #[case::pair_missing(r#"{"data":[{"symbol":"ETH/EUR","value":"3100.25"}]}"#)]
    #[case::empty_data(r#"{"data":[]}"#)]
    #[case::bad_value(r#"{"data":[{"symbol":"BTC/EUR","value":"not-a-number"}]}"#)]
    fn test_rate_from_ticker_errors(#[case] body: &str) {
        let ticker = decode(body);
        let result = rate_from_ticker(&ticker, "BTC/EUR");
        assert!(matches!(result, Err(LedgerError::RateUnavailable { .. })));
    }

    #[test]
    fn test_ticker_response_decoding() {
        let ticker = decode(r#"{"data":[{"symbol":"BTC/EUR","value":"1.5"}]}"#);
        assert_eq!(
            ticker.data,
            vec![TickerEntry {
                symbol: "BTC/EUR".to_string(),
                value: "1.5".to_string(),
            }]
        );
    }
}
