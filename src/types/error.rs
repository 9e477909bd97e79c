//! Error types for the coin ledger
//!
//! This module defines all error kinds surfaced by the ledger engine and its
//! I/O surface. The five engine kinds are kept distinguishable so callers can
//! react differently to a transient conflict than to a genuine shortfall.
//!
//! # Error Categories
//!
//! - **Engine errors**: rate unavailable, amount too small, insufficient
//!   balance, concurrency conflict, store failure
//! - **Validation errors**: non-positive or malformed amounts
//! - **I/O errors**: file access and CSV parsing failures in the batch surface

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the coin ledger
///
/// Each variant includes enough context to diagnose the failure from a log
/// line alone.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// The rate provider failed, timed out, or did not carry the pair
    ///
    /// The transfer is aborted before any store access; nothing to roll back.
    #[error("Exchange rate unavailable for {pair}: {message}")]
    RateUnavailable {
        /// The currency pair that was requested
        pair: String,
        /// Description of the provider failure
        message: String,
    },

    /// The converted target falls below the configured minimum
    ///
    /// Prevents creating economically meaningless dust transfers. The store
    /// is never touched for such a request.
    #[error("Transfer amount {amount} is below the minimum of {minimum}")]
    AmountTooSmall {
        /// The converted native-unit target
        amount: Decimal,
        /// The configured minimum transfer amount
        minimum: Decimal,
    },

    /// The unspent set does not cover the requested amount
    ///
    /// No state is mutated; every selected coin remains unspent.
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Sum of the unspent set at selection time
        available: Decimal,
        /// The native-unit target that could not be covered
        requested: Decimal,
    },

    /// A chosen coin was spent by a concurrent transfer before commit
    ///
    /// Transient: the unspent set has changed, so a fresh read and a new
    /// selection may succeed. The engine retries internally a bounded number
    /// of times before surfacing this.
    #[error("Commit conflict after {attempts} attempt(s): a selected coin was spent concurrently")]
    ConcurrencyConflict {
        /// How many commit attempts were made
        attempts: u32,
    },

    /// The underlying store failed on a read or write
    #[error("Store failure: {message}")]
    StoreFailure {
        /// Description of the persistence error
        message: String,
    },

    /// An amount failed validation (non-positive or unparseable)
    #[error("Invalid amount '{amount}': {message}")]
    InvalidAmount {
        /// The offending amount as written
        amount: String,
        /// Why it was rejected
        message: String,
    },

    /// CSV parsing error in the batch input
    ///
    /// Recoverable: the malformed row is skipped and processing continues.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// I/O error while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create a RateUnavailable error
    pub fn rate_unavailable(pair: &str, message: impl Into<String>) -> Self {
        LedgerError::RateUnavailable {
            pair: pair.to_string(),
            message: message.into(),
        }
    }

    /// Create an AmountTooSmall error
    pub fn amount_too_small(amount: Decimal, minimum: Decimal) -> Self {
        LedgerError::AmountTooSmall { amount, minimum }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientBalance {
            available,
            requested,
        }
    }

    /// Create a ConcurrencyConflict error
    pub fn concurrency_conflict(attempts: u32) -> Self {
        LedgerError::ConcurrencyConflict { attempts }
    }

    /// Create a StoreFailure error
    pub fn store_failure(message: impl Into<String>) -> Self {
        LedgerError::StoreFailure {
            message: message.into(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: &str, message: impl Into<String>) -> Self {
        LedgerError::InvalidAmount {
            amount: amount.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case::rate_unavailable(
        LedgerError::rate_unavailable("BTC/EUR", "connection refused"),
        "Exchange rate unavailable for BTC/EUR: connection refused"
    )]
    #[case::amount_too_small(
        LedgerError::amount_too_small(Decimal::new(5, 6), Decimal::new(1, 5)),
        "Transfer amount 0.000005 is below the minimum of 0.00001"
    )]
    #[case::insufficient_balance(
        LedgerError::insufficient_balance(Decimal::new(50000, 4), Decimal::new(60000, 4)),
        "Insufficient balance: available 5.0000, requested 6.0000"
    )]
    #[case::concurrency_conflict(
        LedgerError::concurrency_conflict(3),
        "Commit conflict after 3 attempt(s): a selected coin was spent concurrently"
    )]
    #[case::store_failure(
        LedgerError::store_failure("disk full"),
        "Store failure: disk full"
    )]
    #[case::invalid_amount(
        LedgerError::invalid_amount("-1.5", "amount must be positive"),
        "Invalid amount '-1.5': amount must be positive"
    )]
    #[case::parse_error_with_line(
        LedgerError::ParseError { line: Some(7), message: "bad field".to_string() },
        "CSV parse error at line 7: bad field"
    )]
    #[case::parse_error_without_line(
        LedgerError::ParseError { line: None, message: "bad field".to_string() },
        "CSV parse error: bad field"
    )]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: LedgerError = io_error.into();
        assert!(matches!(error, LedgerError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
