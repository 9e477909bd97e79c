//! CSV format handling for ledger operations and coin snapshots
//!
//! This module centralizes all CSV format concerns, providing:
//! - Record structures for deserialization
//! - Conversion from CSV records to domain types
//! - Coin-set output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{CoinRecord, LedgerOp, OpKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Operations-file row: `op,amount`
///
/// `op` is `fund` or `transfer`; `amount` is a positive decimal (native unit
/// for fund, fiat for transfer).
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvOpRecord {
    pub op: String,
    pub amount: String,
}

/// Snapshot-file row: `id,amount,spent,created_at`
///
/// Mirrors the persisted record layout; `created_at` is RFC 3339.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvCoinRecord {
    pub id: String,
    pub amount: String,
    pub spent: bool,
    pub created_at: String,
}

/// Convert a CsvOpRecord to a LedgerOp
///
/// Validates the operation kind and that the amount is a strictly positive
/// decimal.
///
/// # Returns
///
/// Result containing either:
/// - Ok(LedgerOp) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_op_record(record: CsvOpRecord) -> Result<LedgerOp, String> {
    let kind = match record.op.to_lowercase().as_str() {
        "fund" => OpKind::Fund,
        "transfer" => OpKind::Transfer,
        other => return Err(format!("Invalid operation type: '{}'", other)),
    };

    let amount = Decimal::from_str(record.amount.trim())
        .map_err(|_| format!("Invalid amount '{}'", record.amount))?;

    if amount <= Decimal::ZERO {
        return Err(format!(
            "Amount must be positive, got '{}'",
            record.amount
        ));
    }

    Ok(LedgerOp { kind, amount })
}

/// Convert a CsvCoinRecord to a CoinRecord
///
/// Validates a positive amount and an RFC 3339 timestamp; ids are taken as
/// written.
pub fn convert_coin_record(record: CsvCoinRecord) -> Result<CoinRecord, String> {
    let amount = Decimal::from_str(record.amount.trim())
        .map_err(|_| format!("Invalid amount '{}' for coin {}", record.amount, record.id))?;

    if amount <= Decimal::ZERO {
        return Err(format!(
            "Coin {} has non-positive amount '{}'",
            record.id, record.amount
        ));
    }

    let created_at = DateTime::parse_from_rfc3339(record.created_at.trim())
        .map_err(|e| {
            format!(
                "Invalid created_at '{}' for coin {}: {}",
                record.created_at, record.id, e
            )
        })?
        .with_timezone(&Utc);

    Ok(CoinRecord::with_parts(
        record.id,
        amount,
        record.spent,
        created_at,
    ))
}

/// Write a coin set to CSV format
///
/// Writes coins with columns: id, amount, spent, created_at. Coins are
/// sorted oldest-first (id as tiebreak) for deterministic output.
///
/// # Arguments
///
/// * `coins` - Slice of coin records to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_coins_csv(coins: &[CoinRecord], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["id", "amount", "spent", "created_at"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_coins = coins.to_vec();
    sorted_coins.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    for coin in sorted_coins {
        writer
            .write_record(&[
                coin.id.clone(),
                coin.amount.normalize().to_string(),
                coin.spent.to_string(),
                coin.created_at.to_rfc3339(),
            ])
            .map_err(|e| format!("Failed to write coin record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rstest::rstest;

    #[rstest]
    #[case("fund", OpKind::Fund, "1.5")]
    #[case("transfer", OpKind::Transfer, "100")]
    #[case("FUND", OpKind::Fund, "0.00001")] // case insensitive
    fn test_convert_op_record_valid(
        #[case] op: &str,
        #[case] expected_kind: OpKind,
        #[case] amount: &str,
    ) {
        let record = CsvOpRecord {
            op: op.to_string(),
            amount: amount.to_string(),
        };

        let result = convert_op_record(record).unwrap();
        assert_eq!(result.kind, expected_kind);
        assert_eq!(result.amount, Decimal::from_str(amount).unwrap());
    }

    #[rstest]
    #[case::unknown_op("stake", "1.0")]
    #[case::empty_amount("fund", "")]
    #[case::garbage_amount("fund", "abc")]
    #[case::zero_amount("transfer", "0")]
    #[case::negative_amount("transfer", "-2.5")]
    fn test_convert_op_record_invalid(#[case] op: &str, #[case] amount: &str) {
        let record = CsvOpRecord {
            op: op.to_string(),
            amount: amount.to_string(),
        };

        assert!(convert_op_record(record).is_err());
    }

    #[test]
    fn test_convert_coin_record_valid() {
        let record = CsvCoinRecord {
            id: "abc123".to_string(),
            amount: "2.5".to_string(),
            spent: false,
            created_at: "2024-03-01T12:00:00+00:00".to_string(),
        };

        let coin = convert_coin_record(record).unwrap();
        assert_eq!(coin.id, "abc123");
        assert_eq!(coin.amount, Decimal::new(25, 1));
        assert!(!coin.spent);
    }

    #[rstest]
    #[case::bad_amount("x", "2024-03-01T12:00:00+00:00")]
    #[case::zero_amount("0", "2024-03-01T12:00:00+00:00")]
    #[case::bad_timestamp("2.5", "yesterday")]
    fn test_convert_coin_record_invalid(#[case] amount: &str, #[case] created_at: &str) {
        let record = CsvCoinRecord {
            id: "abc123".to_string(),
            amount: amount.to_string(),
            spent: false,
            created_at: created_at.to_string(),
        };

        assert!(convert_coin_record(record).is_err());
    }

    #[test]
    fn test_write_coins_csv_sorted_output() {
        let base = Utc::now();
        let coins = vec![
            CoinRecord::with_parts(
                "younger".to_string(),
                Decimal::new(30000, 4),
                false,
                base + Duration::seconds(10),
            ),
            CoinRecord::with_parts("older".to_string(), Decimal::new(50000, 4), true, base),
        ];

        let mut output = Vec::new();
        write_coins_csv(&coins, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,amount,spent,created_at");
        assert!(lines[1].starts_with("older,5,true,"));
        assert!(lines[2].starts_with("younger,3,false,"));
    }
}
