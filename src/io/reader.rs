//! CSV readers for operations and snapshot files
//!
//! Delegates format concerns to the csv_format module.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, unreadable CSV structure) are returned
//! - Malformed operation rows are recoverable: they are reported back to the
//!   caller alongside the good rows so the pipeline can log and continue
//! - Snapshot rows are strict: seed data is expected to be valid, so the
//!   first bad row aborts the load

use crate::io::csv_format::{
    convert_coin_record, convert_op_record, CsvCoinRecord, CsvOpRecord,
};
use crate::types::{CoinRecord, LedgerError, LedgerOp};
use csv::{ReaderBuilder, Trim};
use std::path::Path;

/// An operations file split into parsed rows and per-row failures
#[derive(Debug, Default)]
pub struct OpsFile {
    /// Successfully parsed operations, in file order
    pub ops: Vec<LedgerOp>,

    /// Human-readable descriptions of the rows that failed to parse
    pub row_errors: Vec<String>,
}

/// Read an operations file (`op,amount` rows)
///
/// # Arguments
///
/// * `path` - Path to the CSV file
///
/// # Returns
///
/// An `OpsFile` with the parsed operations in file order and a description
/// of every skipped row.
///
/// # Errors
///
/// Returns `IoError` if the file cannot be opened and `ParseError` if the
/// CSV structure itself is unreadable.
pub fn read_ops_file(path: &Path) -> Result<OpsFile, LedgerError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| LedgerError::IoError {
            message: format!("Failed to open '{}': {}", path.display(), e),
        })?;

    let mut result = OpsFile::default();

    for (index, row) in reader.deserialize::<CsvOpRecord>().enumerate() {
        // Header is line 1, first data row line 2
        let line = index + 2;
        match row {
            Ok(record) => match convert_op_record(record) {
                Ok(op) => result.ops.push(op),
                Err(message) => result.row_errors.push(format!("line {}: {}", line, message)),
            },
            Err(e) => result.row_errors.push(format!("line {}: {}", line, e)),
        }
    }

    Ok(result)
}

/// Read a coin snapshot file (`id,amount,spent,created_at` rows)
///
/// # Errors
///
/// Returns `IoError` if the file cannot be opened, `ParseError` for the
/// first invalid row.
pub fn read_coin_snapshot(path: &Path) -> Result<Vec<CoinRecord>, LedgerError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| LedgerError::IoError {
            message: format!("Failed to open '{}': {}", path.display(), e),
        })?;

    let mut coins = Vec::new();
    for (index, row) in reader.deserialize::<CsvCoinRecord>().enumerate() {
        let line = (index + 2) as u64;
        let record = row?;
        let coin = convert_coin_record(record).map_err(|message| LedgerError::ParseError {
            line: Some(line),
            message,
        })?;
        coins.push(coin);
    }

    Ok(coins)
}
