//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, output serialization)
//! - `reader` - Operations and snapshot file readers

pub mod csv_format;
pub mod reader;

pub use csv_format::{convert_coin_record, convert_op_record, write_coins_csv};
pub use reader::{read_coin_snapshot, read_ops_file, OpsFile};
