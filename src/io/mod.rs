//! I/O module
//!
//! Handles the operations CSV consumed by the replay tool and the CSV exports
//! of ledger state.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, output serialization)
//! - `reader` - Streaming reader with iterator interface

pub mod csv_format;
pub mod reader;

pub use csv_format::{
    convert_csv_record, write_accounts_csv, write_entries_csv, write_requests_csv, CsvRecord,
    LedgerCommand,
};
pub use reader::OperationReader;
