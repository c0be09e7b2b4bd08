//! Streaming reader over an operations CSV file
//!
//! `OperationReader` yields one `Result<LedgerCommand, LedgerError>` per data
//! row, reading rows one at a time. Malformed rows come back as
//! `LedgerError::ParseError` carrying the line number, and iteration carries on
//! with the next row.
//!
//! ```no_run
//! use custodial_ledger::io::OperationReader;
//! use std::path::Path;
//!
//! let reader = OperationReader::open(Path::new("operations.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(command) => println!("{:?}", command),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```

use crate::io::csv_format::{convert_csv_record, CsvRecord, LedgerCommand};
use crate::types::LedgerError;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

#[derive(Debug)]
pub struct OperationReader<R = File> {
    reader: csv::Reader<R>,
    headers: StringRecord,
    /// Set once the underlying reader has failed; no further rows are read
    failed: bool,
}

impl OperationReader<File> {
    /// Open an operations file
    ///
    /// # Returns
    ///
    /// * `Ok(OperationReader)` if the file opened and its header row was read
    /// * `Err(LedgerError::FileNotFound)` if there is no such file
    /// * `Err(LedgerError::IoError)` / `Err(LedgerError::ParseError)` otherwise
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LedgerError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => LedgerError::IoError {
                message: format!("Failed to open file '{}': {}", path.display(), e),
            },
        })?;
        Self::from_reader(file)
    }
}

impl<R: Read> OperationReader<R> {
    /// Wrap any reader producing operations CSV
    ///
    /// Fields are trimmed and rows may omit trailing optional columns.
    pub fn from_reader(input: R) -> Result<Self, LedgerError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(input);
        let headers = reader.headers()?.clone();

        Ok(Self {
            reader,
            headers,
            failed: false,
        })
    }
}

impl<R: Read> Iterator for OperationReader<R> {
    type Item = Result<LedgerCommand, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let mut row = StringRecord::new();
        match self.reader.read_record(&mut row) {
            Ok(false) => None,
            Ok(true) => {
                let line = row.position().map(|pos| pos.line());
                let parsed = row
                    .deserialize::<CsvRecord>(Some(&self.headers))
                    .map_err(LedgerError::from)
                    .and_then(|record| {
                        convert_csv_record(record)
                            .map_err(|message| LedgerError::ParseError { line, message })
                    });
                Some(parsed)
            }
            Err(e) => {
                // An I/O failure would repeat on every call; end the stream.
                self.failed = e.is_io_error();
                Some(Err(e.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestKind;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "op,actor,target,amount,name\n";

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn read_all(content: &str) -> Vec<Result<LedgerCommand, LedgerError>> {
        let file = create_temp_csv(content);
        OperationReader::open(file.path()).unwrap().collect()
    }

    #[test]
    fn test_open_missing_file() {
        let result = OperationReader::open(Path::new("nonexistent.csv"));
        assert_eq!(
            result.unwrap_err(),
            LedgerError::FileNotFound {
                path: "nonexistent.csv".to_string()
            }
        );
    }

    #[test]
    fn test_reads_commands_in_order() {
        let records = read_all(&format!(
            "{HEADER}register,1,,,alice\ndeposit,1,,50.00,\ntransfer,1,2,5,\n"
        ));

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            Ok(LedgerCommand::Register {
                identity: 1,
                name: "alice".to_string()
            })
        );
        assert_eq!(
            records[1],
            Ok(LedgerCommand::Submit {
                identity: 1,
                kind: RequestKind::Deposit,
                amount: Decimal::new(5000, 2)
            })
        );
        assert!(matches!(records[2], Ok(LedgerCommand::Transfer { .. })));
    }

    #[test]
    fn test_trims_whitespace_and_allows_short_rows() {
        let records = read_all("op,actor,target,amount,name\n  approve , 100 , 3 \n");

        assert_eq!(
            records,
            vec![Ok(LedgerCommand::Approve {
                actor: 100,
                request: 3
            })]
        );
    }

    #[test]
    fn test_malformed_rows_carry_line_numbers_and_do_not_stop_iteration() {
        let records = read_all(&format!(
            "{HEADER}register,1,,,\ndeposit,1,,abc,\nexplode,1,,,\nnot-a-number,x,,,\ndeposit,1,,5,\n"
        ));

        assert_eq!(records.len(), 5);
        assert!(records[0].is_ok());
        assert_eq!(
            records[1],
            Err(LedgerError::ParseError {
                line: Some(3),
                message: "Invalid amount 'abc' for deposit".to_string()
            })
        );
        assert!(matches!(
            records[2],
            Err(LedgerError::ParseError { line: Some(4), .. })
        ));
        assert!(matches!(records[3], Err(LedgerError::ParseError { .. })));
        assert!(records[4].is_ok());
    }

    /// Yields the header, then fails every read
    struct BrokenPipe {
        header_sent: bool,
    }

    impl Read for BrokenPipe {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.header_sent {
                return Err(std::io::Error::new(ErrorKind::BrokenPipe, "connection lost"));
            }
            self.header_sent = true;
            let header = HEADER.as_bytes();
            buf[..header.len()].copy_from_slice(header);
            Ok(header.len())
        }
    }

    #[test]
    fn test_io_error_ends_iteration() {
        let reader = OperationReader::from_reader(BrokenPipe { header_sent: false }).unwrap();

        let records: Vec<_> = reader.take(10).collect();

        assert_eq!(records.len(), 1);
        assert!(matches!(records[0], Err(LedgerError::IoError { .. })));
    }

    #[test]
    fn test_empty_file_after_header() {
        assert!(read_all(HEADER).is_empty());
    }

    #[test]
    fn test_from_in_memory_reader() {
        let input = format!("{HEADER}lock,100,1,,\n");
        let records: Vec<_> = OperationReader::from_reader(input.as_bytes())
            .unwrap()
            .collect();

        assert_eq!(
            records,
            vec![Ok(LedgerCommand::Lock {
                actor: 100,
                identity: 1
            })]
        );
    }
}
