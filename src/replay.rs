//! Replay of an operations file against a ledger
//!
//! The replay tool drives a [`Ledger`] from a CSV of operations, one row per
//! call, and writes the resulting state back out as CSV. Rows that fail to
//! parse and operations the ledger refuses are logged and skipped; only I/O
//! failures stop a replay.

use crate::core::traits::LedgerStore;
use crate::core::Ledger;
use crate::io::csv_format::{write_accounts_csv, write_entries_csv, write_requests_csv};
use crate::io::{LedgerCommand, OperationReader};
use crate::types::LedgerError;
use clap::ValueEnum;
use std::io::Write;
use std::path::Path;
use tracing::{error, info, warn};

/// Which part of the final ledger state to print
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputKind {
    /// One row per account
    #[default]
    Accounts,
    /// Every ledger entry, in posting order
    Transactions,
    /// Every request, pending or resolved
    Requests,
}

/// Counters collected while replaying
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Operations the ledger accepted
    pub applied: usize,
    /// Operations the ledger refused
    pub rejected: usize,
    /// Rows that could not be parsed into an operation
    pub malformed: usize,
}

/// Apply one parsed operation
pub fn apply<S: LedgerStore>(ledger: &Ledger<S>, command: LedgerCommand) -> Result<(), LedgerError> {
    match command {
        LedgerCommand::Register { identity, name } => {
            ledger.register(identity, &name)?;
        }
        LedgerCommand::Submit {
            identity,
            kind,
            amount,
        } => {
            ledger.submit_request(identity, kind, amount)?;
        }
        LedgerCommand::Transfer {
            sender,
            recipient,
            amount,
        } => {
            ledger.transfer(sender, recipient, amount)?;
        }
        LedgerCommand::Approve { actor, request } => {
            ledger.approve(actor, request)?;
        }
        LedgerCommand::Reject { actor, request } => {
            ledger.reject(actor, request)?;
        }
        LedgerCommand::SetBalance {
            actor,
            identity,
            amount,
        } => {
            ledger.set_balance(actor, identity, amount)?;
        }
        LedgerCommand::Reset { actor, identity } => {
            ledger.reset_balance(actor, identity)?;
        }
        LedgerCommand::Lock { actor, identity } => {
            ledger.lock_account(actor, identity)?;
        }
        LedgerCommand::Unlock { actor, identity } => {
            ledger.unlock_account(actor, identity)?;
        }
    }
    Ok(())
}

/// Apply a stream of parsed rows in order
///
/// Neither a malformed row nor a refused operation stops the replay. A read
/// failure on the input ends it early.
pub fn replay<S, I>(ledger: &Ledger<S>, rows: I) -> ReplaySummary
where
    S: LedgerStore,
    I: IntoIterator<Item = Result<LedgerCommand, LedgerError>>,
{
    let mut summary = ReplaySummary::default();

    for row in rows {
        match row {
            Ok(command) => match apply(ledger, command.clone()) {
                Ok(()) => summary.applied += 1,
                Err(error) => {
                    warn!(?command, kind = error.kind(), %error, "operation rejected");
                    summary.rejected += 1;
                }
            },
            Err(error @ LedgerError::IoError { .. }) => {
                error!(%error, "input read failed, stopping replay");
                break;
            }
            Err(error) => {
                warn!(%error, "skipping malformed row");
                summary.malformed += 1;
            }
        }
    }

    summary
}

/// Write the requested view of the ledger as CSV
pub fn write_output<S: LedgerStore>(
    ledger: &Ledger<S>,
    kind: OutputKind,
    scale: u32,
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let store = ledger.store();
    match kind {
        OutputKind::Accounts => write_accounts_csv(&store.accounts(), scale, output),
        OutputKind::Transactions => write_entries_csv(&store.entries(), scale, output),
        OutputKind::Requests => write_requests_csv(&store.requests(), scale, output),
    }
}

/// Replay the file at `input` and print the selected view to `output`
///
/// # Returns
///
/// * `Ok(ReplaySummary)` - The file was read to the end and the output written
/// * `Err(LedgerError::FileNotFound)` / `Err(LedgerError::IoError)` - The input
///   could not be opened or the output could not be written
pub fn replay_file<S: LedgerStore>(
    ledger: &Ledger<S>,
    input: &Path,
    kind: OutputKind,
    scale: u32,
    output: &mut dyn Write,
) -> Result<ReplaySummary, LedgerError> {
    let reader = OperationReader::open(input)?;
    let summary = replay(ledger, reader);
    info!(
        applied = summary.applied,
        rejected = summary.rejected,
        malformed = summary.malformed,
        "replay finished"
    );

    write_output(ledger, kind, scale, output)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::notify::NoopSink;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    const ADMIN: u64 = 100;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn ledger() -> Ledger {
        Ledger::from_config(&LedgerConfig::new([ADMIN], 2), Arc::new(NoopSink))
    }

    fn run(content: &str, kind: OutputKind) -> (ReplaySummary, String) {
        let file = create_temp_csv(content);
        let ledger = ledger();
        let mut output = Vec::new();

        let summary = replay_file(&ledger, file.path(), kind, 2, &mut output).unwrap();
        (summary, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_replay_deposit_approval() {
        let (summary, output) = run(
            "op,actor,target,amount,name\n\
             register,1,,,alice\n\
             deposit,1,,50,\n\
             approve,100,1,,\n",
            OutputKind::Accounts,
        );

        assert_eq!(
            summary,
            ReplaySummary {
                applied: 3,
                rejected: 0,
                malformed: 0
            }
        );
        assert_eq!(output, "account,name,balance,locked\n1,alice,50.00,false\n");
    }

    #[test]
    fn test_replay_continues_after_refused_and_malformed_rows() {
        let (summary, output) = run(
            "op,actor,target,amount,name\n\
             register,1,,,alice\n\
             register,2,,,bob\n\
             transfer,1,2,10,\n\
             approve,1,1,,\n\
             deposit,1,,lots,\n\
             set_balance,100,1,30,\n\
             transfer,1,2,10,\n",
            OutputKind::Accounts,
        );

        assert_eq!(summary.applied, 4);
        assert_eq!(summary.rejected, 2);
        assert_eq!(summary.malformed, 1);
        assert_eq!(
            output,
            "account,name,balance,locked\n1,alice,20.00,false\n2,bob,10.00,false\n"
        );
    }

    #[test]
    fn test_replay_requests_output_keeps_resolved_rows() {
        let (_, output) = run(
            "op,actor,target,amount,name\n\
             register,1,,,alice\n\
             deposit,1,,5,\n\
             withdraw,1,,5,\n\
             reject,100,2,,\n",
            OutputKind::Requests,
        );

        assert_eq!(
            output,
            "id,account,kind,amount,status\n\
             1,1,deposit,5.00,pending\n\
             2,1,withdrawal,5.00,rejected\n"
        );
    }

    #[test]
    fn test_replay_transactions_output() {
        let (_, output) = run(
            "op,actor,target,amount,name\n\
             register,1,,,alice\n\
             register,2,,,bob\n\
             set_balance,100,1,10,\n\
             transfer,1,2,4,\n",
            OutputKind::Transactions,
        );

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "id,account,kind,amount,reference,timestamp");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("1,1,admin_adjustment,10.00,,"));
        assert!(lines[2].starts_with("2,1,transfer_out,-4.00,2,"));
        assert!(lines[3].starts_with("3,2,transfer_in,4.00,1,"));
    }

    #[test]
    fn test_replay_missing_file() {
        let ledger = ledger();
        let mut output = Vec::new();

        let result = replay_file(
            &ledger,
            Path::new("nonexistent.csv"),
            OutputKind::Accounts,
            2,
            &mut output,
        );

        assert!(matches!(result, Err(LedgerError::FileNotFound { .. })));
        assert!(output.is_empty());
    }

    #[test]
    fn test_replay_stops_at_read_failure() {
        let ledger = ledger();
        let rows = vec![
            Ok(LedgerCommand::Register {
                identity: 1,
                name: "alice".to_string(),
            }),
            Err(LedgerError::IoError {
                message: "connection lost".to_string(),
            }),
            Ok(LedgerCommand::Register {
                identity: 2,
                name: "bob".to_string(),
            }),
        ];

        let summary = replay(&ledger, rows);

        assert_eq!(summary.applied, 1);
        assert_eq!(summary.malformed, 0);
        assert!(ledger.account(2).is_err());
    }

    #[test]
    fn test_apply_surfaces_ledger_errors() {
        let ledger = ledger();

        let result = apply(
            &ledger,
            LedgerCommand::Lock {
                actor: 7,
                identity: 1,
            },
        );

        assert_eq!(result, Err(LedgerError::permission_denied(7, "lock accounts")));
    }
}
