//! CSV format handling for ledger operations and state exports
//!
//! This module centralizes all CSV format concerns, providing:
//! - `CsvRecord` for deserializing one row of an operations file
//! - Conversion from CSV records to `LedgerCommand`s
//! - Writers for accounts, ledger entries and requests
//!
//! All functions are pure (no file access) for easy testing.
//!
//! # Operations format
//!
//! ```text
//! op,actor,target,amount,name
//! register,1,,,alice
//! deposit,1,,50.00,
//! approve,100,1,,
//! transfer,1,2,12.50,
//! ```
//!
//! `actor` is the identity issuing the operation. `target` is the recipient of
//! a transfer, the request id for `approve`/`reject`, or the account an
//! administrative operation applies to.

use crate::types::{
    Account, AccountId, EntryId, EntryKind, LedgerEntry, LedgerError, PendingRequest, RequestId,
    RequestKind, RequestStatus,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;

/// One row of an operations file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub op: String,
    pub actor: AccountId,
    pub target: Option<u64>,
    pub amount: Option<String>,
    pub name: Option<String>,
}

/// A parsed ledger operation, ready to be applied
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCommand {
    Register {
        identity: AccountId,
        name: String,
    },
    Submit {
        identity: AccountId,
        kind: RequestKind,
        amount: Decimal,
    },
    Transfer {
        sender: AccountId,
        recipient: AccountId,
        amount: Decimal,
    },
    Approve {
        actor: AccountId,
        request: RequestId,
    },
    Reject {
        actor: AccountId,
        request: RequestId,
    },
    SetBalance {
        actor: AccountId,
        identity: AccountId,
        amount: Decimal,
    },
    Reset {
        actor: AccountId,
        identity: AccountId,
    },
    Lock {
        actor: AccountId,
        identity: AccountId,
    },
    Unlock {
        actor: AccountId,
        identity: AccountId,
    },
}

/// Convert a CsvRecord to a LedgerCommand
///
/// This function:
/// - Parses the operation name (case insensitive)
/// - Parses the amount into a Decimal where the operation needs one
/// - Checks that `target` is present where the operation needs one
///
/// Amount range checks are left to the ledger, which reports them as
/// `InvalidAmount`.
pub fn convert_csv_record(record: CsvRecord) -> Result<LedgerCommand, String> {
    let actor = record.actor;
    let op = record.op.to_lowercase();

    let command = match op.as_str() {
        "register" => LedgerCommand::Register {
            identity: actor,
            name: record
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| format!("user-{actor}")),
        },
        "deposit" | "withdraw" | "withdrawal" => LedgerCommand::Submit {
            identity: actor,
            kind: if op == "deposit" {
                RequestKind::Deposit
            } else {
                RequestKind::Withdrawal
            },
            amount: parse_amount(&op, record.amount)?,
        },
        "transfer" => LedgerCommand::Transfer {
            sender: actor,
            recipient: require_target(&op, record.target)?,
            amount: parse_amount(&op, record.amount)?,
        },
        "approve" => LedgerCommand::Approve {
            actor,
            request: require_target(&op, record.target)?,
        },
        "reject" => LedgerCommand::Reject {
            actor,
            request: require_target(&op, record.target)?,
        },
        "set_balance" | "setbalance" => LedgerCommand::SetBalance {
            actor,
            identity: require_target(&op, record.target)?,
            amount: parse_amount(&op, record.amount)?,
        },
        "reset" => LedgerCommand::Reset {
            actor,
            identity: require_target(&op, record.target)?,
        },
        "lock" => LedgerCommand::Lock {
            actor,
            identity: require_target(&op, record.target)?,
        },
        "unlock" => LedgerCommand::Unlock {
            actor,
            identity: require_target(&op, record.target)?,
        },
        _ => return Err(format!("Unknown operation '{}'", record.op)),
    };

    Ok(command)
}

fn require_target(op: &str, target: Option<u64>) -> Result<u64, String> {
    target.ok_or_else(|| format!("{} requires a target", op))
}

fn parse_amount(op: &str, amount: Option<String>) -> Result<Decimal, String> {
    match amount {
        Some(amount) if !amount.trim().is_empty() => Decimal::from_str(amount.trim())
            .map_err(|_| format!("Invalid amount '{}' for {}", amount, op)),
        _ => Err(format!("{} requires an amount", op)),
    }
}

fn write_error(context: &str, error: impl std::fmt::Display) -> LedgerError {
    LedgerError::IoError {
        message: format!("Failed to write {}: {}", context, error),
    }
}

/// Output row of the accounts view
#[derive(Debug, Serialize)]
struct AccountRow<'a> {
    account: AccountId,
    name: &'a str,
    balance: String,
    locked: bool,
}

/// Output row of the transactions view
#[derive(Debug, Serialize)]
struct EntryRow {
    id: EntryId,
    account: AccountId,
    kind: EntryKind,
    amount: String,
    reference: Option<u64>,
    timestamp: DateTime<Utc>,
}

/// Output row of the requests view
#[derive(Debug, Serialize)]
struct RequestRow {
    id: RequestId,
    account: AccountId,
    kind: RequestKind,
    amount: String,
    status: RequestStatus,
}

/// Writer with an explicit header, so an empty view still prints one
fn csv_writer<'w>(
    output: &'w mut dyn Write,
    header: &[&str],
) -> Result<csv::Writer<&'w mut dyn Write>, LedgerError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);
    writer
        .write_record(header)
        .map_err(|e| write_error("CSV header", e))?;
    Ok(writer)
}

fn scaled(amount: Decimal, scale: u32) -> String {
    format!("{:.*}", scale as usize, amount)
}

/// Write account states to CSV
///
/// Columns: account, name, balance, locked. Accounts are sorted by id for
/// deterministic output; balances are printed with `scale` decimal places.
pub fn write_accounts_csv(
    accounts: &[Account],
    scale: u32,
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv_writer(output, &["account", "name", "balance", "locked"])?;

    let mut sorted: Vec<&Account> = accounts.iter().collect();
    sorted.sort_by_key(|account| account.id);

    for account in sorted {
        writer
            .serialize(AccountRow {
                account: account.id,
                name: &account.display_name,
                balance: scaled(account.balance, scale),
                locked: account.locked,
            })
            .map_err(|e| write_error("account record", e))?;
    }

    writer.flush().map_err(|e| write_error("output", e))?;
    Ok(())
}

/// Write ledger entries to CSV
///
/// Columns: id, account, kind, amount, reference, timestamp (RFC 3339).
/// Entries are written in the order given.
pub fn write_entries_csv(
    entries: &[LedgerEntry],
    scale: u32,
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv_writer(
        output,
        &["id", "account", "kind", "amount", "reference", "timestamp"],
    )?;

    for entry in entries {
        writer
            .serialize(EntryRow {
                id: entry.id,
                account: entry.account_id,
                kind: entry.kind,
                amount: scaled(entry.amount, scale),
                reference: entry.reference,
                timestamp: entry.timestamp,
            })
            .map_err(|e| write_error("entry record", e))?;
    }

    writer.flush().map_err(|e| write_error("output", e))?;
    Ok(())
}

/// Write requests to CSV
///
/// Columns: id, account, kind, amount, status.
pub fn write_requests_csv(
    requests: &[PendingRequest],
    scale: u32,
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv_writer(output, &["id", "account", "kind", "amount", "status"])?;

    for request in requests {
        writer
            .serialize(RequestRow {
                id: request.id,
                account: request.account_id,
                kind: request.kind,
                amount: scaled(request.amount, scale),
                status: request.status,
            })
            .map_err(|e| write_error("request record", e))?;
    }

    writer.flush().map_err(|e| write_error("output", e))?;
    Ok(())
}
