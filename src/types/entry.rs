//! Ledger entry types
//!
//! A ledger entry is the immutable record of one balance-affecting event on
//! one account. Entries are never mutated or deleted.

use super::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Ledger entry identifier, monotonically increasing across the whole ledger
pub type EntryId = u64;

/// Kind of balance-affecting event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Approved deposit request (positive)
    Deposit,

    /// Approved withdrawal request (negative)
    Withdrawal,

    /// Incoming side of a transfer (positive)
    TransferIn,

    /// Outgoing side of a transfer (negative)
    TransferOut,

    /// Administrative balance override, signed by the delta it applied
    AdminAdjustment,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Deposit => "deposit",
            EntryKind::Withdrawal => "withdrawal",
            EntryKind::TransferIn => "transfer_in",
            EntryKind::TransferOut => "transfer_out",
            EntryKind::AdminAdjustment => "admin_adjustment",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable transaction log record
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub account_id: AccountId,
    pub kind: EntryKind,

    /// Signed amount: negative for outflows
    pub amount: Decimal,

    /// Request id for deposits/withdrawals, counterparty account for transfers
    pub reference: Option<u64>,

    pub timestamp: DateTime<Utc>,
}
