//! Lifecycle events relayed to the notification hook

use super::account::AccountId;
use super::request::{RequestId, RequestKind};
use rust_decimal::Decimal;
use std::fmt;

/// Something a user should be told about
///
/// Events are only produced after the state change they describe has
/// committed.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    AccountRegistered,
    RequestSubmitted {
        request: RequestId,
        kind: RequestKind,
        amount: Decimal,
    },
    RequestApproved {
        request: RequestId,
        kind: RequestKind,
        amount: Decimal,
    },
    RequestRejected {
        request: RequestId,
    },
    TransferSent {
        to: AccountId,
        amount: Decimal,
    },
    TransferReceived {
        from: AccountId,
        amount: Decimal,
    },
    BalanceAdjusted {
        balance: Decimal,
    },
    AccountLocked,
    AccountUnlocked,
}

impl LedgerEvent {
    /// Short machine-friendly name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::AccountRegistered => "account_registered",
            LedgerEvent::RequestSubmitted { .. } => "request_submitted",
            LedgerEvent::RequestApproved { .. } => "request_approved",
            LedgerEvent::RequestRejected { .. } => "request_rejected",
            LedgerEvent::TransferSent { .. } => "transfer_sent",
            LedgerEvent::TransferReceived { .. } => "transfer_received",
            LedgerEvent::BalanceAdjusted { .. } => "balance_adjusted",
            LedgerEvent::AccountLocked => "account_locked",
            LedgerEvent::AccountUnlocked => "account_unlocked",
        }
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEvent::AccountRegistered => write!(f, "account registered"),
            LedgerEvent::RequestSubmitted {
                request,
                kind,
                amount,
            } => write!(f, "{kind} request {request} for {amount:.2} submitted"),
            LedgerEvent::RequestApproved {
                request,
                kind,
                amount,
            } => write!(f, "{kind} request {request} for {amount:.2} approved"),
            LedgerEvent::RequestRejected { request } => write!(f, "request {request} rejected"),
            LedgerEvent::TransferSent { to, amount } => {
                write!(f, "transferred {amount:.2} to account {to}")
            }
            LedgerEvent::TransferReceived { from, amount } => {
                write!(f, "received {amount:.2} from account {from}")
            }
            LedgerEvent::BalanceAdjusted { balance } => {
                write!(f, "balance set to {balance:.2}")
            }
            LedgerEvent::AccountLocked => write!(f, "account locked"),
            LedgerEvent::AccountUnlocked => write!(f, "account unlocked"),
        }
    }
}
