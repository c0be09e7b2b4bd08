//! Pending request types
//!
//! Deposits and withdrawals are not applied directly: the user files a
//! `PendingRequest` which an administrator later approves or rejects.

use super::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Request identifier, monotonically increasing from 1
pub type RequestId = u64;

/// What a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// Credit the account on approval
    Deposit,

    /// Debit the account on approval, provided the balance covers it
    Withdrawal,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Deposit => "deposit",
            RequestKind::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request lifecycle state
///
/// `Pending` is the only non-terminal state. A request leaves it exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deposit or withdrawal awaiting administrative resolution
///
/// Resolved requests are retained for audit; they are never removed from the
/// store.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub account_id: AccountId,
    pub kind: RequestKind,

    /// Strictly positive amount
    pub amount: Decimal,

    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,

    /// Set once, when the request leaves `Pending`
    pub resolved_at: Option<DateTime<Utc>>,
}

impl PendingRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}
