//! Error types for the custodial ledger
//!
//! Every ledger operation reports failure through [`LedgerError`]. All variants
//! are terminal: the store is left exactly as it was before the call and the
//! core never retries on its own.
//!
//! # Error Categories
//!
//! - **Lookup Errors**: unknown account or request
//! - **Validation Errors**: non-positive or over-precise amounts, self transfers
//! - **State Errors**: insufficient funds, locked accounts, requests already resolved
//! - **Authorization Errors**: caller is not an administrator
//! - **Replay I/O Errors**: file and CSV problems met by the replay tool

use super::account::AccountId;
use super::request::{RequestId, RequestStatus};
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// An account is already registered for this identity
    #[error("Account {account} already exists")]
    AlreadyExists {
        /// Identity that was registered twice
        account: AccountId,
    },

    /// No account is registered for this identity
    #[error("Account {account} not found")]
    AccountNotFound {
        /// Identity that was looked up
        account: AccountId,
    },

    /// No request with this id exists
    #[error("Request {request} not found")]
    RequestNotFound {
        /// Request id that was looked up
        request: RequestId,
    },

    /// Amount is out of the accepted range or has too many fractional digits
    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
        /// Which rule it broke
        reason: String,
    },

    /// Balance does not cover the requested debit
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        balance: Decimal,
        requested: Decimal,
    },

    /// Request has already been approved or rejected
    #[error("Request {request} is not pending (status: {status})")]
    NotPending {
        request: RequestId,
        /// Status the request was found in
        status: RequestStatus,
    },

    /// Caller is not allowed to perform an administrative operation
    #[error("Account {actor} is not permitted to {operation}")]
    PermissionDenied {
        actor: AccountId,
        operation: String,
    },

    /// Account is administratively locked
    #[error("Account {account} is locked")]
    AccountLocked { account: AccountId },

    /// Sender and recipient of a transfer are the same account
    #[error("Account {account} cannot transfer to itself")]
    SelfTransfer { account: AccountId },

    /// Balance arithmetic would overflow
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        operation: String,
        account: AccountId,
    },

    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError { message: String },

    /// CSV parsing error occurred
    ///
    /// Recoverable during replay: the malformed row is skipped.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        message: String,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        if error.is_io_error() {
            return LedgerError::IoError {
                message: error.to_string(),
            };
        }
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    pub fn already_exists(account: AccountId) -> Self {
        LedgerError::AlreadyExists { account }
    }

    pub fn account_not_found(account: AccountId) -> Self {
        LedgerError::AccountNotFound { account }
    }

    pub fn request_not_found(request: RequestId) -> Self {
        LedgerError::RequestNotFound { request }
    }

    pub fn invalid_amount(amount: Decimal, reason: &str) -> Self {
        LedgerError::InvalidAmount {
            amount,
            reason: reason.to_string(),
        }
    }

    pub fn insufficient_funds(account: AccountId, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account,
            balance,
            requested,
        }
    }

    pub fn not_pending(request: RequestId, status: RequestStatus) -> Self {
        LedgerError::NotPending { request, status }
    }

    pub fn permission_denied(actor: AccountId, operation: &str) -> Self {
        LedgerError::PermissionDenied {
            actor,
            operation: operation.to_string(),
        }
    }

    pub fn account_locked(account: AccountId) -> Self {
        LedgerError::AccountLocked { account }
    }

    pub fn self_transfer(account: AccountId) -> Self {
        LedgerError::SelfTransfer { account }
    }

    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }

    /// Short name of the error kind, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::AlreadyExists { .. } => "already_exists",
            LedgerError::AccountNotFound { .. } | LedgerError::RequestNotFound { .. } => {
                "not_found"
            }
            LedgerError::InvalidAmount { .. } => "invalid_amount",
            LedgerError::InsufficientFunds { .. } => "insufficient_funds",
            LedgerError::NotPending { .. } => "not_pending",
            LedgerError::PermissionDenied { .. } => "permission_denied",
            LedgerError::AccountLocked { .. } => "account_locked",
            LedgerError::SelfTransfer { .. } => "self_transfer",
            LedgerError::ArithmeticOverflow { .. } => "arithmetic_overflow",
            LedgerError::FileNotFound { .. } | LedgerError::IoError { .. } => "io",
            LedgerError::ParseError { .. } => "parse",
        }
    }
}
