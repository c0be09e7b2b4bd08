//! Types module
//!
//! Contains core data structures used throughout the ledger:
//! - `account`: accounts and their ledger books
//! - `entry`: append-only transaction log records
//! - `request`: pending deposit/withdrawal requests
//! - `event`: lifecycle events handed to the notification hook
//! - `error`: error types for the ledger

pub mod account;
pub mod entry;
pub mod error;
pub mod event;
pub mod request;

pub use account::{Account, AccountBook, AccountId};
pub use entry::{EntryId, EntryKind, LedgerEntry};
pub use error::LedgerError;
pub use event::LedgerEvent;
pub use request::{PendingRequest, RequestId, RequestKind, RequestStatus};
