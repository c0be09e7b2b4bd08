//! Custodial Ledger Library
//! # Overview
//!
//! A concurrent, in-memory custodial ledger: user accounts with balances,
//! immediate transfers between accounts, deposits and withdrawals that wait for
//! administrative approval, and an append-only transaction log per account.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, LedgerEntry, PendingRequest, etc.)
//! - [`config`] - Administrator set and amount validation rules
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - The `Ledger` facade, permission checks and events
//!   - [`core::account_manager`] - Registration and administrative overrides
//!   - [`core::transfer`] - Two-account transfers
//!   - [`core::workflow`] - Request approval state machine
//!   - [`core::store`] - Concurrent in-memory storage
//! - [`notify`] / [`permission`] - Outbound event sinks and the administrator oracle
//! - [`io`] - Operations CSV reading and state export
//! - [`replay`] / [`cli`] - The replay tool behind the binary
//!
//! # Invariants
//!
//! - A balance always equals the sum of its account's ledger entries
//! - No balance is ever negative
//! - Transfers conserve the total of all balances
//! - A request is resolved at most once and its effect applies exactly once
//!
//! # Request Lifecycle
//!
//! ```text
//! Pending ──approve──▶ Approved   (balance changes, entry appended)
//!    │
//!    └──────reject───▶ Rejected   (no balance change)
//! ```

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod notify;
pub mod permission;
pub mod replay;
pub mod types;

pub use config::{AmountPolicy, LedgerConfig};
pub use self::core::{InMemoryLedgerStore, Ledger, LedgerStore, NotificationSink, PermissionOracle};
pub use io::write_accounts_csv;
pub use types::{
    Account, AccountId, EntryId, EntryKind, LedgerEntry, LedgerError, LedgerEvent,
    PendingRequest, RequestId, RequestKind, RequestStatus,
};
