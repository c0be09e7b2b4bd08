//! Core business logic module
//!
//! This module contains the ledger components:
//! - `traits` - Store, notification and permission abstractions
//! - `store` - Concurrent in-memory store
//! - `account_manager` - Registration, reads and administrative overrides
//! - `transfer` - Two-account transfers
//! - `workflow` - Deposit/withdrawal request approval
//! - `engine` - The `Ledger` facade tying them together

pub mod account_manager;
pub mod engine;
pub mod store;
pub mod traits;
pub mod transfer;
pub mod workflow;

pub use account_manager::{AccountManager, BalanceOverride};
pub use engine::Ledger;
pub use store::InMemoryLedgerStore;
pub use traits::{LedgerStore, NotificationSink, PermissionOracle};
pub use transfer::{TransferEngine, TransferReceipt};
pub use workflow::RequestWorkflow;
