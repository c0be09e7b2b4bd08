//! Core traits for ledger storage and the external collaborators
//!
//! The ledger store is injected into every component as an `Arc<S>` where
//! `S: LedgerStore`; the notification hook and the permission oracle are
//! consumed as trait objects.

use crate::notify::NotifyError;
use crate::types::{
    Account, AccountBook, AccountId, EntryId, LedgerEntry, LedgerError, LedgerEvent,
    PendingRequest, RequestId, RequestKind,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Shared, durable ledger state
///
/// Implementations must make every closure-taking method atomic with respect
/// to the keys it touches: while the closure runs no other caller can observe
/// or mutate the same account (or request), and an error returned by the
/// closure must leave that record unchanged. Closures passed to the account
/// methods therefore validate before they post.
///
/// Lock order is request before account, and accounts in ascending id order.
pub trait LedgerStore: Send + Sync {
    /// Insert a new account, failing with `AlreadyExists` if the id is taken
    fn create_account(&self, account: Account) -> Result<Account, LedgerError>;

    /// Snapshot of one account
    fn account(&self, id: AccountId) -> Option<Account>;

    /// Snapshot of all accounts, ordered by id
    fn accounts(&self) -> Vec<Account>;

    /// Ledger entries of one account, oldest first
    fn history(&self, id: AccountId) -> Option<Vec<LedgerEntry>>;

    /// Every ledger entry in the store, ordered by entry id
    fn entries(&self) -> Vec<LedgerEntry>;

    /// Allocate the next ledger-wide entry id
    fn next_entry_id(&self) -> EntryId;

    /// Run `f` with exclusive access to one account
    fn update_account<T, F>(&self, id: AccountId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut AccountBook) -> Result<T, LedgerError>;

    /// Run `f` with exclusive access to two distinct accounts
    ///
    /// The books are passed in argument order regardless of lock order.
    fn update_pair<T, F>(&self, first: AccountId, second: AccountId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut AccountBook, &mut AccountBook) -> Result<T, LedgerError>;

    /// Insert a new `Pending` request with a freshly allocated id
    fn create_request(
        &self,
        account_id: AccountId,
        kind: RequestKind,
        amount: Decimal,
        created_at: DateTime<Utc>,
    ) -> PendingRequest;

    /// Snapshot of one request
    fn request(&self, id: RequestId) -> Option<PendingRequest>;

    /// Snapshot of all requests, ordered by id
    fn requests(&self) -> Vec<PendingRequest>;

    /// Run `f` with exclusive access to one request
    ///
    /// Changes made by `f` are only kept if it returns `Ok`.
    fn update_request<T, F>(&self, id: RequestId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut PendingRequest) -> Result<T, LedgerError>;
}

/// Outbound delivery of lifecycle events
///
/// Delivery is best effort. The ledger logs a failed delivery and moves on;
/// it never branches on the result otherwise.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, recipient: AccountId, event: &LedgerEvent) -> Result<(), NotifyError>;
}

/// External authority deciding who may run administrative operations
pub trait PermissionOracle: Send + Sync {
    fn is_administrator(&self, identity: AccountId) -> bool;
}
