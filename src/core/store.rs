//! Thread-safe in-memory ledger store
//!
//! This module provides `InMemoryLedgerStore`, the `LedgerStore` used by the
//! ledger and the replay tool.
//!
//! # Design
//!
//! Accounts and requests live in `DashMap`s keyed by id. Each value is an
//! `Arc<Mutex<_>>`: lookups clone the handle out of the map and release the
//! shard lock before locking the record itself. This keeps the shard lock from
//! being held while a second record (possibly in the same shard) is locked,
//! which is what transfers and approvals need.
//!
//! # Thread Safety
//!
//! - Operations on different accounts or requests proceed in parallel
//! - Operations on the same account or request are serialized by its mutex
//! - Two-account updates lock in ascending id order, so they cannot deadlock
//! - Entry and request ids come from atomic counters

use crate::core::traits::LedgerStore;
use crate::types::{
    Account, AccountBook, AccountId, EntryId, LedgerEntry, LedgerError, PendingRequest,
    RequestId, RequestKind, RequestStatus,
};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

type Shared<T> = Arc<Mutex<T>>;

/// Concurrent in-memory ledger store
#[derive(Debug)]
pub struct InMemoryLedgerStore {
    /// Account books by account id
    accounts: DashMap<AccountId, Shared<AccountBook>>,

    /// Every request ever filed, resolved ones included
    requests: DashMap<RequestId, Shared<PendingRequest>>,

    /// Next ledger entry id
    next_entry: AtomicU64,

    /// Next request id
    next_request: AtomicU64,
}

impl InMemoryLedgerStore {
    /// Create an empty store. Entry and request ids start at 1.
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            requests: DashMap::new(),
            next_entry: AtomicU64::new(1),
            next_request: AtomicU64::new(1),
        }
    }

    fn book(&self, id: AccountId) -> Result<Shared<AccountBook>, LedgerError> {
        self.accounts
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    /// Read every account book at a single point in time
    ///
    /// All books are locked together, in ascending id order like
    /// `update_pair`, so no transfer can commit halfway through the read.
    /// Output follows account id order.
    fn snapshot<T, F>(&self, read: F) -> Vec<T>
    where
        F: Fn(&AccountBook) -> Vec<T>,
    {
        let mut handles: Vec<(AccountId, Shared<AccountBook>)> = self
            .accounts
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        handles.sort_by_key(|(id, _)| *id);

        let guards: Vec<_> = handles.iter().map(|(_, book)| book.lock()).collect();
        guards.iter().flat_map(|book| read(book)).collect()
    }

    fn request_handle(&self, id: RequestId) -> Result<Shared<PendingRequest>, LedgerError> {
        self.requests
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| LedgerError::request_not_found(id))
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn create_account(&self, account: Account) -> Result<Account, LedgerError> {
        match self.accounts.entry(account.id) {
            Entry::Occupied(_) => Err(LedgerError::already_exists(account.id)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(AccountBook::new(account.clone()))));
                Ok(account)
            }
        }
    }

    fn account(&self, id: AccountId) -> Option<Account> {
        let book = self.book(id).ok()?;
        let account = book.lock().account().clone();
        Some(account)
    }

    fn accounts(&self) -> Vec<Account> {
        self.snapshot(|book| vec![book.account().clone()])
    }

    fn history(&self, id: AccountId) -> Option<Vec<LedgerEntry>> {
        let book = self.book(id).ok()?;
        let history = book.lock().history().to_vec();
        Some(history)
    }

    fn entries(&self) -> Vec<LedgerEntry> {
        let mut entries = self.snapshot(|book| book.history().to_vec());
        entries.sort_by_key(|entry| entry.id);
        entries
    }

    fn next_entry_id(&self) -> EntryId {
        self.next_entry.fetch_add(1, Ordering::SeqCst)
    }

    fn update_account<T, F>(&self, id: AccountId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut AccountBook) -> Result<T, LedgerError>,
    {
        let book = self.book(id)?;
        let mut guard = book.lock();
        f(&mut *guard)
    }

    fn update_pair<T, F>(&self, first: AccountId, second: AccountId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut AccountBook, &mut AccountBook) -> Result<T, LedgerError>,
    {
        // The same mutex cannot be taken twice.
        if first == second {
            return Err(LedgerError::self_transfer(first));
        }

        let first_book = self.book(first)?;
        let second_book = self.book(second)?;

        if first < second {
            let mut a = first_book.lock();
            let mut b = second_book.lock();
            f(&mut *a, &mut *b)
        } else {
            let mut b = second_book.lock();
            let mut a = first_book.lock();
            f(&mut *a, &mut *b)
        }
    }

    fn create_request(
        &self,
        account_id: AccountId,
        kind: RequestKind,
        amount: Decimal,
        created_at: DateTime<Utc>,
    ) -> PendingRequest {
        let request = PendingRequest {
            id: self.next_request.fetch_add(1, Ordering::SeqCst),
            account_id,
            kind,
            amount,
            status: RequestStatus::Pending,
            created_at,
            resolved_at: None,
        };
        debug!(request = request.id, account = account_id, "request stored");
        self.requests
            .insert(request.id, Arc::new(Mutex::new(request.clone())));
        request
    }

    fn request(&self, id: RequestId) -> Option<PendingRequest> {
        let request = self.request_handle(id).ok()?;
        let snapshot = request.lock().clone();
        Some(snapshot)
    }

    fn requests(&self) -> Vec<PendingRequest> {
        let handles: Vec<_> = self
            .requests
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut requests: Vec<PendingRequest> =
            handles.iter().map(|request| request.lock().clone()).collect();
        requests.sort_by_key(|request| request.id);
        requests
    }

    fn update_request<T, F>(&self, id: RequestId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut PendingRequest) -> Result<T, LedgerError>,
    {
        let request = self.request_handle(id)?;
        let mut guard = request.lock();

        // Work on a draft so a failing closure leaves the request untouched.
        let mut draft = guard.clone();
        let output = f(&mut draft)?;
        *guard = draft;
        Ok(output)
    }
}
