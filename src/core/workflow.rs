//! Deposit and withdrawal request workflow
//!
//! Users file requests; administrators resolve them. The state machine is:
//!
//! ```text
//!            approve            reject
//! Approved <--------- Pending ---------> Rejected
//! ```
//!
//! `Pending` is left exactly once. Resolution runs while the request is
//! locked, so of two concurrent resolutions of the same request only the first
//! applies and the second sees `NotPending`. Approval locks the owning account
//! after the request (request before account, never the reverse).
//!
//! A withdrawal the account cannot cover fails with `InsufficientFunds` and
//! the request stays `Pending`, so it can be approved once funds arrive or be
//! rejected.

use crate::config::AmountPolicy;
use crate::core::traits::LedgerStore;
use crate::types::{
    AccountId, EntryKind, LedgerError, PendingRequest, RequestId, RequestKind, RequestStatus,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct RequestWorkflow<S> {
    store: Arc<S>,
    amounts: AmountPolicy,
}

impl<S: LedgerStore> RequestWorkflow<S> {
    pub fn new(store: Arc<S>, amounts: AmountPolicy) -> Self {
        Self { store, amounts }
    }

    /// File a new request for `account`
    ///
    /// # Returns
    ///
    /// * `Ok(PendingRequest)` - The stored request, status `Pending`
    /// * `Err(LedgerError::InvalidAmount)` - `amount` is not positive or too precise
    /// * `Err(LedgerError::AccountNotFound)` - No such account
    /// * `Err(LedgerError::AccountLocked)` - The account is locked
    pub fn submit(
        &self,
        account: AccountId,
        kind: RequestKind,
        amount: Decimal,
    ) -> Result<PendingRequest, LedgerError> {
        let amount = self.amounts.positive(amount)?;

        // Hold the account while filing so a concurrent lock is not missed.
        let request = self.store.update_account(account, |book| {
            book.ensure_unlocked()?;
            Ok(self
                .store
                .create_request(account, kind, amount, Utc::now()))
        })?;

        info!(
            request = request.id,
            account,
            kind = %kind,
            amount = %amount,
            "request submitted"
        );
        Ok(request)
    }

    /// Approve a pending request and apply it to the owning account
    ///
    /// Branches on the stored request kind. A deposit appends a `Deposit`
    /// entry; a withdrawal appends a negative `Withdrawal` entry. Both
    /// reference the request id.
    ///
    /// # Returns
    ///
    /// * `Ok(PendingRequest)` - The request, now `Approved`
    /// * `Err(LedgerError::RequestNotFound)` - No such request
    /// * `Err(LedgerError::NotPending)` - Already approved or rejected
    /// * `Err(LedgerError::AccountNotFound)` - The owning account is gone
    /// * `Err(LedgerError::AccountLocked)` - The owning account is locked
    /// * `Err(LedgerError::InsufficientFunds)` - Withdrawal exceeds the balance
    pub fn approve(&self, id: RequestId) -> Result<PendingRequest, LedgerError> {
        let approved = self.store.update_request(id, |request| {
            if !request.is_pending() {
                return Err(LedgerError::not_pending(id, request.status));
            }

            let (kind, amount) = match request.kind {
                RequestKind::Deposit => (EntryKind::Deposit, request.amount),
                RequestKind::Withdrawal => (EntryKind::Withdrawal, -request.amount),
            };
            let now = Utc::now();

            self.store.update_account(request.account_id, |book| {
                book.ensure_unlocked()?;
                if request.kind == RequestKind::Withdrawal {
                    book.ensure_covers(request.amount)?;
                }
                book.post(self.store.next_entry_id(), kind, amount, Some(id), now)?;
                Ok(())
            })?;

            request.status = RequestStatus::Approved;
            request.resolved_at = Some(now);
            Ok(request.clone())
        })?;

        info!(
            request = id,
            account = approved.account_id,
            kind = %approved.kind,
            amount = %approved.amount,
            "request approved"
        );
        Ok(approved)
    }

    /// Reject a pending request. No balance changes.
    ///
    /// # Returns
    ///
    /// * `Ok(PendingRequest)` - The request, now `Rejected`
    /// * `Err(LedgerError::RequestNotFound)` - No such request
    /// * `Err(LedgerError::NotPending)` - Already approved or rejected
    pub fn reject(&self, id: RequestId) -> Result<PendingRequest, LedgerError> {
        let rejected = self.store.update_request(id, |request| {
            if !request.is_pending() {
                return Err(LedgerError::not_pending(id, request.status));
            }
            request.status = RequestStatus::Rejected;
            request.resolved_at = Some(Utc::now());
            Ok(request.clone())
        })?;

        info!(request = id, account = rejected.account_id, "request rejected");
        Ok(rejected)
    }

    /// Requests still awaiting resolution, oldest first
    pub fn pending(&self) -> Vec<PendingRequest> {
        let mut pending: Vec<PendingRequest> = self
            .store
            .requests()
            .into_iter()
            .filter(PendingRequest::is_pending)
            .collect();
        pending.sort_by_key(|request| (request.created_at, request.id));
        pending
    }

    pub fn request(&self, id: RequestId) -> Result<PendingRequest, LedgerError> {
        self.store
            .request(id)
            .ok_or_else(|| LedgerError::request_not_found(id))
    }
}
