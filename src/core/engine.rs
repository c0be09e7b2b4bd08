//! Ledger orchestration
//!
//! `Ledger` is the surface a command layer talks to. It coordinates the
//! account manager, the transfer engine and the request workflow over one
//! shared store, consults the permission oracle before administrative
//! operations and emits lifecycle events once a change has committed.
//!
//! # Architecture
//!
//! ```text
//! Ledger
//!     ├── AccountManager   (registration, reads, overrides, lock flag)
//!     ├── TransferEngine   (two-account moves)
//!     ├── RequestWorkflow  (deposit/withdrawal approval state machine)
//!     │       └── Arc<S: LedgerStore>  (shared by all three)
//!     ├── Arc<dyn NotificationSink>    (best-effort outbound events)
//!     └── Arc<dyn PermissionOracle>    (administrator check)
//! ```
//!
//! # Thread Safety
//!
//! Every operation takes `&self` and is synchronous and short-lived. Share a
//! `Ledger` across threads or tasks behind an `Arc`.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::{AmountPolicy, LedgerConfig};
use crate::core::account_manager::{AccountManager, BalanceOverride};
use crate::core::store::InMemoryLedgerStore;
use crate::core::traits::{LedgerStore, NotificationSink, PermissionOracle};
use crate::core::transfer::{TransferEngine, TransferReceipt};
use crate::core::workflow::RequestWorkflow;
use crate::permission::StaticAdministrators;
use crate::types::{
    Account, AccountId, LedgerEntry, LedgerError, LedgerEvent, PendingRequest, RequestId,
    RequestKind,
};

/// Inbound operation surface of the custodial ledger
pub struct Ledger<S: LedgerStore = InMemoryLedgerStore> {
    store: Arc<S>,
    accounts: AccountManager<S>,
    transfers: TransferEngine<S>,
    requests: RequestWorkflow<S>,
    notifier: Arc<dyn NotificationSink>,
    permissions: Arc<dyn PermissionOracle>,
}

impl Ledger<InMemoryLedgerStore> {
    /// Build an in-memory ledger whose administrators come from `config`
    pub fn from_config(config: &LedgerConfig, notifier: Arc<dyn NotificationSink>) -> Self {
        Self::new(
            Arc::new(InMemoryLedgerStore::new()),
            config.amounts,
            notifier,
            Arc::new(StaticAdministrators::from_config(config)),
        )
    }
}

impl<S: LedgerStore> Ledger<S> {
    pub fn new(
        store: Arc<S>,
        amounts: AmountPolicy,
        notifier: Arc<dyn NotificationSink>,
        permissions: Arc<dyn PermissionOracle>,
    ) -> Self {
        Self {
            accounts: AccountManager::new(Arc::clone(&store), amounts),
            transfers: TransferEngine::new(Arc::clone(&store), amounts),
            requests: RequestWorkflow::new(Arc::clone(&store), amounts),
            store,
            notifier,
            permissions,
        }
    }

    /// The underlying store, for exports and audits
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Hand an event to the notification hook, logging and dropping failures
    fn emit(&self, recipient: AccountId, event: LedgerEvent) {
        if let Err(error) = self.notifier.notify(recipient, &event) {
            warn!(recipient, event = event.kind(), %error, "notification dropped");
        }
    }

    fn authorize(&self, actor: AccountId, operation: &str) -> Result<(), LedgerError> {
        if self.permissions.is_administrator(actor) {
            return Ok(());
        }
        warn!(actor, operation, "administrative operation denied");
        Err(LedgerError::permission_denied(actor, operation))
    }

    // User operations

    /// Open an account for `identity`
    pub fn register(&self, identity: AccountId, display_name: &str) -> Result<Account, LedgerError> {
        let account = self.accounts.register(identity, display_name)?;
        self.emit(identity, LedgerEvent::AccountRegistered);
        Ok(account)
    }

    pub fn account(&self, identity: AccountId) -> Result<Account, LedgerError> {
        debug!(account = identity, "account lookup");
        self.accounts.account(identity)
    }

    /// Transaction history of `identity`, oldest first
    pub fn list_transactions(&self, identity: AccountId) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.accounts.transactions(identity)
    }

    /// File a deposit or withdrawal request for administrative approval
    pub fn submit_request(
        &self,
        identity: AccountId,
        kind: RequestKind,
        amount: Decimal,
    ) -> Result<PendingRequest, LedgerError> {
        let request = self.requests.submit(identity, kind, amount)?;
        self.emit(
            identity,
            LedgerEvent::RequestSubmitted {
                request: request.id,
                kind,
                amount: request.amount,
            },
        );
        Ok(request)
    }

    /// Move funds from `sender` to `recipient` immediately
    pub fn transfer(
        &self,
        sender: AccountId,
        recipient: AccountId,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        let receipt = self.transfers.transfer(sender, recipient, amount)?;
        self.emit(
            sender,
            LedgerEvent::TransferSent {
                to: recipient,
                amount: receipt.credit.amount,
            },
        );
        self.emit(
            recipient,
            LedgerEvent::TransferReceived {
                from: sender,
                amount: receipt.credit.amount,
            },
        );
        Ok(receipt)
    }

    /// Look up a request
    ///
    /// Administrators may look at any request, users only at their own.
    pub fn request(&self, actor: AccountId, id: RequestId) -> Result<PendingRequest, LedgerError> {
        let request = self.requests.request(id);
        if let Ok(found) = &request {
            if found.account_id == actor {
                return request;
            }
        }
        self.authorize(actor, "view request")?;
        request
    }

    // Administrative operations

    pub fn approve(&self, actor: AccountId, id: RequestId) -> Result<PendingRequest, LedgerError> {
        self.authorize(actor, "approve requests")?;
        let request = self.requests.approve(id)?;
        self.emit(
            request.account_id,
            LedgerEvent::RequestApproved {
                request: request.id,
                kind: request.kind,
                amount: request.amount,
            },
        );
        Ok(request)
    }

    pub fn reject(&self, actor: AccountId, id: RequestId) -> Result<PendingRequest, LedgerError> {
        self.authorize(actor, "reject requests")?;
        let request = self.requests.reject(id)?;
        self.emit(
            request.account_id,
            LedgerEvent::RequestRejected {
                request: request.id,
            },
        );
        Ok(request)
    }

    /// Pending requests, oldest first
    pub fn list_pending(&self, actor: AccountId) -> Result<Vec<PendingRequest>, LedgerError> {
        self.authorize(actor, "list pending requests")?;
        Ok(self.requests.pending())
    }

    pub fn list_accounts(&self, actor: AccountId) -> Result<Vec<Account>, LedgerError> {
        self.authorize(actor, "list accounts")?;
        Ok(self.accounts.accounts())
    }

    pub fn set_balance(
        &self,
        actor: AccountId,
        identity: AccountId,
        amount: Decimal,
    ) -> Result<BalanceOverride, LedgerError> {
        self.authorize(actor, "set balances")?;
        let result = self.accounts.set_balance(identity, amount)?;
        self.emit(
            identity,
            LedgerEvent::BalanceAdjusted {
                balance: result.account.balance,
            },
        );
        Ok(result)
    }

    pub fn reset_balance(
        &self,
        actor: AccountId,
        identity: AccountId,
    ) -> Result<BalanceOverride, LedgerError> {
        self.authorize(actor, "reset balances")?;
        let result = self.accounts.reset_balance(identity)?;
        self.emit(
            identity,
            LedgerEvent::BalanceAdjusted {
                balance: result.account.balance,
            },
        );
        Ok(result)
    }

    pub fn lock_account(&self, actor: AccountId, identity: AccountId) -> Result<Account, LedgerError> {
        self.authorize(actor, "lock accounts")?;
        if self.accounts.set_locked(identity, true)? {
            self.emit(identity, LedgerEvent::AccountLocked);
        }
        self.accounts.account(identity)
    }

    pub fn unlock_account(
        &self,
        actor: AccountId,
        identity: AccountId,
    ) -> Result<Account, LedgerError> {
        self.authorize(actor, "unlock accounts")?;
        if self.accounts.set_locked(identity, false)? {
            self.emit(identity, LedgerEvent::AccountUnlocked);
        }
        self.accounts.account(identity)
    }
}
