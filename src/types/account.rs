//! Account-related types for the custodial ledger
//!
//! This module defines the Account structure and the `AccountBook`, the unit of
//! state the ledger store keeps per identity: the account plus its own slice of
//! the append-only transaction log.

use super::entry::{EntryId, EntryKind, LedgerEntry};
use super::error::LedgerError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Account identifier
///
/// The stable user id handed to us by the external identity system.
pub type AccountId = u64;

/// Customer account state
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// External identity this account belongs to (one account per identity)
    pub id: AccountId,

    /// Advisory label, never used for identity
    pub display_name: String,

    /// Current balance
    ///
    /// Materialized sum of every ledger entry posted to this account.
    /// Never negative.
    pub balance: Decimal,

    /// Whether the account has been administratively locked
    ///
    /// A locked account keeps its balance but cannot send or receive transfers
    /// nor submit or have approved any deposit/withdrawal request.
    pub locked: bool,

    /// Registration time, immutable
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with zero balance and unlocked status
    pub fn new(id: AccountId, display_name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Account {
            id,
            display_name: display_name.into(),
            balance: Decimal::ZERO,
            locked: false,
            created_at,
        }
    }
}

/// An account together with its ledger history
///
/// The balance is only ever changed through [`AccountBook::post`], which appends
/// the matching entry in the same step, so the cached balance cannot drift from
/// the sum of the history.
#[derive(Debug, Clone)]
pub struct AccountBook {
    account: Account,
    history: Vec<LedgerEntry>,
}

impl AccountBook {
    pub fn new(account: Account) -> Self {
        Self {
            account,
            history: Vec::new(),
        }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn history(&self) -> &[LedgerEntry] {
        &self.history
    }

    pub fn balance(&self) -> Decimal {
        self.account.balance
    }

    pub fn is_locked(&self) -> bool {
        self.account.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.account.locked = locked;
    }

    /// Fail with `AccountLocked` if the account is locked
    pub fn ensure_unlocked(&self) -> Result<(), LedgerError> {
        if self.account.locked {
            return Err(LedgerError::account_locked(self.account.id));
        }
        Ok(())
    }

    /// Fail with `InsufficientFunds` if the balance cannot cover `amount`
    pub fn ensure_covers(&self, amount: Decimal) -> Result<(), LedgerError> {
        if self.account.balance < amount {
            return Err(LedgerError::insufficient_funds(
                self.account.id,
                self.account.balance,
                amount,
            ));
        }
        Ok(())
    }

    /// Balance that posting `amount` would leave, without changing anything
    ///
    /// # Returns
    ///
    /// * `Ok(Decimal)` - The exact new balance
    /// * `Err(LedgerError::InsufficientFunds)` - The balance would go negative
    /// * `Err(LedgerError::ArithmeticOverflow)` - The sum overflows, or `Decimal`
    ///   could only hold it by rounding
    pub fn balance_after(&self, kind: EntryKind, amount: Decimal) -> Result<Decimal, LedgerError> {
        let balance = self
            .account
            .balance
            .checked_add(amount)
            .filter(|balance| balance.checked_sub(self.account.balance) == Some(amount))
            .ok_or_else(|| LedgerError::arithmetic_overflow(kind.as_str(), self.account.id))?;

        if balance < Decimal::ZERO {
            return Err(LedgerError::insufficient_funds(
                self.account.id,
                self.account.balance,
                -amount,
            ));
        }
        Ok(balance)
    }

    /// Apply a signed amount to the balance and append the matching entry
    ///
    /// Fails without side effects whenever [`Self::balance_after`] does.
    ///
    /// # Arguments
    ///
    /// * `id` - Ledger-wide entry id, allocated by the store
    /// * `kind` - Entry kind
    /// * `amount` - Signed amount (negative for outflows)
    /// * `reference` - Request id or counterparty account, if any
    /// * `timestamp` - Time the entry is recorded
    pub fn post(
        &mut self,
        id: EntryId,
        kind: EntryKind,
        amount: Decimal,
        reference: Option<u64>,
        timestamp: DateTime<Utc>,
    ) -> Result<&LedgerEntry, LedgerError> {
        let balance = self.balance_after(kind, amount)?;

        self.account.balance = balance;
        self.history.push(LedgerEntry {
            id,
            account_id: self.account.id,
            kind,
            amount,
            reference,
            timestamp,
        });
        Ok(&self.history[self.history.len() - 1])
    }
}
