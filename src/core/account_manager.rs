//! Account lifecycle and administrative balance operations
//!
//! `AccountManager` owns registration (one account per identity), account
//! reads, administrative balance overrides and the lock flag. Every balance it
//! touches goes through `AccountBook::post`, so overrides show up in the
//! transaction log as `AdminAdjustment` entries.

use crate::config::AmountPolicy;
use crate::core::traits::LedgerStore;
use crate::types::{Account, AccountId, EntryKind, LedgerEntry, LedgerError};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// Result of an administrative balance override
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceOverride {
    /// Account state after the override
    pub account: Account,

    /// Audit entry recording the delta that was applied
    pub entry: LedgerEntry,
}

/// Account registration, reads and administrative writes
#[derive(Debug)]
pub struct AccountManager<S> {
    store: Arc<S>,
    amounts: AmountPolicy,
}

impl<S: LedgerStore> AccountManager<S> {
    pub fn new(store: Arc<S>, amounts: AmountPolicy) -> Self {
        Self { store, amounts }
    }

    /// Register a new account with a zero balance
    ///
    /// # Returns
    ///
    /// * `Ok(Account)` - The new account
    /// * `Err(LedgerError::AlreadyExists)` - The identity already has an account
    pub fn register(&self, id: AccountId, display_name: &str) -> Result<Account, LedgerError> {
        let account = self
            .store
            .create_account(Account::new(id, display_name, Utc::now()))?;
        info!(account = id, name = display_name, "account registered");
        Ok(account)
    }

    pub fn account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.store
            .account(id)
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    /// All accounts, ordered by id
    pub fn accounts(&self) -> Vec<Account> {
        self.store.accounts()
    }

    /// Ledger entries of one account, oldest first
    pub fn transactions(&self, id: AccountId) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.store
            .history(id)
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    /// Overwrite the balance of an account
    ///
    /// The override is logged as an `AdminAdjustment` entry carrying the signed
    /// difference between the new and the old balance, even when that
    /// difference is zero. Works on locked accounts too.
    ///
    /// # Returns
    ///
    /// * `Ok(BalanceOverride)` - New account state and the audit entry
    /// * `Err(LedgerError::InvalidAmount)` - `amount` is negative or too precise
    /// * `Err(LedgerError::AccountNotFound)` - No such account
    /// * `Err(LedgerError::ArithmeticOverflow)` - The new balance cannot be
    ///   reached from the current one without rounding
    pub fn set_balance(&self, id: AccountId, amount: Decimal) -> Result<BalanceOverride, LedgerError> {
        let amount = self.amounts.non_negative(amount)?;

        let result = self.store.update_account(id, |book| {
            let delta = amount
                .checked_sub(book.balance())
                .filter(|delta| book.balance().checked_add(*delta) == Some(amount))
                .ok_or_else(|| LedgerError::arithmetic_overflow("set_balance", id))?;
            let entry = book
                .post(
                    self.store.next_entry_id(),
                    EntryKind::AdminAdjustment,
                    delta,
                    None,
                    Utc::now(),
                )?
                .clone();
            Ok(BalanceOverride {
                account: book.account().clone(),
                entry,
            })
        })?;

        info!(
            account = id,
            balance = %result.account.balance,
            delta = %result.entry.amount,
            "balance overridden"
        );
        Ok(result)
    }

    /// Set the balance back to zero
    pub fn reset_balance(&self, id: AccountId) -> Result<BalanceOverride, LedgerError> {
        self.set_balance(id, Decimal::ZERO)
    }

    /// Lock or unlock an account without touching its balance
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The flag changed
    /// * `Ok(false)` - The account was already in the requested state
    /// * `Err(LedgerError::AccountNotFound)` - No such account
    pub fn set_locked(&self, id: AccountId, locked: bool) -> Result<bool, LedgerError> {
        let changed = self.store.update_account(id, |book| {
            if book.is_locked() == locked {
                return Ok(false);
            }
            book.set_locked(locked);
            Ok(true)
        })?;

        if changed {
            info!(account = id, locked, "account lock changed");
        }
        Ok(changed)
    }
}
