//! Immediate peer-to-peer transfers
//!
//! A transfer debits the sender, credits the recipient and appends one entry
//! per side. Both accounts are held locked (in ascending id order) for the
//! whole operation, and every check runs before the first entry is posted, so
//! a transfer either fully applies or leaves no trace.

use crate::config::AmountPolicy;
use crate::core::traits::LedgerStore;
use crate::types::{AccountId, EntryKind, LedgerEntry, LedgerError};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// The two linked entries written by a successful transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    /// `TransferOut` entry on the sender (negative)
    pub debit: LedgerEntry,

    /// `TransferIn` entry on the recipient (positive)
    pub credit: LedgerEntry,
}

#[derive(Debug)]
pub struct TransferEngine<S> {
    store: Arc<S>,
    amounts: AmountPolicy,
}

impl<S: LedgerStore> TransferEngine<S> {
    pub fn new(store: Arc<S>, amounts: AmountPolicy) -> Self {
        Self { store, amounts }
    }

    /// Move `amount` from `sender` to `recipient`
    ///
    /// # Returns
    ///
    /// * `Ok(TransferReceipt)` - Both entries, as posted
    /// * `Err(LedgerError::InvalidAmount)` - `amount` is not positive or too precise
    /// * `Err(LedgerError::SelfTransfer)` - Sender and recipient are the same account
    /// * `Err(LedgerError::AccountNotFound)` - Either side is missing
    /// * `Err(LedgerError::AccountLocked)` - Either side is locked
    /// * `Err(LedgerError::InsufficientFunds)` - Sender balance is below `amount`
    /// * `Err(LedgerError::ArithmeticOverflow)` - Recipient balance would overflow
    pub fn transfer(
        &self,
        sender: AccountId,
        recipient: AccountId,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        let amount = self.amounts.positive(amount)?;
        if sender == recipient {
            return Err(LedgerError::self_transfer(sender));
        }

        let receipt = self.store.update_pair(sender, recipient, |from, to| {
            from.ensure_unlocked()?;
            to.ensure_unlocked()?;
            from.ensure_covers(amount)?;
            from.balance_after(EntryKind::TransferOut, -amount)?;
            to.balance_after(EntryKind::TransferIn, amount)?;

            // Nothing below can fail: both postings were checked above.
            let now = Utc::now();
            let debit = from
                .post(
                    self.store.next_entry_id(),
                    EntryKind::TransferOut,
                    -amount,
                    Some(recipient),
                    now,
                )?
                .clone();
            let credit = to
                .post(
                    self.store.next_entry_id(),
                    EntryKind::TransferIn,
                    amount,
                    Some(sender),
                    now,
                )?
                .clone();
            Ok(TransferReceipt { debit, credit })
        })?;

        info!(sender, recipient, amount = %amount, "transfer completed");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::account_manager::AccountManager;
    use crate::core::store::InMemoryLedgerStore;
    use rstest::rstest;
    use std::thread;

    struct Fixture {
        accounts: AccountManager<InMemoryLedgerStore>,
        engine: TransferEngine<InMemoryLedgerStore>,
    }

    /// Accounts 1 and 2, with 1 holding 100
    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryLedgerStore::new());
        let accounts = AccountManager::new(Arc::clone(&store), AmountPolicy::default());
        let engine = TransferEngine::new(store, AmountPolicy::default());
        accounts.register(1, "alice").unwrap();
        accounts.register(2, "bob").unwrap();
        accounts.set_balance(1, Decimal::new(100, 0)).unwrap();
        Fixture { accounts, engine }
    }

    #[test]
    fn test_transfer_moves_funds_and_links_entries() {
        let f = fixture();

        let receipt = f.engine.transfer(1, 2, Decimal::new(30, 0)).unwrap();

        assert_eq!(f.accounts.account(1).unwrap().balance, Decimal::new(70, 0));
        assert_eq!(f.accounts.account(2).unwrap().balance, Decimal::new(30, 0));
        assert_eq!(receipt.debit.kind, EntryKind::TransferOut);
        assert_eq!(receipt.debit.amount, Decimal::new(-30, 0));
        assert_eq!(receipt.debit.reference, Some(2));
        assert_eq!(receipt.credit.kind, EntryKind::TransferIn);
        assert_eq!(receipt.credit.amount, Decimal::new(30, 0));
        assert_eq!(receipt.credit.reference, Some(1));
        assert!(receipt.credit.id > receipt.debit.id);
    }

    #[test]
    fn test_transfer_of_entire_balance() {
        let f = fixture();

        f.engine.transfer(1, 2, Decimal::new(100, 0)).unwrap();

        assert_eq!(f.accounts.account(1).unwrap().balance, Decimal::ZERO);
    }

    #[rstest]
    #[case::zero(1, 2, Decimal::ZERO, "invalid_amount")]
    #[case::negative(1, 2, Decimal::new(-5, 0), "invalid_amount")]
    #[case::self_transfer(1, 1, Decimal::new(5, 0), "self_transfer")]
    #[case::missing_recipient(1, 9, Decimal::new(5, 0), "not_found")]
    #[case::missing_sender(9, 1, Decimal::new(5, 0), "not_found")]
    #[case::insufficient(1, 2, Decimal::new(10001, 2), "insufficient_funds")]
    #[case::reverse_insufficient(2, 1, Decimal::new(1, 0), "insufficient_funds")]
    fn test_transfer_failures_leave_no_trace(
        #[case] sender: AccountId,
        #[case] recipient: AccountId,
        #[case] amount: Decimal,
        #[case] kind: &str,
    ) {
        let f = fixture();

        let error = f.engine.transfer(sender, recipient, amount).unwrap_err();

        assert_eq!(error.kind(), kind);
        assert_eq!(f.accounts.account(1).unwrap().balance, Decimal::new(100, 0));
        assert_eq!(f.accounts.account(2).unwrap().balance, Decimal::ZERO);
        assert_eq!(f.accounts.transactions(1).unwrap().len(), 1);
        assert!(f.accounts.transactions(2).unwrap().is_empty());
    }

    #[rstest]
    #[case::sender_locked(1)]
    #[case::recipient_locked(2)]
    fn test_transfer_with_locked_party(#[case] locked: AccountId) {
        let f = fixture();
        f.accounts.set_locked(locked, true).unwrap();

        assert_eq!(
            f.engine.transfer(1, 2, Decimal::new(10, 0)),
            Err(LedgerError::account_locked(locked))
        );
        assert_eq!(f.accounts.account(1).unwrap().balance, Decimal::new(100, 0));
    }

    #[test]
    fn test_transfer_refused_when_credit_would_round() {
        let f = fixture();
        f.accounts.set_balance(2, Decimal::MAX).unwrap();

        let result = f.engine.transfer(1, 2, Decimal::new(1, 2));

        assert_eq!(
            result,
            Err(LedgerError::arithmetic_overflow("transfer_in", 2))
        );
        assert_eq!(f.accounts.account(1).unwrap().balance, Decimal::new(100, 0));
        assert_eq!(f.accounts.transactions(1).unwrap().len(), 1);
        assert_eq!(f.accounts.account(2).unwrap().balance, Decimal::MAX);
    }

    #[test]
    fn test_concurrent_transfers_conserve_funds() {
        let f = fixture();
        f.accounts.set_balance(2, Decimal::new(100, 0)).unwrap();

        thread::scope(|scope| {
            for worker in 0..8u64 {
                let engine = &f.engine;
                scope.spawn(move || {
                    let (from, to) = if worker % 2 == 0 { (1, 2) } else { (2, 1) };
                    for _ in 0..100 {
                        // Failures on an empty sender are expected and must be clean.
                        let _ = engine.transfer(from, to, Decimal::new(3, 0));
                    }
                });
            }
        });

        let one = f.accounts.account(1).unwrap().balance;
        let two = f.accounts.account(2).unwrap().balance;
        assert_eq!(one + two, Decimal::new(200, 0));
        assert!(one >= Decimal::ZERO && two >= Decimal::ZERO);

        for id in [1, 2] {
            let sum: Decimal = f.accounts.transactions(id).unwrap().iter().map(|e| e.amount).sum();
            assert_eq!(sum, f.accounts.account(id).unwrap().balance);
        }
    }
}
