//! Ledger configuration
//!
//! `LedgerConfig` carries the knobs the surrounding process decides on: who the
//! administrators are and how precise amounts may be. The binary builds it from
//! CLI arguments (see [`crate::cli::CliArgs::to_ledger_config`]).

use crate::types::{AccountId, LedgerError};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Default number of fractional digits accepted in an amount
pub const DEFAULT_AMOUNT_SCALE: u32 = 2;

/// Largest scale `rust_decimal` can represent
const MAX_AMOUNT_SCALE: u32 = 28;

/// Process-level ledger configuration
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LedgerConfig {
    /// Identities allowed to run administrative operations
    pub administrators: BTreeSet<AccountId>,

    /// Validation rules applied to every amount entering the ledger
    pub amounts: AmountPolicy,
}

impl LedgerConfig {
    /// Create a configuration with the given administrators and amount scale
    ///
    /// A scale beyond what `Decimal` can hold falls back to the default, with a
    /// warning.
    pub fn new(administrators: impl IntoIterator<Item = AccountId>, amount_scale: u32) -> Self {
        let amount_scale = if amount_scale > MAX_AMOUNT_SCALE {
            tracing::warn!(
                amount_scale,
                default = DEFAULT_AMOUNT_SCALE,
                "invalid amount scale, using default"
            );
            DEFAULT_AMOUNT_SCALE
        } else {
            amount_scale
        };

        Self {
            administrators: administrators.into_iter().collect(),
            amounts: AmountPolicy::new(amount_scale),
        }
    }
}

/// Amount validation rules
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmountPolicy {
    /// Maximum number of fractional digits
    pub scale: u32,
}

impl Default for AmountPolicy {
    fn default() -> Self {
        Self {
            scale: DEFAULT_AMOUNT_SCALE,
        }
    }
}

impl AmountPolicy {
    pub fn new(scale: u32) -> Self {
        Self { scale }
    }

    /// Accept amounts strictly greater than zero
    ///
    /// Used for requests and transfers.
    pub fn positive(&self, amount: Decimal) -> Result<Decimal, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount, "must be positive"));
        }
        self.precise(amount)
    }

    /// Accept zero or greater
    ///
    /// Used for administrative balance overrides.
    pub fn non_negative(&self, amount: Decimal) -> Result<Decimal, LedgerError> {
        if amount < Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount, "must not be negative"));
        }
        self.precise(amount)
    }

    fn precise(&self, amount: Decimal) -> Result<Decimal, LedgerError> {
        if amount.normalize().scale() > self.scale {
            return Err(LedgerError::invalid_amount(
                amount,
                &format!("more than {} decimal places", self.scale),
            ));
        }
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::whole(Decimal::new(50, 0))]
    #[case::cents(Decimal::new(1999, 2))]
    #[case::trailing_zeros(Decimal::new(105000, 4))]
    fn test_positive_accepts(#[case] amount: Decimal) {
        assert_eq!(AmountPolicy::default().positive(amount), Ok(amount));
    }

    #[rstest]
    #[case::zero(Decimal::ZERO, "must be positive")]
    #[case::negative(Decimal::new(-1, 0), "must be positive")]
    #[case::too_precise(Decimal::new(1001, 3), "more than 2 decimal places")]
    fn test_positive_rejects(#[case] amount: Decimal, #[case] reason: &str) {
        assert_eq!(
            AmountPolicy::default().positive(amount),
            Err(LedgerError::invalid_amount(amount, reason))
        );
    }

    #[test]
    fn test_non_negative_accepts_zero() {
        assert_eq!(
            AmountPolicy::default().non_negative(Decimal::ZERO),
            Ok(Decimal::ZERO)
        );
    }

    #[test]
    fn test_non_negative_rejects_negative() {
        let amount = Decimal::new(-1, 0);
        assert_eq!(
            AmountPolicy::default().non_negative(amount),
            Err(LedgerError::invalid_amount(amount, "must not be negative"))
        );
    }

    #[rstest]
    #[case::custom(4, 4)]
    #[case::out_of_range(40, DEFAULT_AMOUNT_SCALE)]
    fn test_config_scale(#[case] requested: u32, #[case] expected: u32) {
        let config = LedgerConfig::new([1, 2], requested);

        assert_eq!(config.amounts.scale, expected);
        assert!(config.administrators.contains(&2));
    }
}
