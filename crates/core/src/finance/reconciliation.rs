//! Balance reconciliation rules.
//!
//! Translates a ledger entry's type and status changes into the balance
//! mutation its fund must receive. Only entries in `Completed` status
//! count, so an effect exists exactly when a change enters or leaves
//! `Completed`. Storage applies the returned effect in the same unit of
//! work as the status write.

use rust_decimal::Decimal;
use serde::Serialize;
use tsnt_shared::types::Amount;

use super::types::{CompletedTotals, TransactionStatus, TransactionType};

/// A single mutation of a fund balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "direction", content = "amount", rename_all = "lowercase")]
pub enum BalanceEffect {
    /// Add to the balance.
    Increase(Amount),
    /// Subtract from the balance; fails if it would go negative.
    Decrease(Amount),
}

impl BalanceEffect {
    /// Effect of counting an entry.
    #[must_use]
    pub fn apply(kind: TransactionType, amount: Amount) -> Self {
        match kind {
            TransactionType::Income => Self::Increase(amount),
            TransactionType::Expense => Self::Decrease(amount),
        }
    }

    /// Effect of no longer counting an entry.
    #[must_use]
    pub fn revert(kind: TransactionType, amount: Amount) -> Self {
        Self::apply(kind, amount).inverse()
    }

    /// The opposite mutation.
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Self::Increase(amount) => Self::Decrease(amount),
            Self::Decrease(amount) => Self::Increase(amount),
        }
    }

    /// Amount moved.
    #[must_use]
    pub fn amount(self) -> Amount {
        match self {
            Self::Increase(amount) | Self::Decrease(amount) => amount,
        }
    }

    /// Applies the effect to `balance`.
    ///
    /// Returns `None` if the result would be negative or overflow; the
    /// caller must then leave the stored balance untouched.
    #[must_use]
    pub fn apply_to(self, balance: Decimal) -> Option<Decimal> {
        let next = match self {
            Self::Increase(amount) => balance.checked_add(amount.value())?,
            Self::Decrease(amount) => balance.checked_sub(amount.value())?,
        };
        (next >= Decimal::ZERO).then_some(next)
    }
}

/// Effect of recording a new entry in `status`.
#[must_use]
pub fn creation_effect(
    kind: TransactionType,
    amount: Amount,
    status: TransactionStatus,
) -> Option<BalanceEffect> {
    status
        .is_completed()
        .then(|| BalanceEffect::apply(kind, amount))
}

/// Effect of moving an entry from `old` to `new`.
///
/// Entering `Completed` applies, leaving it reverts, anything else
/// (including `old == new`) has no effect.
#[must_use]
pub fn transition_effect(
    kind: TransactionType,
    amount: Amount,
    old: TransactionStatus,
    new: TransactionStatus,
) -> Option<BalanceEffect> {
    match (old.is_completed(), new.is_completed()) {
        (false, true) => Some(BalanceEffect::apply(kind, amount)),
        (true, false) => Some(BalanceEffect::revert(kind, amount)),
        _ => None,
    }
}

/// Effect of deleting an entry currently in `status`.
#[must_use]
pub fn removal_effect(
    kind: TransactionType,
    amount: Amount,
    status: TransactionStatus,
) -> Option<BalanceEffect> {
    status
        .is_completed()
        .then(|| BalanceEffect::revert(kind, amount))
}

/// Balance a fund should hold given its opening balance and completed entries.
#[must_use]
pub fn expected_balance(opening_balance: Decimal, totals: CompletedTotals) -> Decimal {
    opening_balance + totals.income - totals.expense
}
