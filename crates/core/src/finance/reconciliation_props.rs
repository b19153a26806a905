//! Property-based tests for balance reconciliation rules.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tsnt_shared::types::Amount;

use super::reconciliation::{BalanceEffect, creation_effect, removal_effect, transition_effect};
use super::types::{TransactionStatus, TransactionType};

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Amount> {
    (1i64..1_000_000i64).prop_map(|cents| Amount::new(Decimal::new(cents, 2)).unwrap())
}

/// Strategy to generate non-negative balances (0.00 to 100,000.00).
fn balance() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn kind_strategy() -> impl Strategy<Value = TransactionType> {
    prop_oneof![Just(TransactionType::Income), Just(TransactionType::Expense)]
}

fn status_strategy() -> impl Strategy<Value = TransactionStatus> {
    prop_oneof![
        Just(TransactionStatus::Pending),
        Just(TransactionStatus::Completed),
        Just(TransactionStatus::Rejected),
    ]
}

fn effect_strategy() -> impl Strategy<Value = BalanceEffect> {
    (any::<bool>(), positive_amount()).prop_map(|(up, amount)| {
        if up {
            BalanceEffect::Increase(amount)
        } else {
            BalanceEffect::Decrease(amount)
        }
    })
}

/// Folds effects the way storage does: a rejected effect leaves the balance as is.
fn run(start: Decimal, effects: &[BalanceEffect]) -> Decimal {
    effects
        .iter()
        .fold(start, |bal, effect| effect.apply_to(bal).unwrap_or(bal))
}

/// Signed change of an optional effect.
fn signed(effect: Option<BalanceEffect>) -> Decimal {
    match effect {
        Some(BalanceEffect::Increase(a)) => a.value(),
        Some(BalanceEffect::Decrease(a)) => -a.value(),
        None => Decimal::ZERO,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The balance stays non-negative after every step of any effect sequence.
    #[test]
    fn prop_balance_never_negative(
        start in balance(),
        effects in prop::collection::vec(effect_strategy(), 0..50),
    ) {
        let mut bal = start;
        for effect in &effects {
            match effect.apply_to(bal) {
                Some(next) => {
                    prop_assert!(next >= Decimal::ZERO);
                    bal = next;
                }
                None => {
                    prop_assert!(matches!(effect, BalanceEffect::Decrease(a) if a.value() > bal));
                }
            }
        }
        prop_assert!(bal >= Decimal::ZERO);
    }

    /// Applying then reverting an entry restores the balance exactly.
    #[test]
    fn prop_apply_revert_symmetry(
        start in balance(),
        kind in kind_strategy(),
        amount in positive_amount(),
    ) {
        let applied = BalanceEffect::apply(kind, amount);
        if let Some(after) = applied.apply_to(start) {
            let restored = BalanceEffect::revert(kind, amount).apply_to(after);
            prop_assert_eq!(restored, Some(start));
        } else {
            prop_assert_eq!(kind, TransactionType::Expense);
        }
    }

    /// Completed income and expense sum to the same balance in any order,
    /// as long as no step is refused.
    #[test]
    fn prop_interleaving_independent(
        incomes in prop::collection::vec(positive_amount(), 0..20),
        expenses in prop::collection::vec(positive_amount(), 0..20),
    ) {
        let income_sum: Decimal = incomes.iter().map(|a| a.value()).sum();
        let expense_sum: Decimal = expenses.iter().map(|a| a.value()).sum();
        prop_assume!(income_sum >= expense_sum);

        let mut effects: Vec<BalanceEffect> = incomes
            .iter()
            .map(|a| BalanceEffect::apply(TransactionType::Income, *a))
            .collect();
        effects.extend(expenses.iter().map(|a| BalanceEffect::apply(TransactionType::Expense, *a)));

        let incomes_first = run(Decimal::ZERO, &effects);
        prop_assert_eq!(incomes_first, income_sum - expense_sum);

        // Same entries, reversed order, from an opening balance large enough
        // that no expense is refused.
        let mut reversed = effects.clone();
        reversed.reverse();
        prop_assert_eq!(run(expense_sum, &reversed) - expense_sum, income_sum - expense_sum);
    }

    /// Any walk through statuses nets out to exactly one apply when it ends
    /// in `Completed`, and to nothing otherwise.
    #[test]
    fn prop_transitions_pair_apply_and_revert(
        kind in kind_strategy(),
        amount in positive_amount(),
        first in status_strategy(),
        walk in prop::collection::vec(status_strategy(), 0..20),
    ) {
        let mut net = signed(creation_effect(kind, amount, first));
        let mut current = first;
        for next in walk {
            net += signed(transition_effect(kind, amount, current, next));
            current = next;
        }

        let single = signed(Some(BalanceEffect::apply(kind, amount)));
        if current.is_completed() {
            prop_assert_eq!(net, single);
        } else {
            prop_assert_eq!(net, Decimal::ZERO);
        }

        net += signed(removal_effect(kind, amount, current));
        prop_assert_eq!(net, Decimal::ZERO);
    }
}
