//! Property-based tests for balance reconciliation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::reconciliation::{fold_balance, variance};
use super::types::MovementType;

/// Strategy to generate a valid movement amount (0.01 to 1,000,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn movement_type() -> impl Strategy<Value = MovementType> {
    prop_oneof![
        Just(MovementType::Inflow),
        Just(MovementType::Outflow),
        Just(MovementType::AdjustmentIn),
        Just(MovementType::AdjustmentOut),
    ]
}

fn ledger() -> impl Strategy<Value = Vec<(MovementType, Decimal)>> {
    prop::collection::vec((movement_type(), amount()), 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The balance equals inflows minus outflows, whatever the order.
    #[test]
    fn prop_balance_is_in_minus_out(items in ledger()) {
        let inflow: Decimal = items
            .iter()
            .filter(|(kind, _)| matches!(kind, MovementType::Inflow | MovementType::AdjustmentIn))
            .map(|(_, amount)| *amount)
            .sum();
        let outflow: Decimal = items
            .iter()
            .filter(|(kind, _)| matches!(kind, MovementType::Outflow | MovementType::AdjustmentOut))
            .map(|(_, amount)| *amount)
            .sum();

        prop_assert_eq!(fold_balance(items.clone()), inflow - outflow);
    }

    /// Reordering the ledger never changes the balance.
    #[test]
    fn prop_balance_order_independent(items in ledger()) {
        let mut reversed = items.clone();
        reversed.reverse();
        prop_assert_eq!(fold_balance(items), fold_balance(reversed));
    }

    /// Appending a movement shifts the balance by exactly its signed amount.
    #[test]
    fn prop_append_shifts_balance(items in ledger(), kind in movement_type(), extra in amount()) {
        let before = fold_balance(items.clone());
        let mut after_items = items;
        after_items.push((kind, extra));
        prop_assert_eq!(fold_balance(after_items), before + kind.signed(extra));
    }

    /// Counting exactly the expected balance yields zero variance.
    #[test]
    fn prop_exact_count_has_no_variance(items in ledger()) {
        let expected = fold_balance(items);
        prop_assert_eq!(variance(expected, expected), Decimal::ZERO);
    }

    /// Variance plus expected balance recovers the counted amount.
    #[test]
    fn prop_variance_recovers_count(items in ledger(), counted in amount()) {
        let expected = fold_balance(items);
        prop_assert_eq!(variance(counted, expected) + expected, counted);
    }
}
