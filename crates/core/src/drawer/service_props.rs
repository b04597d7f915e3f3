//! Property-based tests for the drawer lifecycle.

use caja_shared::types::{BranchId, CompanyId, UserId};
use chrono::{Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::DrawerError;
use super::reconciliation::{DrawerSummary, compute_balance};
use super::service::DrawerService;
use super::types::{
    CloseDrawerInput, DrawerStatus, MovementType, OpenDrawerInput, RecordMovementInput,
};

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn opening_amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn movement_type() -> impl Strategy<Value = MovementType> {
    prop_oneof![
        Just(MovementType::Inflow),
        Just(MovementType::Outflow),
        Just(MovementType::AdjustmentIn),
        Just(MovementType::AdjustmentOut),
    ]
}

fn open_input(opening: Decimal) -> OpenDrawerInput {
    OpenDrawerInput {
        company_id: CompanyId::new(),
        branch_id: BranchId::new(),
        opened_by: UserId::new(),
        opening_amount: opening,
        notes: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The variance stored at close equals counted cash minus the ledger balance,
    /// and the ledger balance equals opening plus signed movements.
    #[test]
    fn prop_close_reconciles(
        opening in opening_amount(),
        recorded in prop::collection::vec((movement_type(), amount()), 0..20),
        counted in opening_amount(),
    ) {
        let now = Utc::now();
        let (session, seed) = DrawerService::open(&open_input(opening), None, now).unwrap();

        let mut movements = vec![seed];
        for (kind, value) in &recorded {
            let input = RecordMovementInput {
                session_id: session.id,
                movement_type: *kind,
                amount: *value,
                category: None,
                description: None,
                payment_id: None,
                effective_at: None,
            };
            movements.push(DrawerService::new_movement(&session, &input, now).unwrap());
        }

        let expected: Decimal = opening
            + recorded.iter().map(|(kind, value)| kind.signed(*value)).sum::<Decimal>();
        prop_assert_eq!(compute_balance(&movements), expected);

        let closed = DrawerService::close(
            session.clone(),
            &movements,
            &CloseDrawerInput {
                session_id: session.id,
                closed_by: UserId::new(),
                closing_amount: counted,
                notes: None,
            },
            now + Duration::minutes(1),
        )
        .unwrap();

        prop_assert_eq!(closed.status, DrawerStatus::Closed);
        prop_assert_eq!(closed.variance, counted - expected);

        let summary = DrawerSummary::summarize(&closed, &movements);
        prop_assert_eq!(summary.computed_balance, expected);
        prop_assert_eq!(summary.variance, Some(counted - expected));
        prop_assert_eq!(summary.movement_count, recorded.len() + 1);
    }

    /// A closed session rejects every further movement.
    #[test]
    fn prop_closed_rejects_movements(kind in movement_type(), value in amount()) {
        let now = Utc::now();
        let (session, seed) = DrawerService::open(&open_input(Decimal::ZERO), None, now).unwrap();
        let closed = DrawerService::close(
            session.clone(),
            &[seed],
            &CloseDrawerInput {
                session_id: session.id,
                closed_by: UserId::new(),
                closing_amount: Decimal::ZERO,
                notes: None,
            },
            now,
        )
        .unwrap();

        let input = RecordMovementInput {
            session_id: closed.id,
            movement_type: kind,
            amount: value,
            category: None,
            description: None,
            payment_id: None,
            effective_at: None,
        };
        let result = DrawerService::new_movement(&closed, &input, now);
        prop_assert!(matches!(result, Err(DrawerError::SessionNotOpen(_))));
    }

    /// Non-positive movement amounts are always rejected.
    #[test]
    fn prop_non_positive_movement_rejected(kind in movement_type(), cents in -10_000_000i64..=0) {
        let now = Utc::now();
        let (session, _) = DrawerService::open(&open_input(Decimal::ZERO), None, now).unwrap();
        let input = RecordMovementInput {
            session_id: session.id,
            movement_type: kind,
            amount: Decimal::new(cents, 2),
            category: None,
            description: None,
            payment_id: None,
            effective_at: None,
        };
        let result = DrawerService::new_movement(&session, &input, now);
        prop_assert!(matches!(result, Err(DrawerError::Validation { field: "monto", .. })), "expected monto validation error, got {:?}", result);
    }
}
