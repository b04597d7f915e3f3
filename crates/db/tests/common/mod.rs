//! Store scenarios shared by the in-memory and PostgreSQL test suites.
//!
//! Each scenario takes any [`DrawerStore`] and uses fresh company/branch ids,
//! so suites can run against a shared database without cleanup.

#![allow(dead_code)]

use std::sync::Arc;

use caja_core::drawer::{
    CloseDrawerInput, DrawerError, DrawerFilter, DrawerSession, DrawerStatus, MovementType,
    OPENING_BALANCE_CATEGORY, OpenDrawerInput, RecordMovementInput, compute_balance,
};
use caja_db::DrawerStore;
use caja_shared::types::{BranchId, CompanyId, DrawerSessionId, PaymentId, UserId};
use chrono::{Duration, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Barrier;

/// Company and branch pair unique to one test.
#[derive(Debug, Clone, Copy)]
pub struct Scope {
    pub company_id: CompanyId,
    pub branch_id: BranchId,
}

impl Scope {
    pub fn fresh() -> Self {
        Self {
            company_id: CompanyId::new(),
            branch_id: BranchId::new(),
        }
    }

    pub fn open_input(self, amount: Decimal) -> OpenDrawerInput {
        OpenDrawerInput {
            company_id: self.company_id,
            branch_id: self.branch_id,
            opened_by: UserId::new(),
            opening_amount: amount,
            notes: None,
        }
    }
}

pub fn movement(
    session_id: DrawerSessionId,
    kind: MovementType,
    amount: Decimal,
    category: &str,
) -> RecordMovementInput {
    RecordMovementInput {
        session_id,
        movement_type: kind,
        amount,
        category: Some(category.to_string()),
        description: None,
        payment_id: None,
        effective_at: None,
    }
}

pub fn close_input(session_id: DrawerSessionId, amount: Decimal) -> CloseDrawerInput {
    CloseDrawerInput {
        session_id,
        closed_by: UserId::new(),
        closing_amount: amount,
        notes: Some("end of shift".to_string()),
    }
}

async fn balance(store: &dyn DrawerStore, id: DrawerSessionId) -> Decimal {
    store.summarize(id).await.unwrap().computed_balance
}

/// Open, record, close, reopen and reject a second open on one branch.
pub async fn lifecycle_scenario(store: &dyn DrawerStore) {
    let scope = Scope::fresh();

    // 1. Open with the seeded opening balance
    let s1 = store.open(scope.open_input(dec!(100000))).await.unwrap();
    assert_eq!(s1.status, DrawerStatus::Open);
    assert!(s1.closed_at.is_none());
    assert_eq!(s1.closing_amount, Decimal::ZERO);
    assert_eq!(balance(store, s1.id).await, dec!(100000));

    let seeded = store.list_movements(s1.id).await.unwrap();
    assert_eq!(seeded.len(), 1);
    assert_eq!(seeded[0].movement_type, MovementType::Inflow);
    assert_eq!(seeded[0].amount, dec!(100000));
    assert_eq!(seeded[0].category.as_deref(), Some(OPENING_BALANCE_CATEGORY));

    // 2. Sale
    store
        .record_movement(movement(s1.id, MovementType::Inflow, dec!(25000), "membership sale"))
        .await
        .unwrap();
    assert_eq!(balance(store, s1.id).await, dec!(125000));

    // 3. Expense
    store
        .record_movement(movement(s1.id, MovementType::Outflow, dec!(10000), "supplies"))
        .await
        .unwrap();
    assert_eq!(balance(store, s1.id).await, dec!(115000));

    // 4. Close with an exact count
    let closed = store.close(close_input(s1.id, dec!(115000))).await.unwrap();
    assert_eq!(closed.status, DrawerStatus::Closed);
    assert_eq!(closed.variance, Decimal::ZERO);
    assert!(closed.closed_at.is_some());
    assert!(closed.closed_by.is_some());
    assert_eq!(closed.closing_notes.as_deref(), Some("end of shift"));

    // 5. Reopen the branch
    let s2 = store.open(scope.open_input(dec!(50000))).await.unwrap();
    assert_ne!(s2.id, s1.id);
    assert_eq!(balance(store, s2.id).await, dec!(50000));

    // 6. Second open while S2 is open
    let err = store.open(scope.open_input(dec!(1))).await.unwrap_err();
    assert!(matches!(err, DrawerError::AlreadyOpen { branch_id } if branch_id == scope.branch_id));
}

/// Counted surplus and shortage produce signed variances.
pub async fn variance_scenario(store: &dyn DrawerStore, counted: Decimal, expected: Decimal) {
    let session = store.open(Scope::fresh().open_input(dec!(100000))).await.unwrap();
    store
        .record_movement(movement(session.id, MovementType::Inflow, dec!(25000), "sale"))
        .await
        .unwrap();
    store
        .record_movement(movement(session.id, MovementType::Outflow, dec!(10000), "supplies"))
        .await
        .unwrap();

    let closed = store.close(close_input(session.id, counted)).await.unwrap();
    assert_eq!(closed.variance, expected);

    let summary = store.summarize(session.id).await.unwrap();
    assert_eq!(summary.status, DrawerStatus::Closed);
    assert_eq!(summary.computed_balance, dec!(115000));
    assert_eq!(summary.closing_amount, Some(counted));
    assert_eq!(summary.variance, Some(expected));
    assert_eq!(summary.movement_count, 3);
}

/// The session returned by open is the one every later read returns.
pub async fn open_matches_reads_scenario(store: &dyn DrawerStore) {
    let scope = Scope::fresh();
    let mut input = scope.open_input(dec!(1500.5));
    input.notes = Some("turno tarde".to_string());
    let opened = store.open(input).await.unwrap();

    let fetched = store.get_session(opened.id).await.unwrap();
    assert_eq!(fetched.session, opened);
    assert_eq!(fetched.session.opened_at, opened.opened_at);
    assert_eq!(fetched.session.created_at, opened.created_at);

    let active = store.find_open_for_branch(scope.branch_id).await.unwrap().unwrap();
    assert_eq!(active.session, opened);
    assert_eq!(active.movements[0].effective_at, opened.opened_at);
}

/// Adjustments move the balance in their declared direction.
pub async fn adjustment_scenario(store: &dyn DrawerStore) {
    let session = store.open(Scope::fresh().open_input(dec!(1000))).await.unwrap();
    store
        .record_movement(movement(session.id, MovementType::AdjustmentIn, dec!(50), "recount"))
        .await
        .unwrap();
    store
        .record_movement(movement(session.id, MovementType::AdjustmentOut, dec!(80), "recount"))
        .await
        .unwrap();

    let summary = store.summarize(session.id).await.unwrap();
    assert_eq!(summary.total_inflow, dec!(1050));
    assert_eq!(summary.total_outflow, dec!(80));
    assert_eq!(summary.net_adjustment, dec!(-30));
    assert_eq!(summary.computed_balance, dec!(970));
    assert_eq!(summary.closing_amount, None);
    assert_eq!(summary.variance, None);
}

/// A closed drawer rejects writes and reads back unchanged.
pub async fn closed_immutability_scenario(store: &dyn DrawerStore) {
    let session = store.open(Scope::fresh().open_input(dec!(500))).await.unwrap();
    let closed = store.close(close_input(session.id, dec!(480))).await.unwrap();

    let err = store
        .record_movement(movement(session.id, MovementType::Inflow, dec!(10), "late sale"))
        .await
        .unwrap_err();
    assert!(matches!(err, DrawerError::SessionNotOpen(id) if id == session.id));

    let err = store.close(close_input(session.id, dec!(999))).await.unwrap_err();
    assert!(matches!(err, DrawerError::SessionNotOpen(_)));

    for _ in 0..2 {
        let reread = store.get_session(session.id).await.unwrap().session;
        assert_eq!(reread.closing_amount, dec!(480));
        assert_eq!(reread.variance, dec!(-20));
        assert_eq!(reread.closed_at, closed.closed_at);
    }
    assert_eq!(store.list_movements(session.id).await.unwrap().len(), 1);
}

/// Unknown ids surface as not found, never as a state error.
pub async fn not_found_scenario(store: &dyn DrawerStore) {
    let missing = DrawerSessionId::new();
    let is_missing =
        |e: &DrawerError| matches!(e, DrawerError::SessionNotFound(id) if *id == missing);

    assert!(is_missing(&store.get_session(missing).await.unwrap_err()));
    assert!(is_missing(&store.list_movements(missing).await.unwrap_err()));
    assert!(is_missing(&store.summarize(missing).await.unwrap_err()));
    assert!(is_missing(&store.close(close_input(missing, dec!(1))).await.unwrap_err()));
    assert!(is_missing(
        &store
            .record_movement(movement(missing, MovementType::Inflow, dec!(1), "sale"))
            .await
            .unwrap_err()
    ));
}

/// Invalid input is rejected before anything is written.
pub async fn validation_scenario(store: &dyn DrawerStore) {
    let scope = Scope::fresh();
    let err = store.open(scope.open_input(dec!(-1))).await.unwrap_err();
    assert_eq!(err.field(), Some("montoInicial"));
    assert!(store.find_open_for_branch(scope.branch_id).await.unwrap().is_none());

    let session = store.open(scope.open_input(dec!(0))).await.unwrap();
    assert_eq!(store.list_movements(session.id).await.unwrap()[0].amount, Decimal::ZERO);

    let err = store
        .record_movement(movement(session.id, MovementType::Outflow, dec!(0), "nothing"))
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("monto"));

    let err = store.close(close_input(session.id, dec!(-5))).await.unwrap_err();
    assert_eq!(err.field(), Some("montoFinal"));
    assert!(store.get_session(session.id).await.unwrap().session.is_open());
}

/// Repeated reads with no writes in between agree.
pub async fn idempotent_read_scenario(store: &dyn DrawerStore) {
    let scope = Scope::fresh();
    assert!(store.find_open_for_branch(scope.branch_id).await.unwrap().is_none());

    let session = store.open(scope.open_input(dec!(300))).await.unwrap();
    let mut input = movement(session.id, MovementType::Inflow, dec!(45), "locker rental");
    input.payment_id = Some(PaymentId::new());
    input.description = Some("cash".to_string());
    let recorded = store.record_movement(input.clone()).await.unwrap();
    assert_eq!(recorded.payment_id, input.payment_id);
    assert_eq!(recorded.company_id, scope.company_id);
    assert_eq!(recorded.branch_id, scope.branch_id);

    let first = store.find_open_for_branch(scope.branch_id).await.unwrap();
    let second = store.find_open_for_branch(scope.branch_id).await.unwrap();
    assert_eq!(first, second);
    let open = first.unwrap();
    assert_eq!(open.session.id, session.id);
    assert_eq!(open.movements.len(), 2);

    let movements = store.list_movements(session.id).await.unwrap();
    assert_eq!(movements, store.list_movements(session.id).await.unwrap());
    assert_eq!(compute_balance(&movements), dec!(345));
}

/// Movements come back by effective time, not by insertion order.
pub async fn movement_order_scenario(store: &dyn DrawerStore) {
    let session = store.open(Scope::fresh().open_input(dec!(100))).await.unwrap();

    let mut backdated = movement(session.id, MovementType::Outflow, dec!(5), "petty cash");
    backdated.effective_at = Some(session.opened_at - Duration::hours(1));
    let early = store.record_movement(backdated).await.unwrap();
    let late = store
        .record_movement(movement(session.id, MovementType::Inflow, dec!(7), "sale"))
        .await
        .unwrap();

    let ids: Vec<_> = store
        .list_movements(session.id)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], early.id);
    assert_eq!(ids[2], late.id);
}

/// Filters are conjunctive and results are newest first.
pub async fn list_scenario(store: &dyn DrawerStore) {
    let company = CompanyId::new();
    let branch_a = Scope {
        company_id: company,
        branch_id: BranchId::new(),
    };
    let branch_b = Scope {
        company_id: company,
        branch_id: BranchId::new(),
    };

    let first = store.open(branch_a.open_input(dec!(10))).await.unwrap();
    store.close(close_input(first.id, dec!(10))).await.unwrap();
    let second = store.open(branch_a.open_input(dec!(20))).await.unwrap();
    let other = store.open(branch_b.open_input(dec!(30))).await.unwrap();

    let by_company = store
        .list(DrawerFilter {
            company_id: Some(company),
            ..DrawerFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(by_company.len(), 3);
    assert!(by_company.windows(2).all(|w| w[0].opened_at >= w[1].opened_at));

    let by_branch = store
        .list(DrawerFilter {
            company_id: Some(company),
            branch_id: Some(branch_a.branch_id),
            ..DrawerFilter::default()
        })
        .await
        .unwrap();
    let ids: Vec<_> = by_branch.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert!(!ids.contains(&other.id));

    let today = Utc::now().date_naive();
    let in_range = store
        .list(
            DrawerFilter {
                company_id: Some(company),
                ..DrawerFilter::default()
            }
            .with_date_range(Some(today), Some(today))
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(in_range.len(), 3);

    let tomorrow = today + Duration::days(1);
    let future = store
        .list(
            DrawerFilter {
                company_id: Some(company),
                ..DrawerFilter::default()
            }
            .with_date_range(Some(tomorrow), None)
            .unwrap(),
        )
        .await
        .unwrap();
    assert!(future.is_empty());
}

/// Concurrent opens for one branch yield exactly one drawer.
pub async fn concurrent_open_scenario(store: Arc<dyn DrawerStore>, attempts: usize) {
    let scope = Scope::fresh();
    let barrier = Arc::new(Barrier::new(attempts));

    let tasks = (0..attempts).map(|_| {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            store.open(scope.open_input(dec!(100))).await
        })
    });

    let results: Vec<Result<DrawerSession, DrawerError>> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let opened = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(DrawerError::AlreadyOpen { .. })))
        .count();
    assert_eq!(opened, 1, "exactly one open must succeed: {results:?}");
    assert_eq!(conflicts, attempts - 1);

    let open = store
        .find_open_for_branch(scope.branch_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(open.movements.len(), 1);
}

/// Movements racing a close either land before it or are rejected.
pub async fn record_close_race_scenario(store: Arc<dyn DrawerStore>, writers: usize) {
    let session_id = store.open(Scope::fresh().open_input(dec!(0))).await.unwrap().id;
    let barrier = Arc::new(Barrier::new(writers + 1));

    let mut tasks = Vec::with_capacity(writers);
    for _ in 0..writers {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            store
                .record_movement(movement(session_id, MovementType::Inflow, dec!(10), "sale"))
                .await
        }));
    }

    let closer = {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            store.close(close_input(session_id, dec!(0))).await
        })
    };

    let recorded = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .filter(|r| match r {
            Ok(_) => true,
            Err(DrawerError::SessionNotOpen(_)) => false,
            Err(other) => panic!("unexpected error: {other}"),
        })
        .count();
    let closed = closer.await.unwrap().unwrap();

    let movements = store.list_movements(session_id).await.unwrap();
    assert_eq!(movements.len(), recorded + 1);

    // The stored variance accounts for exactly the movements that made it in.
    let expected = compute_balance(&movements);
    assert_eq!(closed.variance, -expected);
}
