//! Balance reconciliation for drawer sessions.
//!
//! The expected balance is derived purely from the movement ledger. The opening
//! float is itself the first movement of every session, so the fold starts at
//! zero rather than at the session's opening amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{Direction, DrawerSession, DrawerStatus, Movement, MovementType};

/// Folds `(type, magnitude)` pairs into a balance.
#[must_use]
pub fn fold_balance<I>(items: I) -> Decimal
where
    I: IntoIterator<Item = (MovementType, Decimal)>,
{
    items
        .into_iter()
        .fold(Decimal::ZERO, |balance, (kind, amount)| balance + kind.signed(amount))
}

/// Computes the expected drawer balance from its movements.
#[must_use]
pub fn compute_balance(movements: &[Movement]) -> Decimal {
    fold_balance(movements.iter().map(|m| (m.movement_type, m.amount)))
}

/// Counted cash minus expected balance.
///
/// Positive is a surplus, negative a shortage.
#[must_use]
pub fn variance(closing_amount: Decimal, expected_balance: Decimal) -> Decimal {
    closing_amount - expected_balance
}

/// Reporting view of a drawer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawerSummary {
    /// Session status at the time of the summary.
    pub status: DrawerStatus,
    /// Declared opening float.
    pub opening_amount: Decimal,
    /// Sum of inflows and incoming adjustments (opening float included).
    pub total_inflow: Decimal,
    /// Sum of outflows and outgoing adjustments.
    pub total_outflow: Decimal,
    /// Incoming minus outgoing adjustments, already contained in the totals.
    pub net_adjustment: Decimal,
    /// Expected balance from the ledger.
    pub computed_balance: Decimal,
    /// Counted cash, only once closed.
    pub closing_amount: Option<Decimal>,
    /// Closing amount minus computed balance, only once closed.
    pub variance: Option<Decimal>,
    /// Number of movements, opening float included.
    pub movement_count: usize,
}

impl DrawerSummary {
    /// Aggregates a session's movements by direction.
    #[must_use]
    pub fn summarize(session: &DrawerSession, movements: &[Movement]) -> Self {
        let mut total_inflow = Decimal::ZERO;
        let mut total_outflow = Decimal::ZERO;
        let mut net_adjustment = Decimal::ZERO;

        for movement in movements {
            match movement.movement_type.direction() {
                Direction::In => total_inflow += movement.amount,
                Direction::Out => total_outflow += movement.amount,
            }
            if movement.movement_type.is_adjustment() {
                net_adjustment += movement.signed_amount();
            }
        }

        let closed = session.status == DrawerStatus::Closed;

        Self {
            status: session.status,
            opening_amount: session.opening_amount,
            total_inflow,
            total_outflow,
            net_adjustment,
            computed_balance: total_inflow - total_outflow,
            closing_amount: closed.then_some(session.closing_amount),
            variance: closed.then_some(session.variance),
            movement_count: movements.len(),
        }
    }
}
