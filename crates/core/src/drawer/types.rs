//! Drawer domain types.
//!
//! A drawer session covers one open-to-close period of a physical cash register
//! at a branch. Movements are the append-only ledger entries recorded against it.

use caja_shared::types::{BranchId, CompanyId, DrawerSessionId, MovementId, PaymentId, UserId};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DrawerError;

/// Drawer session status.
///
/// `Closed` is terminal. There is no reopen transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DrawerStatus {
    /// Drawer is open and accepts movements.
    Open,
    /// Drawer has been counted and closed.
    Closed,
}

impl DrawerStatus {
    /// Returns true if movements may be recorded.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns the lowercase storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for DrawerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction a movement moves the drawer balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Increases the balance.
    In,
    /// Decreases the balance.
    Out,
}

/// Movement classification.
///
/// Adjustments carry their direction in the type so that amounts are always
/// stored as positive magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Cash received (sales, payments, the opening float).
    Inflow,
    /// Cash paid out.
    Outflow,
    /// Correction that adds cash.
    AdjustmentIn,
    /// Correction that removes cash.
    AdjustmentOut,
}

impl MovementType {
    /// Returns the balance direction of this movement type.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Inflow | Self::AdjustmentIn => Direction::In,
            Self::Outflow | Self::AdjustmentOut => Direction::Out,
        }
    }

    /// Returns true for either adjustment direction.
    #[must_use]
    pub const fn is_adjustment(self) -> bool {
        matches!(self, Self::AdjustmentIn | Self::AdjustmentOut)
    }

    /// Applies the direction to a positive magnitude.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self.direction() {
            Direction::In => amount,
            Direction::Out => -amount,
        }
    }

    /// Returns the lowercase storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
            Self::AdjustmentIn => "adjustment_in",
            Self::AdjustmentOut => "adjustment_out",
        }
    }
}

impl std::str::FromStr for MovementType {
    type Err = DrawerError;

    /// Parses a movement type, case-insensitively.
    ///
    /// The legacy `INGRESO`/`EGRESO` tags are accepted. A bare adjustment tag is
    /// rejected because its direction would have to be guessed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inflow" | "ingreso" => Ok(Self::Inflow),
            "outflow" | "egreso" => Ok(Self::Outflow),
            "adjustment_in" | "ajuste_ingreso" => Ok(Self::AdjustmentIn),
            "adjustment_out" | "ajuste_egreso" => Ok(Self::AdjustmentOut),
            "adjustment" | "ajuste" => Err(DrawerError::validation(
                "tipo",
                "adjustments must state a direction: ADJUSTMENT_IN or ADJUSTMENT_OUT",
            )),
            other => Err(DrawerError::validation(
                "tipo",
                format!(
                    "unknown movement type '{other}', expected INFLOW, OUTFLOW, ADJUSTMENT_IN or ADJUSTMENT_OUT"
                ),
            )),
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cash register opening-to-closing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawerSession {
    /// Session ID.
    pub id: DrawerSessionId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Branch the physical drawer belongs to.
    pub branch_id: BranchId,
    /// User who opened the drawer.
    pub opened_by: UserId,
    /// User who closed the drawer (set only at close).
    pub closed_by: Option<UserId>,
    /// Declared starting cash.
    pub opening_amount: Decimal,
    /// Counted cash at close (zero while open).
    pub closing_amount: Decimal,
    /// Closing amount minus expected balance (zero while open).
    pub variance: Decimal,
    /// Current status.
    pub status: DrawerStatus,
    /// When the drawer was opened.
    pub opened_at: DateTime<Utc>,
    /// When the drawer was closed. `Some` if and only if the status is `Closed`.
    pub closed_at: Option<DateTime<Utc>>,
    /// Free-text notes given at opening.
    pub opening_notes: Option<String>,
    /// Free-text notes given at closing.
    pub closing_notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl DrawerSession {
    /// Returns true if movements may be recorded against this session.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.status.is_open()
    }
}

/// One immutable ledger entry against a drawer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    /// Movement ID.
    pub id: MovementId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Branch of the owning session.
    pub branch_id: BranchId,
    /// Owning session.
    pub session_id: DrawerSessionId,
    /// Classification.
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    /// Free-text category (e.g. "membership sale").
    pub category: Option<String>,
    /// Positive magnitude.
    pub amount: Decimal,
    /// Free-text description.
    pub description: Option<String>,
    /// Payment record that produced this movement, if any.
    pub payment_id: Option<PaymentId>,
    /// When the cash actually moved.
    pub effective_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Movement {
    /// Returns the amount with the movement's direction applied.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.movement_type.signed(self.amount)
    }
}

/// A session together with its movements ordered by effective time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWithMovements {
    /// The session.
    #[serde(flatten)]
    pub session: DrawerSession,
    /// Its movements.
    pub movements: Vec<Movement>,
}

/// Input for opening a drawer.
#[derive(Debug, Clone)]
pub struct OpenDrawerInput {
    /// Owning company.
    pub company_id: CompanyId,
    /// Branch whose drawer is being opened.
    pub branch_id: BranchId,
    /// User opening the drawer.
    pub opened_by: UserId,
    /// Declared starting cash (must be non-negative).
    pub opening_amount: Decimal,
    /// Optional notes.
    pub notes: Option<String>,
}

/// Input for closing a drawer.
#[derive(Debug, Clone)]
pub struct CloseDrawerInput {
    /// Session to close.
    pub session_id: DrawerSessionId,
    /// User closing the drawer.
    pub closed_by: UserId,
    /// Counted cash (must be non-negative).
    pub closing_amount: Decimal,
    /// Optional notes.
    pub notes: Option<String>,
}

/// Input for recording a movement.
#[derive(Debug, Clone)]
pub struct RecordMovementInput {
    /// Session to record against.
    pub session_id: DrawerSessionId,
    /// Classification.
    pub movement_type: MovementType,
    /// Positive magnitude.
    pub amount: Decimal,
    /// Optional category.
    pub category: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Optional originating payment.
    pub payment_id: Option<PaymentId>,
    /// Effective time; defaults to now.
    pub effective_at: Option<DateTime<Utc>>,
}

/// Conjunctive filters for listing sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawerFilter {
    /// Only sessions of this company.
    pub company_id: Option<CompanyId>,
    /// Only sessions of this branch.
    pub branch_id: Option<BranchId>,
    /// Only sessions opened at or after this instant.
    pub opened_from: Option<DateTime<Utc>>,
    /// Only sessions opened strictly before this instant.
    pub opened_before: Option<DateTime<Utc>>,
}

impl DrawerFilter {
    /// Restricts the filter to sessions opened between two calendar dates (UTC),
    /// both inclusive.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `from` is after `to`.
    pub fn with_date_range(
        mut self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Self, DrawerError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(DrawerError::validation(
                    "fechaInicio",
                    "start date must not be after end date",
                ));
            }
        }

        self.opened_from = from.map(|d| d.and_time(NaiveTime::MIN).and_utc());
        self.opened_before = match to {
            Some(d) => Some(
                d.checked_add_days(Days::new(1))
                    .ok_or_else(|| DrawerError::validation("fechaFin", "end date out of range"))?
                    .and_time(NaiveTime::MIN)
                    .and_utc(),
            ),
            None => None,
        };

        Ok(self)
    }
}
