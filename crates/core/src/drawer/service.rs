//! Drawer service for session lifecycle rules.
//!
//! This module contains the state transitions of a drawer session with no
//! database dependencies. The store loads the current state, asks the service
//! what the next state is, and persists the result.

use caja_shared::types::{BranchId, DrawerSessionId, MovementId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::error::DrawerError;
use super::reconciliation::{compute_balance, variance};
use super::types::{
    CloseDrawerInput, DrawerSession, DrawerStatus, Movement, MovementType, OpenDrawerInput,
    RecordMovementInput,
};
use super::validation::{
    validate_amount_magnitude, validate_close, validate_movement, validate_open,
};

/// Category of the movement seeded at open.
pub const OPENING_BALANCE_CATEGORY: &str = "opening_balance";

/// Description of the movement seeded at open.
pub const OPENING_BALANCE_DESCRIPTION: &str = "opening balance";

/// Drawer lifecycle rules.
///
/// Every operation is pure: it takes the current state and a clock reading and
/// returns the state to persist.
pub struct DrawerService;

impl DrawerService {
    /// Rejects an open request when the branch already has an open drawer.
    ///
    /// # Errors
    ///
    /// Returns `DrawerError::AlreadyOpen` if `existing` is an open session.
    pub fn ensure_can_open(
        branch_id: BranchId,
        existing: Option<&DrawerSession>,
    ) -> Result<(), DrawerError> {
        match existing {
            Some(session) if session.is_open() => Err(DrawerError::AlreadyOpen { branch_id }),
            _ => Ok(()),
        }
    }

    /// Returns the session if it exists and is open.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` for a missing session and `SessionNotOpen`
    /// for a closed one.
    pub fn ensure_open(
        session: Option<&DrawerSession>,
        session_id: DrawerSessionId,
    ) -> Result<&DrawerSession, DrawerError> {
        let session = session.ok_or(DrawerError::SessionNotFound(session_id))?;
        if !session.is_open() {
            return Err(DrawerError::SessionNotOpen(session_id));
        }
        Ok(session)
    }

    /// Builds a new open session from a validated request.
    ///
    /// Callers must run [`validate_open`] first; [`Self::open`] does both.
    #[must_use]
    pub fn new_session(input: &OpenDrawerInput, now: DateTime<Utc>) -> DrawerSession {
        DrawerSession {
            id: DrawerSessionId::new(),
            company_id: input.company_id,
            branch_id: input.branch_id,
            opened_by: input.opened_by,
            closed_by: None,
            opening_amount: input.opening_amount,
            closing_amount: Decimal::ZERO,
            variance: Decimal::ZERO,
            status: DrawerStatus::Open,
            opened_at: now,
            closed_at: None,
            opening_notes: input.notes.clone(),
            closing_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The inflow that carries the opening float into the ledger.
    ///
    /// Written for every session, including a zero float, so the ledger alone
    /// always reproduces the expected balance.
    #[must_use]
    pub fn opening_movement(session: &DrawerSession) -> Movement {
        Movement {
            id: MovementId::new(),
            company_id: session.company_id,
            branch_id: session.branch_id,
            session_id: session.id,
            movement_type: MovementType::Inflow,
            category: Some(OPENING_BALANCE_CATEGORY.to_string()),
            amount: session.opening_amount,
            description: Some(OPENING_BALANCE_DESCRIPTION.to_string()),
            payment_id: None,
            effective_at: session.opened_at,
            created_at: session.opened_at,
            updated_at: session.opened_at,
        }
    }

    /// Validates an open request and returns the session plus its seed movement.
    ///
    /// # Errors
    ///
    /// Returns `DrawerError::Validation` for malformed input, or
    /// `DrawerError::AlreadyOpen` if `existing` is an open session.
    pub fn open(
        input: &OpenDrawerInput,
        existing: Option<&DrawerSession>,
        now: DateTime<Utc>,
    ) -> Result<(DrawerSession, Movement), DrawerError> {
        validate_open(input)?;
        Self::ensure_can_open(input.branch_id, existing)?;

        let session = Self::new_session(input, now);
        let seed = Self::opening_movement(&session);
        Ok((session, seed))
    }

    /// Builds a movement against an open session.
    ///
    /// Company and branch are copied from the session, never taken from the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input or `SessionNotOpen` if
    /// the session is closed.
    pub fn new_movement(
        session: &DrawerSession,
        input: &RecordMovementInput,
        now: DateTime<Utc>,
    ) -> Result<Movement, DrawerError> {
        validate_movement(input)?;
        let session = Self::ensure_open(Some(session), input.session_id)?;

        Ok(Movement {
            id: MovementId::new(),
            company_id: session.company_id,
            branch_id: session.branch_id,
            session_id: session.id,
            movement_type: input.movement_type,
            category: input.category.clone(),
            amount: input.amount,
            description: input.description.clone(),
            payment_id: input.payment_id,
            effective_at: input.effective_at.unwrap_or(now),
            created_at: now,
            updated_at: now,
        })
    }

    /// Closes a session, reconciling the counted cash against its movements.
    ///
    /// `movements` must be the complete ledger of the session, seed included.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input or `SessionNotOpen` if
    /// the session is already closed.
    pub fn close(
        session: DrawerSession,
        movements: &[Movement],
        input: &CloseDrawerInput,
        now: DateTime<Utc>,
    ) -> Result<DrawerSession, DrawerError> {
        validate_close(input)?;
        Self::ensure_open(Some(&session), input.session_id)?;

        if let Some(stray) = movements.iter().find(|m| m.session_id != session.id) {
            return Err(DrawerError::Internal(format!(
                "movement {} does not belong to drawer {}",
                stray.id, session.id
            )));
        }

        let expected = compute_balance(movements);
        let variance = variance(input.closing_amount, expected);
        validate_amount_magnitude("montoFinal", variance)?;

        Ok(DrawerSession {
            closed_by: Some(input.closed_by),
            closing_amount: input.closing_amount,
            variance,
            status: DrawerStatus::Closed,
            closed_at: Some(now),
            closing_notes: input.notes.clone(),
            updated_at: now.max(session.updated_at),
            ..session
        })
    }
}
