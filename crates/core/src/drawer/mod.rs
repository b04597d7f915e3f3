//! Cash drawer ledger.
//!
//! This module implements the drawer domain:
//! - Drawer sessions and their open/close state machine
//! - Append-only drawer movements
//! - Input validation executed before any state mutation
//! - Balance reconciliation and variance at close time
//! - Error types for drawer operations

pub mod error;
pub mod reconciliation;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod reconciliation_props;
#[cfg(test)]
mod service_props;

pub use error::DrawerError;
pub use reconciliation::{DrawerSummary, compute_balance, fold_balance, variance};
pub use service::{DrawerService, OPENING_BALANCE_CATEGORY, OPENING_BALANCE_DESCRIPTION};
pub use types::{
    CloseDrawerInput, Direction, DrawerFilter, DrawerSession, DrawerStatus, Movement,
    MovementType, OpenDrawerInput, RecordMovementInput, SessionWithMovements,
};
