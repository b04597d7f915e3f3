//! Input validation for drawer operations.
//!
//! These checks run before any state is touched. Amounts are stored as
//! `DECIMAL(14,2)`, so anything with more precision or magnitude is rejected
//! up front instead of being rounded by the store.

use rust_decimal::Decimal;

use super::error::DrawerError;
use super::types::{CloseDrawerInput, OpenDrawerInput, RecordMovementInput};

/// Maximum number of decimal places for an amount.
pub const MAX_AMOUNT_SCALE: u32 = 2;

/// Maximum length of a movement category.
pub const MAX_CATEGORY_LEN: usize = 100;

/// Maximum length of notes and descriptions.
pub const MAX_TEXT_LEN: usize = 1000;

/// Exclusive upper bound for any stored amount (12 integer digits).
#[must_use]
pub fn amount_limit() -> Decimal {
    Decimal::new(1_000_000_000_000, 0)
}

/// Validates an opening request.
///
/// # Errors
///
/// Returns `DrawerError::Validation` naming the first offending field.
pub fn validate_open(input: &OpenDrawerInput) -> Result<(), DrawerError> {
    validate_non_negative_amount("montoInicial", input.opening_amount)?;
    validate_text("observaciones", input.notes.as_deref(), MAX_TEXT_LEN)
}

/// Validates a closing request.
///
/// # Errors
///
/// Returns `DrawerError::Validation` naming the first offending field.
pub fn validate_close(input: &CloseDrawerInput) -> Result<(), DrawerError> {
    validate_non_negative_amount("montoFinal", input.closing_amount)?;
    validate_text("observaciones", input.notes.as_deref(), MAX_TEXT_LEN)
}

/// Validates a movement request.
///
/// # Errors
///
/// Returns `DrawerError::Validation` naming the first offending field.
pub fn validate_movement(input: &RecordMovementInput) -> Result<(), DrawerError> {
    validate_positive_amount("monto", input.amount)?;
    validate_text("concepto", input.category.as_deref(), MAX_CATEGORY_LEN)?;
    validate_text("observaciones", input.description.as_deref(), MAX_TEXT_LEN)
}

/// Validates an amount that may be zero.
///
/// # Errors
///
/// Returns an error if the amount is negative, too precise or too large.
pub fn validate_non_negative_amount(
    field: &'static str,
    amount: Decimal,
) -> Result<(), DrawerError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DrawerError::validation(field, "must not be negative"));
    }
    validate_amount_shape(field, amount)
}

/// Validates an amount that must be strictly positive.
///
/// # Errors
///
/// Returns an error if the amount is zero, negative, too precise or too large.
pub fn validate_positive_amount(field: &'static str, amount: Decimal) -> Result<(), DrawerError> {
    if amount <= Decimal::ZERO {
        return Err(DrawerError::validation(field, "must be greater than zero"));
    }
    validate_amount_shape(field, amount)
}

fn validate_amount_shape(field: &'static str, amount: Decimal) -> Result<(), DrawerError> {
    if amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err(DrawerError::validation(
            field,
            format!("must have at most {MAX_AMOUNT_SCALE} decimal places"),
        ));
    }
    validate_amount_magnitude(field, amount)
}

/// Validates a derived amount, such as a variance, that must fit the store.
///
/// # Errors
///
/// Returns an error if the magnitude reaches the storage limit.
pub fn validate_amount_magnitude(field: &'static str, amount: Decimal) -> Result<(), DrawerError> {
    if amount.abs() >= amount_limit() {
        return Err(DrawerError::validation(field, "exceeds the maximum amount"));
    }
    Ok(())
}

fn validate_text(
    field: &'static str,
    value: Option<&str>,
    max_len: usize,
) -> Result<(), DrawerError> {
    let Some(value) = value else {
        return Ok(());
    };
    if value.trim().is_empty() {
        return Err(DrawerError::validation(field, "must not be blank when provided"));
    }
    if value.chars().count() > max_len {
        return Err(DrawerError::validation(
            field,
            format!("must be at most {max_len} characters"),
        ));
    }
    Ok(())
}
