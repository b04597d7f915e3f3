//! Drawer error types.
//!
//! Every variant maps onto one of the caller-facing kinds: validation, conflict,
//! not found, or an internal failure.

use caja_shared::AppError;
use caja_shared::types::{BranchId, DrawerSessionId};
use thiserror::Error;

/// Errors that can occur during drawer operations.
#[derive(Debug, Error)]
pub enum DrawerError {
    // ========== Validation Errors ==========
    /// Malformed or out-of-range input.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// The offending field, named as the API exposes it.
        field: &'static str,
        /// The violated constraint.
        message: String,
    },

    // ========== State Errors ==========
    /// The branch already has an open drawer.
    #[error("There is already an open drawer for branch {branch_id}; close the existing drawer first")]
    AlreadyOpen {
        /// The branch with the open drawer.
        branch_id: BranchId,
    },

    /// No session with this ID exists.
    #[error("Drawer {0} not found")]
    SessionNotFound(DrawerSessionId),

    /// The session exists but is closed.
    #[error("Drawer {0} is not open")]
    SessionNotOpen(DrawerSessionId),

    // ========== Storage Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DrawerError {
    /// Creates a validation error for a field.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::AlreadyOpen { .. } => "DRAWER_ALREADY_OPEN",
            Self::SessionNotFound(_) => "DRAWER_NOT_FOUND",
            Self::SessionNotOpen(_) => "DRAWER_NOT_OPEN",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::SessionNotFound(_) => 404,
            Self::AlreadyOpen { .. } | Self::SessionNotOpen(_) => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the field name for validation errors.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }
}

impl From<DrawerError> for AppError {
    fn from(err: DrawerError) -> Self {
        let message = err.to_string();
        match err {
            DrawerError::Validation { .. } => Self::Validation(message),
            DrawerError::AlreadyOpen { .. } | DrawerError::SessionNotOpen(_) => {
                Self::Conflict(message)
            }
            DrawerError::SessionNotFound(_) => Self::NotFound(message),
            DrawerError::Database(_) => Self::Database(message),
            DrawerError::Internal(_) => Self::Internal(message),
        }
    }
}
