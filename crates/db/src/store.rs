//! Ledger store boundary.
//!
//! Every implementation delegates the lifecycle rules to
//! [`caja_core::drawer::DrawerService`] and is responsible only for making each
//! operation atomic with respect to concurrent callers.

use async_trait::async_trait;
use caja_core::drawer::{
    CloseDrawerInput, DrawerError, DrawerFilter, DrawerSession, DrawerSummary, Movement,
    OpenDrawerInput, RecordMovementInput, SessionWithMovements,
};
use caja_shared::types::{BranchId, DrawerSessionId};

/// Durable storage of drawer sessions and their movements.
#[async_trait]
pub trait DrawerStore: Send + Sync {
    /// Opens a drawer and seeds its opening balance movement in one atomic step.
    ///
    /// # Errors
    ///
    /// `Validation` for malformed input, `AlreadyOpen` if the branch already has
    /// an open drawer.
    async fn open(&self, input: OpenDrawerInput) -> Result<DrawerSession, DrawerError>;

    /// Closes an open drawer and stores its variance.
    ///
    /// # Errors
    ///
    /// `Validation` for malformed input, `SessionNotFound` or `SessionNotOpen`.
    async fn close(&self, input: CloseDrawerInput) -> Result<DrawerSession, DrawerError>;

    /// Appends a movement to an open drawer.
    ///
    /// # Errors
    ///
    /// `Validation` for malformed input, `SessionNotFound` or `SessionNotOpen`.
    async fn record_movement(&self, input: RecordMovementInput) -> Result<Movement, DrawerError>;

    /// Loads a session with its movements.
    ///
    /// # Errors
    ///
    /// `SessionNotFound` if no such session exists.
    async fn get_session(&self, id: DrawerSessionId) -> Result<SessionWithMovements, DrawerError>;

    /// Returns the open session of a branch, if any.
    async fn find_open_for_branch(
        &self,
        branch_id: BranchId,
    ) -> Result<Option<SessionWithMovements>, DrawerError>;

    /// Lists sessions matching every filter, newest opening first.
    async fn list(&self, filter: DrawerFilter) -> Result<Vec<DrawerSession>, DrawerError>;

    /// Lists a session's movements by effective time.
    ///
    /// # Errors
    ///
    /// `SessionNotFound` if no such session exists.
    async fn list_movements(&self, id: DrawerSessionId) -> Result<Vec<Movement>, DrawerError>;

    /// Builds the reporting summary of a session.
    ///
    /// # Errors
    ///
    /// `SessionNotFound` if no such session exists.
    async fn summarize(&self, id: DrawerSessionId) -> Result<DrawerSummary, DrawerError> {
        let loaded = self.get_session(id).await?;
        Ok(DrawerSummary::summarize(&loaded.session, &loaded.movements))
    }
}
