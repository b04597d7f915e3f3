//! In-process drawer store.
//!
//! Holds every session and movement behind a single async mutex, so each
//! operation observes and mutates state atomically. Nothing survives a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use caja_core::drawer::{
    CloseDrawerInput, DrawerError, DrawerFilter, DrawerService, DrawerSession, Movement,
    OpenDrawerInput, RecordMovementInput, SessionWithMovements,
};
use caja_shared::types::{BranchId, DrawerSessionId};
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::store::DrawerStore;

#[derive(Debug, Default)]
struct State {
    sessions: HashMap<DrawerSessionId, DrawerSession>,
    movements: HashMap<DrawerSessionId, Vec<Movement>>,
}

impl State {
    fn open_for(&self, input: &OpenDrawerInput) -> Option<&DrawerSession> {
        self.sessions.values().find(|s| {
            s.is_open() && s.company_id == input.company_id && s.branch_id == input.branch_id
        })
    }

    fn movements_of(&self, id: DrawerSessionId) -> Vec<Movement> {
        let mut movements = self.movements.get(&id).cloned().unwrap_or_default();
        movements.sort_by_key(|m| (m.effective_at, m.created_at));
        movements
    }

    fn with_movements(&self, session: &DrawerSession) -> SessionWithMovements {
        SessionWithMovements {
            session: session.clone(),
            movements: self.movements_of(session.id),
        }
    }
}

/// Drawer store kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryDrawerStore {
    state: Mutex<State>,
}

impl InMemoryDrawerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrawerStore for InMemoryDrawerStore {
    async fn open(&self, input: OpenDrawerInput) -> Result<DrawerSession, DrawerError> {
        let mut state = self.state.lock().await;

        let (session, seed) = DrawerService::open(&input, state.open_for(&input), Utc::now())
            .inspect_err(|e| {
                if matches!(e, DrawerError::AlreadyOpen { .. }) {
                    warn!(branch_id = %input.branch_id, "Rejected open: drawer already open");
                }
            })?;

        state.movements.insert(session.id, vec![seed]);
        state.sessions.insert(session.id, session.clone());

        info!(
            session_id = %session.id,
            branch_id = %session.branch_id,
            opening_amount = %session.opening_amount,
            "Drawer opened"
        );
        Ok(session)
    }

    async fn close(&self, input: CloseDrawerInput) -> Result<DrawerSession, DrawerError> {
        let mut state = self.state.lock().await;

        let current = state
            .sessions
            .get(&input.session_id)
            .cloned()
            .ok_or(DrawerError::SessionNotFound(input.session_id))?;
        let movements = state.movements_of(input.session_id);

        let closed = DrawerService::close(current, &movements, &input, Utc::now())
            .inspect_err(|e| {
                if matches!(e, DrawerError::SessionNotOpen(_)) {
                    warn!(session_id = %input.session_id, "Rejected close: drawer not open");
                }
            })?;
        state.sessions.insert(closed.id, closed.clone());

        info!(
            session_id = %closed.id,
            closing_amount = %closed.closing_amount,
            variance = %closed.variance,
            "Drawer closed"
        );
        Ok(closed)
    }

    async fn record_movement(&self, input: RecordMovementInput) -> Result<Movement, DrawerError> {
        let mut state = self.state.lock().await;

        let session = state
            .sessions
            .get(&input.session_id)
            .ok_or(DrawerError::SessionNotFound(input.session_id))?;
        let movement = DrawerService::new_movement(session, &input, Utc::now())?;

        state
            .movements
            .entry(movement.session_id)
            .or_default()
            .push(movement.clone());

        info!(
            session_id = %movement.session_id,
            movement_id = %movement.id,
            movement_type = %movement.movement_type,
            amount = %movement.amount,
            "Movement recorded"
        );
        Ok(movement)
    }

    async fn get_session(&self, id: DrawerSessionId) -> Result<SessionWithMovements, DrawerError> {
        let state = self.state.lock().await;
        state
            .sessions
            .get(&id)
            .map(|s| state.with_movements(s))
            .ok_or(DrawerError::SessionNotFound(id))
    }

    async fn find_open_for_branch(
        &self,
        branch_id: BranchId,
    ) -> Result<Option<SessionWithMovements>, DrawerError> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .values()
            .find(|s| s.is_open() && s.branch_id == branch_id)
            .map(|s| state.with_movements(s)))
    }

    async fn list(&self, filter: DrawerFilter) -> Result<Vec<DrawerSession>, DrawerError> {
        let state = self.state.lock().await;
        let mut sessions: Vec<DrawerSession> = state
            .sessions
            .values()
            .filter(|s| filter.company_id.is_none_or(|c| s.company_id == c))
            .filter(|s| filter.branch_id.is_none_or(|b| s.branch_id == b))
            .filter(|s| filter.opened_from.is_none_or(|from| s.opened_at >= from))
            .filter(|s| filter.opened_before.is_none_or(|before| s.opened_at < before))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| {
            b.opened_at
                .cmp(&a.opened_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(sessions)
    }

    async fn list_movements(&self, id: DrawerSessionId) -> Result<Vec<Movement>, DrawerError> {
        let state = self.state.lock().await;
        if !state.sessions.contains_key(&id) {
            return Err(DrawerError::SessionNotFound(id));
        }
        Ok(state.movements_of(id))
    }
}
