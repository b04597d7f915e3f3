//! Drawer repository backed by PostgreSQL.
//!
//! Open, close and record each run in a single database transaction. Close and
//! record lock the session row first, so they serialize against each other; open
//! relies on the partial unique index for branches racing on their first drawer.

use async_trait::async_trait;
use caja_core::drawer::validation::{validate_close, validate_movement, validate_open};
use caja_core::drawer::{
    CloseDrawerInput, DrawerError, DrawerFilter, DrawerService, DrawerSession, Movement,
    OpenDrawerInput, RecordMovementInput, SessionWithMovements,
};
use caja_shared::types::{BranchId, CompanyId, DrawerSessionId};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::{error, info, warn};

use crate::entities::{
    drawer_movements, drawer_sessions,
    sea_orm_active_enums::{DrawerStatus, MovementType},
};
use crate::store::DrawerStore;

/// Drawer repository for ledger database operations.
#[derive(Debug, Clone)]
pub struct DrawerRepository {
    db: DatabaseConnection,
}

impl DrawerRepository {
    /// Creates a new drawer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds the open session of a branch within a company.
    async fn find_open_model<C: ConnectionTrait>(
        conn: &C,
        company_id: CompanyId,
        branch_id: BranchId,
    ) -> Result<Option<drawer_sessions::Model>, DrawerError> {
        drawer_sessions::Entity::find()
            .filter(drawer_sessions::Column::CompanyId.eq(company_id.into_inner()))
            .filter(drawer_sessions::Column::BranchId.eq(branch_id.into_inner()))
            .filter(drawer_sessions::Column::Status.eq(DrawerStatus::Open))
            .one(conn)
            .await
            .map_err(db_error)
    }

    /// Loads a session row with `SELECT ... FOR UPDATE`.
    async fn lock_session<C: ConnectionTrait>(
        conn: &C,
        id: DrawerSessionId,
    ) -> Result<DrawerSession, DrawerError> {
        drawer_sessions::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(db_error)?
            .map(session_from_model)
            .ok_or(DrawerError::SessionNotFound(id))
    }

    async fn load_movements<C: ConnectionTrait>(
        conn: &C,
        id: DrawerSessionId,
    ) -> Result<Vec<Movement>, DrawerError> {
        let rows = drawer_movements::Entity::find()
            .filter(drawer_movements::Column::SessionId.eq(id.into_inner()))
            .order_by_asc(drawer_movements::Column::EffectiveAt)
            .order_by_asc(drawer_movements::Column::CreatedAt)
            .order_by_asc(drawer_movements::Column::Id)
            .all(conn)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(movement_from_model).collect())
    }

    async fn with_movements(
        &self,
        model: drawer_sessions::Model,
    ) -> Result<SessionWithMovements, DrawerError> {
        let session = session_from_model(model);
        let movements = Self::load_movements(&self.db, session.id).await?;
        Ok(SessionWithMovements { session, movements })
    }
}

#[async_trait]
impl DrawerStore for DrawerRepository {
    async fn open(&self, input: OpenDrawerInput) -> Result<DrawerSession, DrawerError> {
        validate_open(&input)?;

        let txn = self.db.begin().await.map_err(db_error)?;

        let existing = Self::find_open_model(&txn, input.company_id, input.branch_id)
            .await?
            .map(session_from_model);

        let (session, seed) = DrawerService::open(&input, existing.as_ref(), Utc::now())
            .inspect_err(|e| {
                if matches!(e, DrawerError::AlreadyOpen { .. }) {
                    warn!(branch_id = %input.branch_id, "Rejected open: drawer already open");
                }
            })?;

        let stored = session_to_active(&session)
            .insert(&txn)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    warn!(branch_id = %input.branch_id, "Rejected open: lost race for branch");
                    DrawerError::AlreadyOpen {
                        branch_id: input.branch_id,
                    }
                }
                _ => db_error(e),
            })?;

        movement_to_active(&seed)
            .insert(&txn)
            .await
            .map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        let session = session_from_model(stored);
        info!(
            session_id = %session.id,
            branch_id = %session.branch_id,
            opening_amount = %session.opening_amount,
            "Drawer opened"
        );
        Ok(session)
    }

    async fn close(&self, input: CloseDrawerInput) -> Result<DrawerSession, DrawerError> {
        validate_close(&input)?;

        let txn = self.db.begin().await.map_err(db_error)?;

        let current = Self::lock_session(&txn, input.session_id).await?;
        let movements = Self::load_movements(&txn, input.session_id).await?;

        let closed = DrawerService::close(current, &movements, &input, Utc::now())
            .inspect_err(|e| {
                if matches!(e, DrawerError::SessionNotOpen(_)) {
                    warn!(session_id = %input.session_id, "Rejected close: drawer not open");
                }
            })?;

        let updated = drawer_sessions::ActiveModel {
            id: Set(closed.id.into_inner()),
            closed_by: Set(closed.closed_by.map(Into::into)),
            closing_amount: Set(closed.closing_amount),
            variance: Set(closed.variance),
            status: Set(DrawerStatus::Closed),
            closed_at: Set(closed.closed_at.map(Into::into)),
            closing_notes: Set(closed.closing_notes.clone()),
            updated_at: Set(closed.updated_at.into()),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        info!(
            session_id = %closed.id,
            closing_amount = %closed.closing_amount,
            variance = %closed.variance,
            "Drawer closed"
        );
        Ok(session_from_model(updated))
    }

    async fn record_movement(&self, input: RecordMovementInput) -> Result<Movement, DrawerError> {
        validate_movement(&input)?;

        let txn = self.db.begin().await.map_err(db_error)?;

        let session = Self::lock_session(&txn, input.session_id).await?;
        let movement = DrawerService::new_movement(&session, &input, Utc::now())?;

        let stored = movement_to_active(&movement)
            .insert(&txn)
            .await
            .map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        info!(
            session_id = %movement.session_id,
            movement_id = %movement.id,
            movement_type = %movement.movement_type,
            amount = %movement.amount,
            "Movement recorded"
        );
        Ok(movement_from_model(stored))
    }

    async fn get_session(&self, id: DrawerSessionId) -> Result<SessionWithMovements, DrawerError> {
        let model = drawer_sessions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(DrawerError::SessionNotFound(id))?;

        self.with_movements(model).await
    }

    async fn find_open_for_branch(
        &self,
        branch_id: BranchId,
    ) -> Result<Option<SessionWithMovements>, DrawerError> {
        let model = drawer_sessions::Entity::find()
            .filter(drawer_sessions::Column::BranchId.eq(branch_id.into_inner()))
            .filter(drawer_sessions::Column::Status.eq(DrawerStatus::Open))
            .one(&self.db)
            .await
            .map_err(db_error)?;

        match model {
            Some(model) => Ok(Some(self.with_movements(model).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: DrawerFilter) -> Result<Vec<DrawerSession>, DrawerError> {
        let mut query = drawer_sessions::Entity::find();

        if let Some(company_id) = filter.company_id {
            query = query.filter(drawer_sessions::Column::CompanyId.eq(company_id.into_inner()));
        }

        if let Some(branch_id) = filter.branch_id {
            query = query.filter(drawer_sessions::Column::BranchId.eq(branch_id.into_inner()));
        }

        if let Some(from) = filter.opened_from {
            query = query.filter(drawer_sessions::Column::OpenedAt.gte(from));
        }

        if let Some(before) = filter.opened_before {
            query = query.filter(drawer_sessions::Column::OpenedAt.lt(before));
        }

        let sessions = query
            .order_by_desc(drawer_sessions::Column::OpenedAt)
            .order_by_desc(drawer_sessions::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(sessions.into_iter().map(session_from_model).collect())
    }

    async fn list_movements(&self, id: DrawerSessionId) -> Result<Vec<Movement>, DrawerError> {
        let exists = drawer_sessions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_error)?
            .is_some();
        if !exists {
            return Err(DrawerError::SessionNotFound(id));
        }

        Self::load_movements(&self.db, id).await
    }
}

// ============================================================================
// Row mapping
// ============================================================================

fn db_error(err: DbErr) -> DrawerError {
    error!(error = %err, "Drawer store failure");
    DrawerError::Database(err.to_string())
}

/// Converts a session row into the domain type.
#[must_use]
pub fn session_from_model(model: drawer_sessions::Model) -> DrawerSession {
    DrawerSession {
        id: model.id.into(),
        company_id: model.company_id.into(),
        branch_id: model.branch_id.into(),
        opened_by: model.opened_by.into(),
        closed_by: model.closed_by.map(Into::into),
        opening_amount: model.opening_amount,
        closing_amount: model.closing_amount,
        variance: model.variance,
        status: model.status.into(),
        opened_at: model.opened_at.with_timezone(&Utc),
        closed_at: model.closed_at.map(|t| t.with_timezone(&Utc)),
        opening_notes: model.opening_notes,
        closing_notes: model.closing_notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

/// Converts a movement row into the domain type.
#[must_use]
pub fn movement_from_model(model: drawer_movements::Model) -> Movement {
    Movement {
        id: model.id.into(),
        company_id: model.company_id.into(),
        branch_id: model.branch_id.into(),
        session_id: model.session_id.into(),
        movement_type: model.movement_type.into(),
        category: model.category,
        amount: model.amount,
        description: model.description,
        payment_id: model.payment_id.map(Into::into),
        effective_at: model.effective_at.with_timezone(&Utc),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn session_to_active(session: &DrawerSession) -> drawer_sessions::ActiveModel {
    drawer_sessions::ActiveModel {
        id: Set(session.id.into_inner()),
        company_id: Set(session.company_id.into_inner()),
        branch_id: Set(session.branch_id.into_inner()),
        opened_by: Set(session.opened_by.into_inner()),
        closed_by: Set(session.closed_by.map(Into::into)),
        opening_amount: Set(session.opening_amount),
        closing_amount: Set(session.closing_amount),
        variance: Set(session.variance),
        status: Set(session.status.into()),
        opened_at: Set(session.opened_at.into()),
        closed_at: Set(session.closed_at.map(Into::into)),
        opening_notes: Set(session.opening_notes.clone()),
        closing_notes: Set(session.closing_notes.clone()),
        created_at: Set(session.created_at.into()),
        updated_at: Set(session.updated_at.into()),
    }
}

fn movement_to_active(movement: &Movement) -> drawer_movements::ActiveModel {
    drawer_movements::ActiveModel {
        id: Set(movement.id.into_inner()),
        company_id: Set(movement.company_id.into_inner()),
        branch_id: Set(movement.branch_id.into_inner()),
        session_id: Set(movement.session_id.into_inner()),
        movement_type: Set(MovementType::from(movement.movement_type)),
        category: Set(movement.category.clone()),
        amount: Set(movement.amount),
        description: Set(movement.description.clone()),
        payment_id: Set(movement.payment_id.map(Into::into)),
        effective_at: Set(movement.effective_at.into()),
        created_at: Set(movement.created_at.into()),
        updated_at: Set(movement.updated_at.into()),
    }
}
