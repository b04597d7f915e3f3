//! Drawer ledger migration.
//!
//! Creates the drawer session and movement tables, the one-open-drawer-per-branch
//! index, and the triggers that keep movements append-only and closed sessions
//! immutable.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: TABLES
        // ============================================================
        db.execute_unprepared(DRAWER_SESSIONS_SQL).await?;
        db.execute_unprepared(DRAWER_MOVEMENTS_SQL).await?;

        // ============================================================
        // PART 2: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const DRAWER_SESSIONS_SQL: &str = r"
-- One cash register opening-to-closing period per row
CREATE TABLE drawer_sessions (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    branch_id UUID NOT NULL,
    opened_by UUID NOT NULL,
    closed_by UUID,
    opening_amount NUMERIC(14, 2) NOT NULL,
    closing_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    variance NUMERIC(14, 2) NOT NULL DEFAULT 0,
    status VARCHAR(16) NOT NULL DEFAULT 'open',
    opened_at TIMESTAMPTZ NOT NULL,
    closed_at TIMESTAMPTZ,
    opening_notes TEXT,
    closing_notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_drawer_status CHECK (status IN ('open', 'closed')),
    CONSTRAINT chk_drawer_opening_amount CHECK (opening_amount >= 0),
    CONSTRAINT chk_drawer_closing_amount CHECK (closing_amount >= 0),
    CONSTRAINT chk_drawer_closed_at CHECK ((status = 'closed') = (closed_at IS NOT NULL)),
    CONSTRAINT chk_drawer_closed_by CHECK (status = 'open' OR closed_by IS NOT NULL)
);

-- At most one open drawer per branch
CREATE UNIQUE INDEX uq_drawer_sessions_open_branch
    ON drawer_sessions(company_id, branch_id) WHERE status = 'open';

-- Listing by company or branch, newest first
CREATE INDEX idx_drawer_sessions_company ON drawer_sessions(company_id, opened_at DESC);
CREATE INDEX idx_drawer_sessions_branch ON drawer_sessions(branch_id, opened_at DESC);
";

const DRAWER_MOVEMENTS_SQL: &str = r"
-- Append-only ledger entries against a drawer session
CREATE TABLE drawer_movements (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    branch_id UUID NOT NULL,
    session_id UUID NOT NULL REFERENCES drawer_sessions(id) ON DELETE RESTRICT,
    movement_type VARCHAR(16) NOT NULL,
    category VARCHAR(100),
    amount NUMERIC(14, 2) NOT NULL,
    description TEXT,
    payment_id UUID,
    effective_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_movement_type CHECK (
        movement_type IN ('inflow', 'outflow', 'adjustment_in', 'adjustment_out')
    ),
    CONSTRAINT chk_movement_amount CHECK (amount >= 0)
);

CREATE INDEX idx_drawer_movements_session ON drawer_movements(session_id, effective_at, created_at);
CREATE INDEX idx_drawer_movements_payment ON drawer_movements(payment_id)
    WHERE payment_id IS NOT NULL;
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_drawer_movement_mutation
-- Movements are never updated or deleted
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_drawer_movement_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Drawer movements are append-only. Record an adjustment instead.';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_drawer_movements_append_only
BEFORE UPDATE OR DELETE ON drawer_movements
FOR EACH ROW
EXECUTE FUNCTION prevent_drawer_movement_mutation();

-- ============================================================
-- FUNCTION: prevent_closed_drawer_modification
-- Closed sessions are terminal
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_closed_drawer_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF TG_OP = 'DELETE' THEN
        RAISE EXCEPTION 'Drawer sessions are never deleted.';
    END IF;

    IF OLD.status = 'closed' THEN
        RAISE EXCEPTION 'Cannot modify closed drawer %', OLD.id;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_drawer_sessions_closed_immutable
BEFORE UPDATE OR DELETE ON drawer_sessions
FOR EACH ROW
EXECUTE FUNCTION prevent_closed_drawer_modification();

-- ============================================================
-- FUNCTION: check_drawer_movement_session_open
-- Movements may only be added to an open session of the same scope
-- ============================================================
CREATE OR REPLACE FUNCTION check_drawer_movement_session_open()
RETURNS TRIGGER AS $$
DECLARE
    session_row drawer_sessions%ROWTYPE;
BEGIN
    SELECT * INTO session_row FROM drawer_sessions WHERE id = NEW.session_id;

    IF session_row.status <> 'open' THEN
        RAISE EXCEPTION 'Drawer % is not open', NEW.session_id;
    END IF;

    IF session_row.company_id <> NEW.company_id OR session_row.branch_id <> NEW.branch_id THEN
        RAISE EXCEPTION 'Movement scope does not match drawer %', NEW.session_id;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_drawer_movements_session_open
BEFORE INSERT ON drawer_movements
FOR EACH ROW
EXECUTE FUNCTION check_drawer_movement_session_open();
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS drawer_movements CASCADE;
DROP TABLE IF EXISTS drawer_sessions CASCADE;
DROP FUNCTION IF EXISTS prevent_drawer_movement_mutation();
DROP FUNCTION IF EXISTS prevent_closed_drawer_modification();
DROP FUNCTION IF EXISTS check_drawer_movement_session_open();
";
