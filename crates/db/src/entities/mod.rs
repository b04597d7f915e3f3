//! `SeaORM` entity definitions.

pub mod drawer_movements;
pub mod drawer_sessions;
pub mod sea_orm_active_enums;
