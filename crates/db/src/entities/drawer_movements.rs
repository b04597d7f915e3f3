//! `SeaORM` Entity for drawer_movements table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::MovementType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "drawer_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub branch_id: Uuid,
    pub session_id: Uuid,
    pub movement_type: MovementType,
    pub category: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub payment_id: Option<Uuid>,
    pub effective_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::drawer_sessions::Entity",
        from = "Column::SessionId",
        to = "super::drawer_sessions::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    DrawerSessions,
}

impl Related<super::drawer_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DrawerSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
