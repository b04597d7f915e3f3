//! `SeaORM` Entity for drawer_sessions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::DrawerStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "drawer_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub branch_id: Uuid,
    pub opened_by: Uuid,
    pub closed_by: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub opening_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub closing_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub variance: Decimal,
    pub status: DrawerStatus,
    pub opened_at: DateTimeWithTimeZone,
    pub closed_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub opening_notes: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub closing_notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::drawer_movements::Entity")]
    DrawerMovements,
}

impl Related<super::drawer_movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DrawerMovements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
