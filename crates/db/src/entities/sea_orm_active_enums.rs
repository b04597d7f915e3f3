//! String-backed enums stored in drawer tables.

use caja_core::drawer::types as domain;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum DrawerStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "closed")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum MovementType {
    #[sea_orm(string_value = "inflow")]
    Inflow,
    #[sea_orm(string_value = "outflow")]
    Outflow,
    #[sea_orm(string_value = "adjustment_in")]
    AdjustmentIn,
    #[sea_orm(string_value = "adjustment_out")]
    AdjustmentOut,
}

impl From<domain::DrawerStatus> for DrawerStatus {
    fn from(status: domain::DrawerStatus) -> Self {
        match status {
            domain::DrawerStatus::Open => Self::Open,
            domain::DrawerStatus::Closed => Self::Closed,
        }
    }
}

impl From<DrawerStatus> for domain::DrawerStatus {
    fn from(status: DrawerStatus) -> Self {
        match status {
            DrawerStatus::Open => Self::Open,
            DrawerStatus::Closed => Self::Closed,
        }
    }
}

impl From<domain::MovementType> for MovementType {
    fn from(kind: domain::MovementType) -> Self {
        match kind {
            domain::MovementType::Inflow => Self::Inflow,
            domain::MovementType::Outflow => Self::Outflow,
            domain::MovementType::AdjustmentIn => Self::AdjustmentIn,
            domain::MovementType::AdjustmentOut => Self::AdjustmentOut,
        }
    }
}

impl From<MovementType> for domain::MovementType {
    fn from(kind: MovementType) -> Self {
        match kind {
            MovementType::Inflow => Self::Inflow,
            MovementType::Outflow => Self::Outflow,
            MovementType::AdjustmentIn => Self::AdjustmentIn,
            MovementType::AdjustmentOut => Self::AdjustmentOut,
        }
    }
}
