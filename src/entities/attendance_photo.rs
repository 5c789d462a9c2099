//! Attendance photo entity - Selfie captured at clock-in or clock-out.

use super::enums::PhotoDirection;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attendance photo database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance_photos")]
pub struct Model {
    /// Unique identifier for the photo
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning attendance record
    pub attendance_id: i64,
    /// Clock-in or clock-out
    pub direction: PhotoDirection,
    /// Raw image bytes
    pub data: Vec<u8>,
    /// When the photo was stored
    pub created_at: DateTime,
}

/// Defines relationships between AttendancePhoto and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each photo belongs to one attendance record
    #[sea_orm(
        belongs_to = "super::attendance::Entity",
        from = "Column::AttendanceId",
        to = "super::attendance::Column::Id"
    )]
    Attendance,
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
