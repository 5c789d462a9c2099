//! Work schedule entity - A named shift window with a late tolerance.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Work schedule database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_schedules")]
pub struct Model {
    /// Unique identifier for the schedule
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Location this schedule belongs to
    pub location_id: i64,
    /// Display name (e.g., "Morning")
    pub name: String,
    /// Shift start
    pub start_time: Time,
    /// Shift end
    pub end_time: Time,
    /// Grace minutes after `start_time` before a clock-in counts as late
    pub late_tolerance_minutes: i32,
}

/// Defines relationships between WorkSchedule and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each schedule belongs to one location
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
