//! Employee entity - A person who clocks in at one location.
//!
//! The schedule reference is optional: new hires may exist before a shift is
//! assigned, but daily clock-out and leave approval require one.

use super::enums::EmployeeRole;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Employee database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    /// Unique identifier for the employee
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name
    #[sea_orm(unique)]
    pub username: String,
    /// Display name used in notes
    pub name: String,
    /// Account role
    pub role: EmployeeRole,
    /// Current location
    pub location_id: i64,
    /// Assigned work schedule, if any
    pub schedule_id: Option<i64>,
    /// Deactivated employees cannot be looked up as actors
    pub is_active: bool,
    /// When the employee was created
    pub created_at: DateTime,
}

/// Defines relationships between Employee and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each employee works at one location
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
    /// Each employee follows at most one schedule
    #[sea_orm(
        belongs_to = "super::work_schedule::Entity",
        from = "Column::ScheduleId",
        to = "super::work_schedule::Column::Id"
    )]
    WorkSchedule,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::work_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkSchedule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
