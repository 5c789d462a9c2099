//! Location entity - A physical workplace with its geofence and break policy.
//!
//! Besides coordinates and radius, a location carries the penalty amounts applied
//! at clock-out and break-out, the overtime multiplier, and the shared break-slot
//! counter (`current_break_count`, always within `[0, max_break_count]`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Location database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    /// Unique identifier for the location
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name
    pub name: String,
    /// Latitude of the geofence centre in degrees
    pub latitude: f64,
    /// Longitude of the geofence centre in degrees
    pub longitude: f64,
    /// Geofence radius in meters
    pub radius_meters: f64,
    /// Allowed break length in minutes
    pub break_duration_minutes: i32,
    /// Maximum number of employees on break at once
    pub max_break_count: i32,
    /// Employees currently on break
    pub current_break_count: i32,
    /// Deduction applied for a late clock-in
    pub late_clock_in_penalty: i64,
    /// Deduction applied for an overlong break
    pub late_break_out_penalty: i64,
    /// Factor applied to the daily salary to price an overtime shift
    pub overtime_multiplier: f64,
    /// Inactive locations are hidden from listings
    pub is_active: bool,
    /// When the location was created
    pub created_at: DateTime,
}

/// Defines relationships between Location and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One location has many work schedules
    #[sea_orm(has_many = "super::work_schedule::Entity")]
    WorkSchedules,
    /// One location has many employees
    #[sea_orm(has_many = "super::employee::Entity")]
    Employees,
    /// One location has many attendance records
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendances,
}

impl Related<super::work_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkSchedules.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
