//! Attendance entity - One shift of one employee at one location.
//!
//! A record is created open (status `ABSENT`, no clock-out) and finalized by
//! clock-out. Leave and overtime records point back at the application that
//! produced them.

use super::enums::{AttendanceKind, AttendanceStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attendance database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendances")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Employee the shift belongs to
    pub employee_id: i64,
    /// Location the shift was worked at
    pub location_id: i64,
    /// Daily, overtime or leave
    pub kind: AttendanceKind,
    /// Current verdict
    pub status: AttendanceStatus,
    /// Clock-in time
    pub clock_in: Option<DateTime>,
    /// Clock-out time, `None` while the shift is open
    pub clock_out: Option<DateTime>,
    /// Start of the break
    pub break_in: Option<DateTime>,
    /// End of the break
    pub break_out: Option<DateTime>,
    /// Accumulated notes, one per line
    pub description: String,
    /// Sum of penalties applied to this shift
    pub deduction_amount: i64,
    /// Minutes late at clock-in plus minutes of break overrun
    pub late_minutes: i64,
    /// Approved leave application that produced this record
    pub leave_application_id: Option<i64>,
    /// Approved overtime application that produced this record
    pub overtime_application_id: Option<i64>,
    /// When the record was created
    pub created_at: DateTime,
    /// Last modification
    pub updated_at: DateTime,
}

impl Model {
    /// Whether a break was started and not yet ended.
    #[must_use]
    pub const fn has_open_break(&self) -> bool {
        self.break_in.is_some() && self.break_out.is_none()
    }
}

/// Defines relationships between Attendance and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each record belongs to one employee
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
    /// Each record belongs to one location
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
    /// A record has at most one photo per direction
    #[sea_orm(has_many = "super::attendance_photo::Entity")]
    Photos,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::attendance_photo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Photos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
