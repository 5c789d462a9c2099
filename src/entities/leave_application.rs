//! Leave application entity - Request for a range of days off.

use super::enums::{ApprovalStatus, LeaveType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Leave application database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "leave_applications")]
pub struct Model {
    /// Unique identifier for the application
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Applicant
    pub employee_id: i64,
    /// Location of the applicant
    pub location_id: i64,
    /// Employee who decided, if decided
    pub approver_id: Option<i64>,
    /// Decision state
    pub status: ApprovalStatus,
    /// Sick, personal or other
    pub leave_type: LeaveType,
    /// First day off, inclusive
    pub start_date: Date,
    /// Last day off, inclusive
    pub end_date: Date,
    /// Reason given by the applicant
    pub description: String,
    /// When the application was submitted
    pub created_at: DateTime,
    /// Last modification
    pub updated_at: DateTime,
}

impl Model {
    /// Number of calendar days covered, both ends included.
    #[must_use]
    pub fn day_count(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Defines relationships between LeaveApplication and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each application belongs to one employee
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
