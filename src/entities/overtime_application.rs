//! Overtime application entity - Request to work an extra window on a given day.
//!
//! `overtime_pay` is priced at approval time from the salary effective on
//! `overtime_date` and the location multiplier.

use super::enums::ApprovalStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Overtime application database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "overtime_applications")]
pub struct Model {
    /// Unique identifier for the application
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Applicant
    pub employee_id: i64,
    /// Location the overtime is worked at
    pub location_id: i64,
    /// Employee who decided, if decided
    pub approver_id: Option<i64>,
    /// Decision state
    pub status: ApprovalStatus,
    /// Day of the overtime
    pub overtime_date: Date,
    /// Window start
    pub start_time: Time,
    /// Window end
    pub end_time: Time,
    /// Grace minutes after `start_time`
    pub late_tolerance_minutes: i32,
    /// Pay granted on approval, 0 until then
    pub overtime_pay: i64,
    /// Reason given by the applicant
    pub description: String,
    /// When the application was submitted
    pub created_at: DateTime,
    /// Last modification
    pub updated_at: DateTime,
}

/// Defines relationships between OvertimeApplication and other entities
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
