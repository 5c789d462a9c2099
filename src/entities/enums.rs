//! String-backed enums shared by several entities.
//!
//! Stored as upper-case text so rows stay readable in the raw database.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of presence an attendance record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum AttendanceKind {
    /// Regular shift against the employee's work schedule
    #[sea_orm(string_value = "DAILY")]
    Daily,
    /// Approved overtime window
    #[sea_orm(string_value = "OVERTIME")]
    Overtime,
    /// Approved leave day
    #[sea_orm(string_value = "LEAVE")]
    Leave,
}

/// Outcome recorded on an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum AttendanceStatus {
    /// Placeholder until clock-out, or the final verdict for missed/early shifts
    #[sea_orm(string_value = "ABSENT")]
    Absent,
    /// Clocked in within tolerance and stayed until the end
    #[sea_orm(string_value = "PRESENT")]
    Present,
    /// Clocked in after the tolerance window
    #[sea_orm(string_value = "LATE")]
    Late,
    /// Approved leave
    #[sea_orm(string_value = "LEAVE")]
    Leave,
}

impl AttendanceStatus {
    /// Whether the record counts as a worked shift for payroll.
    #[must_use]
    pub const fn is_worked(self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }
}

/// Decision state of a leave or overtime application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ApprovalStatus {
    /// Awaiting a decision
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Approved by an approver
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    /// Rejected by an approver
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(label)
    }
}

/// Reason category of a leave application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum LeaveType {
    /// Sick leave
    #[sea_orm(string_value = "SICK")]
    Sick,
    /// Personal leave
    #[sea_orm(string_value = "PERSONAL")]
    Personal,
    /// Anything else
    #[sea_orm(string_value = "OTHER")]
    Other,
}

impl LeaveType {
    /// All leave types in display order.
    pub const ALL: [Self; 3] = [Self::Sick, Self::Personal, Self::Other];

    /// Lower-case label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sick => "sick",
            Self::Personal => "personal",
            Self::Other => "other",
        }
    }
}

/// Role of an employee account. Only used to decide whether actions are audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum EmployeeRole {
    /// Owns one or more locations
    #[sea_orm(string_value = "OWNER")]
    Owner,
    /// Manages a location on behalf of the owner
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    /// Regular staff
    #[sea_orm(string_value = "EMPLOYEE")]
    Employee,
}

/// Which photo of an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PhotoDirection {
    /// Taken at clock-in
    #[sea_orm(string_value = "IN")]
    In,
    /// Taken at clock-out
    #[sea_orm(string_value = "OUT")]
    Out,
}
