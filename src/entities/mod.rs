//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod activity_log;
pub mod attendance;
pub mod attendance_photo;
pub mod employee;
pub mod enums;
pub mod leave_application;
pub mod loan;
pub mod location;
pub mod overtime_application;
pub mod salary;
pub mod work_schedule;

// Re-export specific types to avoid conflicts
pub use activity_log::{
    Column as ActivityLogColumn, Entity as ActivityLog, Model as ActivityLogModel,
};
pub use attendance::{Column as AttendanceColumn, Entity as Attendance, Model as AttendanceModel};
pub use attendance_photo::{
    Column as AttendancePhotoColumn, Entity as AttendancePhoto, Model as AttendancePhotoModel,
};
pub use employee::{Column as EmployeeColumn, Entity as Employee, Model as EmployeeModel};
pub use enums::{
    ApprovalStatus, AttendanceKind, AttendanceStatus, EmployeeRole, LeaveType, PhotoDirection,
};
pub use leave_application::{
    Column as LeaveApplicationColumn, Entity as LeaveApplication, Model as LeaveApplicationModel,
};
pub use loan::{Column as LoanColumn, Entity as Loan, Model as LoanModel};
pub use location::{Column as LocationColumn, Entity as Location, Model as LocationModel};
pub use overtime_application::{
    Column as OvertimeApplicationColumn, Entity as OvertimeApplication,
    Model as OvertimeApplicationModel,
};
pub use salary::{Column as SalaryColumn, Entity as Salary, Model as SalaryModel};
pub use work_schedule::{
    Column as WorkScheduleColumn, Entity as WorkSchedule, Model as WorkScheduleModel,
};
