//! Core business logic - framework-agnostic attendance, payroll and reporting operations.
//!
//! Every operation takes a SeaORM connection and returns [`crate::errors::Result`].
//! Multi-row writes run in a single transaction.

pub mod activity_log;
pub mod analytics;
pub mod approval;
pub mod attendance;
pub mod break_slot;
pub mod calendar;
pub mod employee;
pub mod geofence;
pub mod leave;
pub mod loan;
pub mod location;
pub mod overtime;
pub mod payroll;
pub mod salary;
pub mod shift;
