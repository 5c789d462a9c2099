//! Unified error type for the attendance and payroll engine.
//!
//! Every variant belongs to one of three kinds (see [`ErrorKind`]): a referenced
//! entity is missing, a request was rejected before anything was written, or the
//! storage layer failed while applying a change.

use chrono::NaiveDate;
use thiserror::Error;

/// Coarse classification used by callers to decide how to react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced entity does not exist. Terminal.
    NotFound,
    /// The request was rejected before any mutation. User-correctable.
    Validation,
    /// Storage or environment failure while applying. The caller may resubmit.
    Infrastructure,
}

/// Application error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Referenced entity is absent
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity type name, e.g. `"Attendance"`
        entity: &'static str,
        /// Identifier that was looked up
        id: i64,
    },

    /// No salary record is effective for the employee at the requested date
    #[error("No salary defined for employee {employee_id} as of {as_of}")]
    SalaryUndefined {
        /// Employee whose salary history was searched
        employee_id: i64,
        /// Date the salary was resolved against
        as_of: NaiveDate,
    },

    /// Position is outside the location geofence
    #[error("Position is outside the allowed area ({distance_meters:.1} m from location, radius {radius_meters:.1} m)")]
    OutOfArea {
        /// Great-circle distance to the location
        distance_meters: f64,
        /// Allowed radius
        radius_meters: f64,
    },

    /// Latitude or longitude outside the valid range
    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates {
        /// Supplied latitude
        latitude: f64,
        /// Supplied longitude
        longitude: f64,
    },

    /// Every break slot of the location is taken
    #[error("Break limit reached at location {location_id} ({max_break_count} concurrent breaks). Wait until another employee returns")]
    BreakLimitReached {
        /// Location whose capacity is exhausted
        location_id: i64,
        /// Configured capacity
        max_break_count: i32,
    },

    /// The record already used its break
    #[error("Attendance {attendance_id} already has a break recorded")]
    BreakAlreadyTaken {
        /// Attendance record id
        attendance_id: i64,
    },

    /// Break-out without an open break
    #[error("Attendance {attendance_id} has no open break")]
    NoOpenBreak {
        /// Attendance record id
        attendance_id: i64,
    },

    /// Operation requires a clock-in first
    #[error("Attendance {attendance_id} has not been clocked in")]
    NotClockedIn {
        /// Attendance record id
        attendance_id: i64,
    },

    /// Record already went through its finalizing transition
    #[error("Attendance {attendance_id} is already finalized")]
    AlreadyFinalized {
        /// Attendance record id
        attendance_id: i64,
    },

    /// A loan was already issued to this employee today
    #[error("Employee {employee_id} already received a loan on {date}; loans can be issued once a day")]
    LoanAlreadyIssuedToday {
        /// Borrowing employee
        employee_id: i64,
        /// Day of the existing loan
        date: NaiveDate,
    },

    /// Requested loan is above the current net salary
    #[error("Loan of {requested} exceeds the available salary of {available}")]
    LoanExceedsSalary {
        /// Requested amount
        requested: i64,
        /// Net salary accrued so far
        available: i64,
    },

    /// Amount must be strictly positive
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// Application was already approved or rejected
    #[error("{entity} {id} is {status}; only PENDING applications can be changed")]
    ApplicationNotPending {
        /// `"LeaveApplication"` or `"OvertimeApplication"`
        entity: &'static str,
        /// Application id
        id: i64,
        /// Current status
        status: String,
    },

    /// Start is after end
    #[error("Invalid range: {start} is after {end}")]
    InvalidDateRange {
        /// Range start
        start: String,
        /// Range end
        end: String,
    },

    /// Employee has no work schedule to evaluate against
    #[error("Employee {employee_id} has no work schedule assigned")]
    ScheduleNotAssigned {
        /// Employee id
        employee_id: i64,
    },

    /// Month outside 1-12 or a year chrono cannot represent
    #[error("Invalid month: {month}/{year}")]
    InvalidMonth {
        /// Requested month
        month: u32,
        /// Requested year
        year: i32,
    },

    /// Reporting window must cover at least one month
    #[error("Invalid reporting period: {months} months")]
    InvalidPeriod {
        /// Requested number of months
        months: u32,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Classifies the error into the not-found / validation / infrastructure taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } | Self::SalaryUndefined { .. } => ErrorKind::NotFound,
            Self::OutOfArea { .. }
            | Self::InvalidCoordinates { .. }
            | Self::BreakLimitReached { .. }
            | Self::BreakAlreadyTaken { .. }
            | Self::NoOpenBreak { .. }
            | Self::NotClockedIn { .. }
            | Self::AlreadyFinalized { .. }
            | Self::LoanAlreadyIssuedToday { .. }
            | Self::LoanExceedsSalary { .. }
            | Self::InvalidAmount { .. }
            | Self::ApplicationNotPending { .. }
            | Self::InvalidDateRange { .. }
            | Self::InvalidMonth { .. }
            | Self::ScheduleNotAssigned { .. }
            | Self::InvalidPeriod { .. } => ErrorKind::Validation,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::EnvVar(_) => {
                ErrorKind::Infrastructure
            }
        }
    }

    /// Shorthand for [`Error::NotFound`].
    #[must_use]
    pub const fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
