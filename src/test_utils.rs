//! Shared test utilities for `attendo`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        attendance::{ClockEvent, new_record},
        employee::{NewEmployee, create_employee},
        location::{NewLocation, NewSchedule, create_location, create_schedule},
    },
    entities::{
        AttendanceKind, AttendanceStatus, EmployeeModel, EmployeeRole, LocationModel, attendance,
        salary, work_schedule,
    },
    errors::Result,
};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Latitude of every test location.
pub const LOCATION_LATITUDE: f64 = -6.2;
/// Longitude of every test location.
pub const LOCATION_LONGITUDE: f64 = 106.8;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Wall-clock time, seconds zeroed.
pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Date plus [`time`].
pub fn datetime(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    date(year, month, day).and_time(time(hour, minute))
}

/// Location attributes with sensible defaults.
///
/// # Defaults
/// * radius: 100 m
/// * break: 60 minutes, 2 concurrent
/// * late clock-in penalty: 10 000, late break-out penalty: 5 000
/// * overtime multiplier: 1.5
pub fn test_new_location(name: &str) -> NewLocation {
    NewLocation {
        name: name.to_string(),
        latitude: LOCATION_LATITUDE,
        longitude: LOCATION_LONGITUDE,
        radius_meters: 100.0,
        break_duration_minutes: 60,
        max_break_count: 2,
        late_clock_in_penalty: 10_000,
        late_break_out_penalty: 5_000,
        overtime_multiplier: 1.5,
    }
}

/// Creates a test location with the defaults of [`test_new_location`].
pub async fn create_test_location(db: &DatabaseConnection, name: &str) -> Result<LocationModel> {
    create_location(db, test_new_location(name)).await
}

/// Creates a 09:00-17:00 "Morning" schedule with 15 minutes of tolerance.
pub async fn create_test_schedule(
    db: &DatabaseConnection,
    location_id: i64,
) -> Result<work_schedule::Model> {
    create_schedule(
        db,
        location_id,
        NewSchedule {
            name: "Morning".to_string(),
            start_time: time(9, 0),
            end_time: time(17, 0),
            late_tolerance_minutes: 15,
        },
    )
    .await
}

async fn create_with_role(
    db: &DatabaseConnection,
    location_id: i64,
    schedule_id: Option<i64>,
    username: &str,
    role: EmployeeRole,
) -> Result<EmployeeModel> {
    create_employee(
        db,
        NewEmployee {
            username: username.to_string(),
            name: username.to_uppercase(),
            role,
            location_id,
            schedule_id,
        },
    )
    .await
}

/// Creates a regular employee.
pub async fn create_test_employee(
    db: &DatabaseConnection,
    location_id: i64,
    schedule_id: Option<i64>,
    username: &str,
) -> Result<EmployeeModel> {
    create_with_role(db, location_id, schedule_id, username, EmployeeRole::Employee).await
}

/// Creates an admin. Admin actions are audited.
pub async fn create_test_admin(
    db: &DatabaseConnection,
    location_id: i64,
    username: &str,
) -> Result<EmployeeModel> {
    create_with_role(db, location_id, None, username, EmployeeRole::Admin).await
}

/// Creates an owner. Owner actions are not audited.
pub async fn create_test_owner(
    db: &DatabaseConnection,
    location_id: i64,
    username: &str,
) -> Result<EmployeeModel> {
    create_with_role(db, location_id, None, username, EmployeeRole::Owner).await
}

/// Sets up a complete test environment with a location, its schedule and an
/// employee "budi" on that schedule.
/// Returns (db, location, schedule, employee) for common test scenarios.
pub async fn setup_with_employee() -> Result<(
    DatabaseConnection,
    LocationModel,
    work_schedule::Model,
    EmployeeModel,
)> {
    let db = setup_test_db().await?;
    let location = create_test_location(&db, "Main").await?;
    let schedule = create_test_schedule(&db, location.id).await?;
    let employee = create_test_employee(&db, location.id, Some(schedule.id), "budi").await?;
    Ok((db, location, schedule, employee))
}

/// Inserts a salary record effective from `effective_date`.
pub async fn insert_salary(
    db: &DatabaseConnection,
    employee: &EmployeeModel,
    amount: i64,
    effective_date: NaiveDate,
) -> Result<salary::Model> {
    let salary = salary::ActiveModel {
        employee_id: Set(employee.id),
        location_id: Set(employee.location_id),
        amount: Set(amount),
        effective_date: Set(effective_date),
        created_at: Set(effective_date.and_time(NaiveTime::MIN)),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(salary)
}

/// Inserts a finished DAILY record with an eight hour shift starting at `clock_in`.
pub async fn insert_attendance(
    db: &DatabaseConnection,
    employee: &EmployeeModel,
    status: AttendanceStatus,
    clock_in: NaiveDateTime,
    deduction_amount: i64,
) -> Result<attendance::Model> {
    let mut record = new_record(
        employee.id,
        employee.location_id,
        AttendanceKind::Daily,
        clock_in,
    );
    record.status = Set(status);
    record.clock_in = Set(Some(clock_in));
    record.clock_out = Set(Some(clock_in + Duration::hours(8)));
    record.deduction_amount = Set(deduction_amount);
    Ok(record.insert(db).await?)
}

/// Clock event at the test location's coordinates.
pub fn in_area(timestamp: NaiveDateTime) -> ClockEvent {
    ClockEvent {
        timestamp,
        latitude: LOCATION_LATITUDE,
        longitude: LOCATION_LONGITUDE,
        photo: None,
    }
}

/// Clock event far away from the test location.
pub fn out_of_area(timestamp: NaiveDateTime) -> ClockEvent {
    ClockEvent {
        timestamp,
        latitude: 0.0,
        longitude: 0.0,
        photo: None,
    }
}
