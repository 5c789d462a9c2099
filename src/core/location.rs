//! Location business logic - Workplaces and their work schedules.
//!
//! Provides creation and lookup of locations and schedules. Lookups that an
//! operation cannot proceed without go through the `find_*` helpers, which turn a
//! missing row into [`Error::NotFound`].

use crate::{
    entities::{Location, WorkSchedule, location, work_schedule},
    errors::{Error, Result},
};
use chrono::{NaiveTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Attributes of a new location.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewLocation {
    /// Display name
    pub name: String,
    /// Geofence centre latitude
    pub latitude: f64,
    /// Geofence centre longitude
    pub longitude: f64,
    /// Geofence radius in meters
    pub radius_meters: f64,
    /// Allowed break length in minutes
    pub break_duration_minutes: i32,
    /// Concurrent break capacity
    pub max_break_count: i32,
    /// Deduction for a late clock-in
    pub late_clock_in_penalty: i64,
    /// Deduction for an overlong break
    pub late_break_out_penalty: i64,
    /// Overtime pay factor applied to the daily salary
    pub overtime_multiplier: f64,
}

/// Attributes of a new work schedule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewSchedule {
    /// Display name
    pub name: String,
    /// Shift start
    pub start_time: NaiveTime,
    /// Shift end, after `start_time`
    pub end_time: NaiveTime,
    /// Grace minutes after the start
    pub late_tolerance_minutes: i32,
}

/// Creates a location with an empty break counter.
#[instrument(skip(db, new), fields(name = %new.name))]
pub async fn create_location(db: &DatabaseConnection, new: NewLocation) -> Result<location::Model> {
    if new.name.trim().is_empty() {
        return Err(Error::Config {
            message: "Location name cannot be empty".to_string(),
        });
    }
    crate::core::geofence::validate_coordinates(new.latitude, new.longitude)?;
    if !(new.radius_meters.is_finite() && new.radius_meters >= 0.0) {
        return Err(Error::Config {
            message: format!("Invalid geofence radius: {}", new.radius_meters),
        });
    }
    if new.max_break_count < 0 || new.break_duration_minutes < 0 {
        return Err(Error::Config {
            message: "Break duration and capacity must not be negative".to_string(),
        });
    }
    for amount in [new.late_clock_in_penalty, new.late_break_out_penalty] {
        if amount < 0 {
            return Err(Error::InvalidAmount { amount });
        }
    }

    let location = location::ActiveModel {
        name: Set(new.name.trim().to_string()),
        latitude: Set(new.latitude),
        longitude: Set(new.longitude),
        radius_meters: Set(new.radius_meters),
        break_duration_minutes: Set(new.break_duration_minutes),
        max_break_count: Set(new.max_break_count),
        current_break_count: Set(0),
        late_clock_in_penalty: Set(new.late_clock_in_penalty),
        late_break_out_penalty: Set(new.late_break_out_penalty),
        overtime_multiplier: Set(new.overtime_multiplier),
        is_active: Set(true),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    let result = location.insert(db).await?;
    info!(location_id = result.id, "location created");
    Ok(result)
}

/// Finds a location by id.
pub async fn get_location_by_id(
    db: &DatabaseConnection,
    location_id: i64,
) -> Result<Option<location::Model>> {
    Location::find_by_id(location_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an active location by its exact name.
pub async fn get_location_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<location::Model>> {
    Location::find()
        .filter(location::Column::Name.eq(name))
        .filter(location::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all active locations, ordered alphabetically by name.
pub async fn get_active_locations(db: &DatabaseConnection) -> Result<Vec<location::Model>> {
    Location::find()
        .filter(location::Column::IsActive.eq(true))
        .order_by_asc(location::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

pub(crate) async fn find_location<C>(db: &C, location_id: i64) -> Result<location::Model>
where
    C: ConnectionTrait,
{
    Location::find_by_id(location_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Location", location_id))
}

/// Creates a work schedule for a location.
///
/// Fails with [`Error::InvalidDateRange`] unless the end is after the start.
#[instrument(skip(db, new), fields(name = %new.name))]
pub async fn create_schedule(
    db: &DatabaseConnection,
    location_id: i64,
    new: NewSchedule,
) -> Result<work_schedule::Model> {
    if new.end_time <= new.start_time {
        return Err(Error::InvalidDateRange {
            start: new.start_time.to_string(),
            end: new.end_time.to_string(),
        });
    }
    if new.late_tolerance_minutes < 0 {
        return Err(Error::Config {
            message: "Late tolerance must not be negative".to_string(),
        });
    }
    find_location(db, location_id).await?;

    let schedule = work_schedule::ActiveModel {
        location_id: Set(location_id),
        name: Set(new.name.trim().to_string()),
        start_time: Set(new.start_time),
        end_time: Set(new.end_time),
        late_tolerance_minutes: Set(new.late_tolerance_minutes),
        ..Default::default()
    };

    let result = schedule.insert(db).await?;
    info!(schedule_id = result.id, location_id, "schedule created");
    Ok(result)
}

/// Finds a work schedule by id.
pub async fn get_schedule_by_id(
    db: &DatabaseConnection,
    schedule_id: i64,
) -> Result<Option<work_schedule::Model>> {
    WorkSchedule::find_by_id(schedule_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists a location's schedules ordered by start time.
pub async fn get_schedules_for_location(
    db: &DatabaseConnection,
    location_id: i64,
) -> Result<Vec<work_schedule::Model>> {
    WorkSchedule::find()
        .filter(work_schedule::Column::LocationId.eq(location_id))
        .order_by_asc(work_schedule::Column::StartTime)
        .all(db)
        .await
        .map_err(Into::into)
}

pub(crate) async fn find_schedule<C>(db: &C, schedule_id: i64) -> Result<work_schedule::Model>
where
    C: ConnectionTrait,
{
    WorkSchedule::find_by_id(schedule_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("WorkSchedule", schedule_id))
}
