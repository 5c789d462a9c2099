//! Attendance business logic - The clock-in / break / clock-out lifecycle.
//!
//! A daily record is opened by [`clock_in`] with a placeholder `ABSENT` status and
//! judged once, at [`clock_out`]. Overtime records are pre-created when an overtime
//! application is approved and opened by [`overtime_clock_in`]; from there they
//! follow the same path. Leave records are created finalized.
//!
//! Every transition that touches more than one row (clock-out with an implicit break
//! close, break-in/out with the location's break counter, removal) runs in a single
//! transaction, and the record update itself is guarded by the state it expects, so
//! a concurrent duplicate request fails instead of applying twice.

use crate::{
    core::{
        activity_log::{AuditAction, record_if_admin},
        break_slot,
        calendar::{MonthRange, day_bounds},
        employee::{find_active_actor, find_employee},
        geofence::ensure_within_area,
        location::{find_location, find_schedule},
        shift::{ShiftOutcome, ShiftWindow, append_note, break_overrun, evaluate_shift},
    },
    entities::{
        ApprovalStatus, Attendance, AttendanceKind, AttendancePhoto, AttendanceStatus,
        OvertimeApplication, PhotoDirection, attendance, attendance_photo, overtime_application,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// A clocking request: when and where it happened, with the selfie if one was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockEvent {
    /// Client-supplied time of the event
    pub timestamp: NaiveDateTime,
    /// Reported latitude
    pub latitude: f64,
    /// Reported longitude
    pub longitude: f64,
    /// Raw photo bytes
    pub photo: Option<Vec<u8>>,
}

/// Opens a daily attendance record for the employee.
///
/// Fails with [`Error::OutOfArea`] when the position is outside the employee's
/// location. Nothing is written in that case.
#[instrument(skip(db, event), fields(timestamp = %event.timestamp))]
pub async fn clock_in(
    db: &DatabaseConnection,
    employee_id: i64,
    event: ClockEvent,
) -> Result<attendance::Model> {
    let employee = find_employee(db, employee_id).await?;
    let location = find_location(db, employee.location_id).await?;
    ensure_within_area(&location, event.latitude, event.longitude)?;

    let txn = db.begin().await?;
    let mut record = new_record(employee.id, location.id, AttendanceKind::Daily, event.timestamp);
    record.clock_in = Set(Some(event.timestamp));
    let record = record.insert(&txn).await?;
    if let Some(photo) = event.photo {
        store_photo(&txn, record.id, PhotoDirection::In, photo, event.timestamp).await?;
    }
    txn.commit().await?;

    info!(attendance_id = record.id, employee_id, "clocked in");
    Ok(record)
}

/// Sets the clock-in of an overtime record created by an approved application.
///
/// Fails with [`Error::AlreadyFinalized`] when the record was already clocked out.
#[instrument(skip(db, event), fields(timestamp = %event.timestamp))]
pub async fn overtime_clock_in(
    db: &DatabaseConnection,
    attendance_id: i64,
    event: ClockEvent,
) -> Result<attendance::Model> {
    let record = find_attendance(db, attendance_id).await?;
    if record.kind != AttendanceKind::Overtime {
        return Err(Error::not_found("OvertimeAttendance", attendance_id));
    }
    if record.clock_out.is_some() {
        return Err(Error::AlreadyFinalized { attendance_id });
    }
    let location = find_location(db, record.location_id).await?;
    ensure_within_area(&location, event.latitude, event.longitude)?;

    let txn = db.begin().await?;
    let changes = attendance::ActiveModel {
        clock_in: Set(Some(event.timestamp)),
        updated_at: Set(event.timestamp),
        ..Default::default()
    };
    let result = Attendance::update_many()
        .set(changes)
        .filter(attendance::Column::Id.eq(attendance_id))
        .filter(attendance::Column::ClockOut.is_null())
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::AlreadyFinalized { attendance_id });
    }
    if let Some(photo) = event.photo {
        store_photo(&txn, attendance_id, PhotoDirection::In, photo, event.timestamp).await?;
    }
    let updated = find_attendance(&txn, attendance_id).await?;
    txn.commit().await?;

    info!(attendance_id, "overtime clocked in");
    Ok(updated)
}

/// Finalizes a daily or overtime record.
///
/// The shift is judged against the employee's work schedule (daily) or the window
/// copied onto the overtime application (overtime), in this order: clocked in after
/// the shift ended, clocked out early, late, present. The verdict sets the record's
/// deduction and late minutes, replacing penalties from an earlier break. A break
/// still open is closed at the clock-out time, its overrun charged on top of the
/// verdict, and its slot released. Either everything is written or nothing is.
#[instrument(skip(db, event), fields(timestamp = %event.timestamp))]
pub async fn clock_out(
    db: &DatabaseConnection,
    attendance_id: i64,
    event: ClockEvent,
) -> Result<attendance::Model> {
    let txn = db.begin().await?;
    let record = find_attendance(&txn, attendance_id).await?;
    if record.clock_out.is_some() || record.kind == AttendanceKind::Leave {
        return Err(Error::AlreadyFinalized { attendance_id });
    }
    let clocked_in = record
        .clock_in
        .ok_or(Error::NotClockedIn { attendance_id })?;
    let location = find_location(&txn, record.location_id).await?;
    ensure_within_area(&location, event.latitude, event.longitude)?;
    let window = shift_window(&txn, &record).await?;

    let clocked_out = event.timestamp;
    let mut description = record.description.clone();

    let (status, mut deduction, mut late_minutes) =
        match evaluate_shift(clocked_in, clocked_out, &window) {
            ShiftOutcome::AbsentAfterShiftEnd => {
                append_note(&mut description, "Absent");
                (AttendanceStatus::Absent, 0, 0)
            }
            ShiftOutcome::EarlyClockOut => {
                append_note(&mut description, "Early clock-out");
                (AttendanceStatus::Absent, 0, 0)
            }
            ShiftOutcome::Late {
                late_minutes,
                minutes_after_start,
            } => {
                append_note(
                    &mut description,
                    &format!("Late by {minutes_after_start} minutes"),
                );
                (AttendanceStatus::Late, location.late_clock_in_penalty, late_minutes)
            }
            ShiftOutcome::Present => (AttendanceStatus::Present, 0, 0),
        };

    let mut break_out = record.break_out;
    if let (Some(break_in), None) = (record.break_in, record.break_out) {
        break_out = Some(clocked_out);
        if let Some(overrun) = break_overrun(
            break_in,
            clocked_out,
            location.break_duration_minutes,
            window.late_tolerance_minutes,
        ) {
            deduction += location.late_break_out_penalty;
            late_minutes += overrun;
            append_note(&mut description, &break_note(location.break_duration_minutes, overrun));
        }
        break_slot::release(&txn, location.id).await?;
    }

    let changes = attendance::ActiveModel {
        status: Set(status),
        clock_out: Set(Some(clocked_out)),
        break_out: Set(break_out),
        description: Set(description),
        deduction_amount: Set(deduction),
        late_minutes: Set(late_minutes),
        updated_at: Set(clocked_out),
        ..Default::default()
    };
    let result = Attendance::update_many()
        .set(changes)
        .filter(attendance::Column::Id.eq(attendance_id))
        .filter(attendance::Column::ClockOut.is_null())
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::AlreadyFinalized { attendance_id });
    }
    if let Some(photo) = event.photo {
        store_photo(&txn, attendance_id, PhotoDirection::Out, photo, clocked_out).await?;
    }
    let updated = find_attendance(&txn, attendance_id).await?;
    txn.commit().await?;

    info!(attendance_id, status = ?updated.status, deduction, "clocked out");
    Ok(updated)
}

/// Starts the record's break, taking one of the location's break slots.
///
/// Fails with [`Error::BreakLimitReached`] when no slot is free and with
/// [`Error::BreakAlreadyTaken`] when the record already has a break.
#[instrument(skip(db))]
pub async fn break_in(
    db: &DatabaseConnection,
    attendance_id: i64,
    timestamp: NaiveDateTime,
) -> Result<attendance::Model> {
    let txn = db.begin().await?;
    let record = find_attendance(&txn, attendance_id).await?;
    if record.clock_out.is_some() {
        return Err(Error::AlreadyFinalized { attendance_id });
    }
    if record.clock_in.is_none() {
        return Err(Error::NotClockedIn { attendance_id });
    }
    if record.break_in.is_some() {
        return Err(Error::BreakAlreadyTaken { attendance_id });
    }

    break_slot::acquire(&txn, record.location_id).await?;

    let changes = attendance::ActiveModel {
        break_in: Set(Some(timestamp)),
        updated_at: Set(timestamp),
        ..Default::default()
    };
    let result = Attendance::update_many()
        .set(changes)
        .filter(attendance::Column::Id.eq(attendance_id))
        .filter(attendance::Column::BreakIn.is_null())
        .filter(attendance::Column::ClockOut.is_null())
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::BreakAlreadyTaken { attendance_id });
    }
    let updated = find_attendance(&txn, attendance_id).await?;
    txn.commit().await?;

    info!(attendance_id, location_id = updated.location_id, "break started");
    Ok(updated)
}

/// Ends the record's open break and frees its slot.
///
/// A break longer than the location's allowance plus the shift tolerance adds the
/// late break-out penalty and the minutes beyond the allowance.
#[instrument(skip(db))]
pub async fn break_out(
    db: &DatabaseConnection,
    attendance_id: i64,
    timestamp: NaiveDateTime,
) -> Result<attendance::Model> {
    let txn = db.begin().await?;
    let record = find_attendance(&txn, attendance_id).await?;
    let (Some(started), None) = (record.break_in, record.break_out) else {
        return Err(Error::NoOpenBreak { attendance_id });
    };
    let location = find_location(&txn, record.location_id).await?;
    let tolerance = break_tolerance(&txn, &record).await?;

    let mut description = record.description.clone();
    let mut deduction = record.deduction_amount;
    let mut late_minutes = record.late_minutes;
    if let Some(overrun) =
        break_overrun(started, timestamp, location.break_duration_minutes, tolerance)
    {
        deduction += location.late_break_out_penalty;
        late_minutes += overrun;
        append_note(&mut description, &break_note(location.break_duration_minutes, overrun));
    }

    let changes = attendance::ActiveModel {
        break_out: Set(Some(timestamp)),
        description: Set(description),
        deduction_amount: Set(deduction),
        late_minutes: Set(late_minutes),
        updated_at: Set(timestamp),
        ..Default::default()
    };
    let result = Attendance::update_many()
        .set(changes)
        .filter(attendance::Column::Id.eq(attendance_id))
        .filter(attendance::Column::BreakIn.is_not_null())
        .filter(attendance::Column::BreakOut.is_null())
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::NoOpenBreak { attendance_id });
    }
    break_slot::release(&txn, location.id).await?;
    let updated = find_attendance(&txn, attendance_id).await?;
    txn.commit().await?;

    info!(attendance_id, deduction, "break ended");
    Ok(updated)
}

/// Administrative override of a record's status, deduction and description.
#[instrument(skip(db, description))]
pub async fn update_status(
    db: &DatabaseConnection,
    actor_id: i64,
    attendance_id: i64,
    status: AttendanceStatus,
    deduction_amount: i64,
    description: String,
    updated_at: NaiveDateTime,
) -> Result<attendance::Model> {
    if deduction_amount < 0 {
        return Err(Error::InvalidAmount {
            amount: deduction_amount,
        });
    }
    let actor = find_active_actor(db, actor_id).await?;
    let record = find_attendance(db, attendance_id).await?;
    let employee = find_employee(db, record.employee_id).await?;
    let day = record_day(&record);

    let mut active: attendance::ActiveModel = record.into();
    active.status = Set(status);
    active.deduction_amount = Set(deduction_amount);
    active.description = Set(description);
    active.updated_at = Set(updated_at);
    let updated = active.update(db).await?;
    info!(attendance_id, ?status, "attendance overridden");

    let audit = format!(
        "{} updated the attendance of {} on {day}",
        actor.username, employee.username
    );
    record_if_admin(
        db,
        &actor,
        AuditAction::Update,
        "Update Attendance",
        "Attendance",
        &audit,
        updated_at,
    )
    .await;

    Ok(updated)
}

/// Deletes a record and its photos. A break still open on it gives its slot back.
#[instrument(skip(db))]
pub async fn remove_record(
    db: &DatabaseConnection,
    actor_id: i64,
    attendance_id: i64,
    removed_at: NaiveDateTime,
) -> Result<()> {
    let actor = find_active_actor(db, actor_id).await?;

    let txn = db.begin().await?;
    let record = find_attendance(&txn, attendance_id).await?;
    let employee = find_employee(&txn, record.employee_id).await?;
    if record.has_open_break() {
        break_slot::release(&txn, record.location_id).await?;
    }
    AttendancePhoto::delete_many()
        .filter(attendance_photo::Column::AttendanceId.eq(attendance_id))
        .exec(&txn)
        .await?;
    Attendance::delete_by_id(attendance_id).exec(&txn).await?;
    txn.commit().await?;
    warn!(attendance_id, actor_id, "attendance removed");

    let audit = format!(
        "{} removed the attendance of {} on {}",
        actor.username,
        employee.username,
        record_day(&record)
    );
    record_if_admin(
        db,
        &actor,
        AuditAction::Delete,
        "Remove Attendance",
        "Attendance",
        &audit,
        removed_at,
    )
    .await;

    Ok(())
}

/// Finds an attendance record by id.
pub async fn get_attendance_by_id(
    db: &DatabaseConnection,
    attendance_id: i64,
) -> Result<Option<attendance::Model>> {
    Attendance::find_by_id(attendance_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// An employee's records clocked in during a month, oldest first.
pub async fn get_attendance_for_month(
    db: &DatabaseConnection,
    employee_id: i64,
    month: u32,
    year: i32,
) -> Result<Vec<attendance::Model>> {
    let range = MonthRange::new(month, year)?;

    Attendance::find()
        .filter(attendance::Column::EmployeeId.eq(employee_id))
        .filter(attendance::Column::ClockIn.gte(range.start))
        .filter(attendance::Column::ClockIn.lt(range.end))
        .order_by_asc(attendance::Column::ClockIn)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The employee's daily or leave record clocked in on `today`, latest first.
pub async fn get_today_daily_attendance(
    db: &DatabaseConnection,
    employee_id: i64,
    today: NaiveDate,
) -> Result<Option<attendance::Model>> {
    let (start, end) = day_bounds(today);

    Attendance::find()
        .filter(attendance::Column::EmployeeId.eq(employee_id))
        .filter(attendance::Column::Kind.is_in([AttendanceKind::Daily, AttendanceKind::Leave]))
        .filter(attendance::Column::ClockIn.gte(start))
        .filter(attendance::Column::ClockIn.lt(end))
        .order_by_desc(attendance::Column::ClockIn)
        .one(db)
        .await
        .map_err(Into::into)
}

/// The employee's overtime record whose approved application is dated `today`.
pub async fn get_today_overtime_attendance(
    db: &DatabaseConnection,
    employee_id: i64,
    today: NaiveDate,
) -> Result<Option<attendance::Model>> {
    let application_ids: Vec<i64> = OvertimeApplication::find()
        .filter(overtime_application::Column::EmployeeId.eq(employee_id))
        .filter(overtime_application::Column::OvertimeDate.eq(today))
        .filter(overtime_application::Column::Status.eq(ApprovalStatus::Approved))
        .all(db)
        .await?
        .into_iter()
        .map(|application| application.id)
        .collect();
    if application_ids.is_empty() {
        return Ok(None);
    }

    Attendance::find()
        .filter(attendance::Column::Kind.eq(AttendanceKind::Overtime))
        .filter(attendance::Column::OvertimeApplicationId.is_in(application_ids))
        .order_by_desc(attendance::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Records of a location clocked in on `day`, optionally restricted to one kind.
pub async fn get_location_attendance_for_day(
    db: &DatabaseConnection,
    location_id: i64,
    day: NaiveDate,
    kind: Option<AttendanceKind>,
) -> Result<Vec<attendance::Model>> {
    let (start, end) = day_bounds(day);
    let mut query = Attendance::find()
        .filter(attendance::Column::LocationId.eq(location_id))
        .filter(attendance::Column::ClockIn.gte(start))
        .filter(attendance::Column::ClockIn.lt(end));
    if let Some(kind) = kind {
        query = query.filter(attendance::Column::Kind.eq(kind));
    }

    query
        .order_by_asc(attendance::Column::ClockIn)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns the bytes of a record's clock-in or clock-out photo, if one was stored.
pub async fn get_attendance_photo(
    db: &DatabaseConnection,
    attendance_id: i64,
    direction: PhotoDirection,
) -> Result<Option<Vec<u8>>> {
    find_attendance(db, attendance_id).await?;

    let photo = AttendancePhoto::find()
        .filter(attendance_photo::Column::AttendanceId.eq(attendance_id))
        .filter(attendance_photo::Column::Direction.eq(direction))
        .one(db)
        .await?;
    Ok(photo.map(|p| p.data))
}

/// Blank record of the given kind, stamped at `now`.
pub(crate) fn new_record(
    employee_id: i64,
    location_id: i64,
    kind: AttendanceKind,
    now: NaiveDateTime,
) -> attendance::ActiveModel {
    attendance::ActiveModel {
        employee_id: Set(employee_id),
        location_id: Set(location_id),
        kind: Set(kind),
        status: Set(AttendanceStatus::Absent),
        clock_in: Set(None),
        clock_out: Set(None),
        break_in: Set(None),
        break_out: Set(None),
        description: Set(String::new()),
        deduction_amount: Set(0),
        late_minutes: Set(0),
        leave_application_id: Set(None),
        overtime_application_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

pub(crate) async fn find_attendance<C>(db: &C, attendance_id: i64) -> Result<attendance::Model>
where
    C: ConnectionTrait,
{
    Attendance::find_by_id(attendance_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Attendance", attendance_id))
}

/// Keeps at most one photo per direction: a new one replaces the old.
async fn store_photo<C>(
    db: &C,
    attendance_id: i64,
    direction: PhotoDirection,
    data: Vec<u8>,
    taken_at: NaiveDateTime,
) -> Result<()>
where
    C: ConnectionTrait,
{
    AttendancePhoto::delete_many()
        .filter(attendance_photo::Column::AttendanceId.eq(attendance_id))
        .filter(attendance_photo::Column::Direction.eq(direction))
        .exec(db)
        .await?;

    attendance_photo::ActiveModel {
        attendance_id: Set(attendance_id),
        direction: Set(direction),
        data: Set(data),
        created_at: Set(taken_at),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

async fn shift_window<C>(db: &C, record: &attendance::Model) -> Result<ShiftWindow>
where
    C: ConnectionTrait,
{
    if record.kind == AttendanceKind::Overtime {
        let application_id = record
            .overtime_application_id
            .ok_or_else(|| Error::not_found("OvertimeApplication", record.id))?;
        let application = OvertimeApplication::find_by_id(application_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("OvertimeApplication", application_id))?;
        return Ok(ShiftWindow::from(&application));
    }

    let employee = find_employee(db, record.employee_id).await?;
    let schedule_id = employee.schedule_id.ok_or(Error::ScheduleNotAssigned {
        employee_id: employee.id,
    })?;
    let schedule = find_schedule(db, schedule_id).await?;
    Ok(ShiftWindow::from(&schedule))
}

/// Late tolerance applied to breaks. Employees without a schedule get none.
async fn break_tolerance<C>(db: &C, record: &attendance::Model) -> Result<i32>
where
    C: ConnectionTrait,
{
    match shift_window(db, record).await {
        Ok(window) => Ok(window.late_tolerance_minutes),
        Err(Error::ScheduleNotAssigned { .. }) => Ok(0),
        Err(e) => Err(e),
    }
}

fn break_note(allowed_minutes: i32, overrun: i64) -> String {
    format!("Break exceeded the {allowed_minutes} minute allowance by {overrun} minutes")
}

fn record_day(record: &attendance::Model) -> NaiveDate {
    record.clock_in.unwrap_or(record.created_at).date()
}
