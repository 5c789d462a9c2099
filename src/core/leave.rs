//! Leave business logic - Applications for days off and their approval.
//!
//! Approving a leave writes one finalized `LEAVE` attendance record per calendar
//! day of the range, stamped with the employee's scheduled start and end.

use crate::{
    core::{
        activity_log::{AuditAction, record_if_admin},
        approval::{Decision, ensure_pending},
        attendance::new_record,
        employee::{find_active_actor, find_employee},
        location::find_schedule,
    },
    entities::{
        ApprovalStatus, AttendanceKind, AttendanceStatus, LeaveApplication, LeaveType,
        leave_application,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

const ENTITY: &str = "LeaveApplication";

/// Submits a pending leave application for `[start_date, end_date]`.
#[instrument(skip(db, description))]
pub async fn apply_leave(
    db: &DatabaseConnection,
    employee_id: i64,
    leave_type: LeaveType,
    start_date: NaiveDate,
    end_date: NaiveDate,
    description: String,
    submitted_at: NaiveDateTime,
) -> Result<leave_application::Model> {
    if start_date > end_date {
        return Err(Error::InvalidDateRange {
            start: start_date.to_string(),
            end: end_date.to_string(),
        });
    }
    let employee = find_employee(db, employee_id).await?;

    let application = leave_application::ActiveModel {
        employee_id: Set(employee.id),
        location_id: Set(employee.location_id),
        approver_id: Set(None),
        status: Set(ApprovalStatus::Pending),
        leave_type: Set(leave_type),
        start_date: Set(start_date),
        end_date: Set(end_date),
        description: Set(description),
        created_at: Set(submitted_at),
        updated_at: Set(submitted_at),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(application_id = application.id, employee_id, "leave requested");
    Ok(application)
}

/// Approves or rejects a pending application.
///
/// Approval fails with [`Error::ScheduleNotAssigned`] when the applicant has no
/// work schedule to stamp the leave days with.
#[instrument(skip(db))]
pub async fn decide_leave(
    db: &DatabaseConnection,
    application_id: i64,
    approver_id: i64,
    decision: Decision,
    decided_at: NaiveDateTime,
) -> Result<leave_application::Model> {
    let approver = find_active_actor(db, approver_id).await?;

    let txn = db.begin().await?;
    let application = find_application(&txn, application_id).await?;
    ensure_pending(ENTITY, application.id, application.status)?;
    let applicant = find_employee(&txn, application.employee_id).await?;

    if decision == Decision::Approve {
        let schedule_id = applicant.schedule_id.ok_or(Error::ScheduleNotAssigned {
            employee_id: applicant.id,
        })?;
        let schedule = find_schedule(&txn, schedule_id).await?;

        for day in application.start_date.iter_days().take_while(|d| *d <= application.end_date) {
            let mut record = new_record(
                applicant.id,
                application.location_id,
                AttendanceKind::Leave,
                decided_at,
            );
            record.status = Set(AttendanceStatus::Leave);
            record.clock_in = Set(Some(day.and_time(schedule.start_time)));
            record.clock_out = Set(Some(day.and_time(schedule.end_time)));
            record.description = Set(application.description.clone());
            record.leave_application_id = Set(Some(application.id));
            record.insert(&txn).await?;
        }
    }

    let mut active: leave_application::ActiveModel = application.into();
    active.status = Set(decision.status());
    active.approver_id = Set(Some(approver.id));
    active.updated_at = Set(decided_at);
    let saved = active.update(&txn).await?;
    txn.commit().await?;
    info!(application_id, status = %saved.status, days = saved.day_count(), "leave decided");

    let audit = format!(
        "{} set the {} leave of {} from {} to {} to {}",
        approver.username,
        saved.leave_type.label(),
        applicant.username,
        saved.start_date,
        saved.end_date,
        saved.status
    );
    record_if_admin(
        db,
        &approver,
        AuditAction::Update,
        "Update Leave Application",
        ENTITY,
        &audit,
        decided_at,
    )
    .await;

    Ok(saved)
}

/// Deletes an application that is still pending.
#[instrument(skip(db))]
pub async fn delete_leave(db: &DatabaseConnection, application_id: i64) -> Result<()> {
    let application = find_application(db, application_id).await?;
    ensure_pending(ENTITY, application.id, application.status)?;

    LeaveApplication::delete_by_id(application.id).exec(db).await?;
    info!(application_id, "leave application deleted");
    Ok(())
}

/// Finds a leave application by id.
pub async fn get_leave_application_by_id(
    db: &DatabaseConnection,
    application_id: i64,
) -> Result<Option<leave_application::Model>> {
    LeaveApplication::find_by_id(application_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Applications of a location in the given status, latest start date first.
pub async fn list_leave_applications(
    db: &DatabaseConnection,
    location_id: i64,
    status: ApprovalStatus,
) -> Result<Vec<leave_application::Model>> {
    LeaveApplication::find()
        .filter(leave_application::Column::LocationId.eq(location_id))
        .filter(leave_application::Column::Status.eq(status))
        .order_by_desc(leave_application::Column::StartDate)
        .order_by_desc(leave_application::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn find_application<C>(db: &C, application_id: i64) -> Result<leave_application::Model>
where
    C: ConnectionTrait,
{
    LeaveApplication::find_by_id(application_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, application_id))
}
