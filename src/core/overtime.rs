//! Overtime business logic - Applications for extra shifts and their approval.
//!
//! An application copies the start, end and tolerance of a work schedule, so
//! later schedule edits never move an overtime shift. Approval prices the shift
//! and opens exactly one overtime attendance record for it.

use crate::{
    core::{
        activity_log::{AuditAction, record_if_admin},
        approval::{Decision, ensure_pending},
        attendance::new_record,
        employee::{find_active_actor, find_employee},
        location::{find_location, find_schedule},
        salary::{find_effective_salary, resolve_salary},
    },
    entities::{
        ApprovalStatus, AttendanceKind, OvertimeApplication, overtime_application,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

const ENTITY: &str = "OvertimeApplication";

/// Overtime pay for one shift: the daily salary times the multiplier, truncated.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn overtime_pay(daily_salary: i64, multiplier: f64) -> i64 {
    (daily_salary as f64 * multiplier) as i64
}

/// Submits a pending overtime application for the window of `schedule_id`.
///
/// The pay shown before approval uses the salary in force on the overtime date,
/// or 0 when none is defined yet.
#[instrument(skip(db, description))]
pub async fn apply_overtime(
    db: &DatabaseConnection,
    employee_id: i64,
    schedule_id: i64,
    overtime_date: NaiveDate,
    description: String,
    submitted_at: NaiveDateTime,
) -> Result<overtime_application::Model> {
    let employee = find_employee(db, employee_id).await?;
    let schedule = find_schedule(db, schedule_id).await?;
    if schedule.location_id != employee.location_id {
        return Err(Error::not_found("WorkSchedule", schedule_id));
    }
    let location = find_location(db, employee.location_id).await?;

    let salary = find_effective_salary(db, employee.id, overtime_date)
        .await?
        .map_or(0, |s| s.amount);

    let application = overtime_application::ActiveModel {
        employee_id: Set(employee.id),
        location_id: Set(employee.location_id),
        approver_id: Set(None),
        status: Set(ApprovalStatus::Pending),
        overtime_date: Set(overtime_date),
        start_time: Set(schedule.start_time),
        end_time: Set(schedule.end_time),
        late_tolerance_minutes: Set(schedule.late_tolerance_minutes),
        overtime_pay: Set(overtime_pay(salary, location.overtime_multiplier)),
        description: Set(description),
        created_at: Set(submitted_at),
        updated_at: Set(submitted_at),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(application_id = application.id, employee_id, %overtime_date, "overtime requested");
    Ok(application)
}

/// Approves or rejects a pending application.
///
/// Approval reprices the shift from the salary in force on the overtime date
/// (failing with [`Error::SalaryUndefined`] when there is none) and creates the
/// overtime attendance record the employee will clock in on.
#[instrument(skip(db))]
pub async fn decide_overtime(
    db: &DatabaseConnection,
    application_id: i64,
    approver_id: i64,
    decision: Decision,
    decided_at: NaiveDateTime,
) -> Result<overtime_application::Model> {
    let approver = find_active_actor(db, approver_id).await?;

    let txn = db.begin().await?;
    let application = find_application(&txn, application_id).await?;
    ensure_pending(ENTITY, application.id, application.status)?;
    let applicant = find_employee(&txn, application.employee_id).await?;

    let mut active: overtime_application::ActiveModel = application.clone().into();
    active.status = Set(decision.status());
    active.approver_id = Set(Some(approver.id));
    active.updated_at = Set(decided_at);

    if decision == Decision::Approve {
        let location = find_location(&txn, application.location_id).await?;
        let salary =
            resolve_salary(&txn, application.employee_id, Some(application.overtime_date)).await?;
        active.overtime_pay = Set(overtime_pay(salary.amount, location.overtime_multiplier));

        let mut record = new_record(
            application.employee_id,
            application.location_id,
            AttendanceKind::Overtime,
            application.overtime_date.and_time(NaiveTime::MIN),
        );
        record.overtime_application_id = Set(Some(application.id));
        record.updated_at = Set(decided_at);
        record.insert(&txn).await?;
    }

    let saved = active.update(&txn).await?;
    txn.commit().await?;
    info!(application_id, status = %saved.status, "overtime decided");

    let audit = format!(
        "{} set the overtime application of {} for {} ({} - {}) to {}",
        approver.username,
        applicant.username,
        saved.overtime_date.format("%d %B %Y"),
        saved.start_time.format("%H:%M"),
        saved.end_time.format("%H:%M"),
        saved.status
    );
    record_if_admin(
        db,
        &approver,
        AuditAction::Update,
        "Update Overtime Application",
        ENTITY,
        &audit,
        decided_at,
    )
    .await;

    Ok(saved)
}

/// Deletes an application that is still pending.
#[instrument(skip(db))]
pub async fn delete_overtime(db: &DatabaseConnection, application_id: i64) -> Result<()> {
    let application = find_application(db, application_id).await?;
    ensure_pending(ENTITY, application.id, application.status)?;

    OvertimeApplication::delete_by_id(application.id)
        .exec(db)
        .await?;
    info!(application_id, "overtime application deleted");
    Ok(())
}

/// Finds an overtime application by id.
pub async fn get_overtime_application_by_id(
    db: &DatabaseConnection,
    application_id: i64,
) -> Result<Option<overtime_application::Model>> {
    OvertimeApplication::find_by_id(application_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Applications of a location in the given status, latest overtime date first.
pub async fn list_overtime_applications(
    db: &DatabaseConnection,
    location_id: i64,
    status: ApprovalStatus,
) -> Result<Vec<overtime_application::Model>> {
    OvertimeApplication::find()
        .filter(overtime_application::Column::LocationId.eq(location_id))
        .filter(overtime_application::Column::Status.eq(status))
        .order_by_desc(overtime_application::Column::OvertimeDate)
        .order_by_desc(overtime_application::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn find_application<C>(db: &C, application_id: i64) -> Result<overtime_application::Model>
where
    C: ConnectionTrait,
{
    OvertimeApplication::find_by_id(application_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, application_id))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::attendance::{break_in, break_out, clock_out, overtime_clock_in};
    use crate::core::payroll::monthly_summary;
    use crate::entities::{ActivityLog, Attendance, AttendanceStatus, attendance};
    use crate::errors::ErrorKind;
    use crate::test_utils::*;

    #[test]
    fn test_overtime_pay_truncates() {
        assert_eq!(overtime_pay(100_000, 1.5), 150_000);
        assert_eq!(overtime_pay(333, 1.5), 499);
        assert_eq!(overtime_pay(0, 2.0), 0);
    }

    #[tokio::test]
    async fn test_apply_copies_schedule_window() -> Result<()> {
        let (db, _location, schedule, employee) = setup_with_employee().await?;

        let application = apply_overtime(
            &db,
            employee.id,
            schedule.id,
            date(2024, 5, 11),
            "Stock take".to_string(),
            datetime(2024, 5, 9, 10, 0),
        )
        .await?;
        assert_eq!(application.status, ApprovalStatus::Pending);
        assert_eq!(application.start_time, schedule.start_time);
        assert_eq!(application.end_time, schedule.end_time);
        assert_eq!(application.late_tolerance_minutes, 15);
        // No salary yet
        assert_eq!(application.overtime_pay, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_approval_creates_single_overtime_record() -> Result<()> {
        let (db, location, schedule, employee) = setup_with_employee().await?;
        let admin = create_test_admin(&db, location.id, "admin").await?;
        insert_salary(&db, &employee, 100_000, date(2024, 1, 1)).await?;

        let application = apply_overtime(
            &db,
            employee.id,
            schedule.id,
            date(2024, 5, 11),
            String::new(),
            datetime(2024, 5, 9, 10, 0),
        )
        .await?;
        let approved = decide_overtime(
            &db,
            application.id,
            admin.id,
            Decision::Approve,
            datetime(2024, 5, 9, 11, 0),
        )
        .await?;
        assert_eq!(approved.status, ApprovalStatus::Approved);
        assert_eq!(approved.approver_id, Some(admin.id));
        assert_eq!(approved.overtime_pay, 150_000);

        let records = Attendance::find()
            .filter(attendance::Column::OvertimeApplicationId.eq(application.id))
            .all(&db)
            .await?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, AttendanceKind::Overtime);
        assert_eq!(records[0].status, AttendanceStatus::Absent);
        assert!(records[0].clock_in.is_none());

        let err = decide_overtime(
            &db,
            application.id,
            admin.id,
            Decision::Reject,
            datetime(2024, 5, 9, 12, 0),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::ApplicationNotPending { .. }));
        assert_eq!(ActivityLog::find().all(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_approval_requires_salary() -> Result<()> {
        let (db, location, schedule, employee) = setup_with_employee().await?;
        let owner = create_test_owner(&db, location.id, "owner").await?;
        let application = apply_overtime(
            &db,
            employee.id,
            schedule.id,
            date(2024, 5, 11),
            String::new(),
            datetime(2024, 5, 9, 10, 0),
        )
        .await?;

        let err = decide_overtime(
            &db,
            application.id,
            owner.id,
            Decision::Approve,
            datetime(2024, 5, 9, 11, 0),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let unchanged = get_overtime_application_by_id(&db, application.id).await?.unwrap();
        assert_eq!(unchanged.status, ApprovalStatus::Pending);
        assert!(Attendance::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_rejection_creates_nothing() -> Result<()> {
        let (db, location, schedule, employee) = setup_with_employee().await?;
        let owner = create_test_owner(&db, location.id, "owner").await?;
        let application = apply_overtime(
            &db,
            employee.id,
            schedule.id,
            date(2024, 5, 11),
            String::new(),
            datetime(2024, 5, 9, 10, 0),
        )
        .await?;

        decide_overtime(&db, application.id, owner.id, Decision::Reject, datetime(2024, 5, 9, 11, 0))
            .await?;
        assert!(Attendance::find().all(&db).await?.is_empty());
        assert_eq!(
            list_overtime_applications(&db, location.id, ApprovalStatus::Rejected)
                .await?
                .len(),
            1
        );

        let err = delete_overtime(&db, application.id).await.unwrap_err();
        assert!(matches!(err, Error::ApplicationNotPending { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_pending_application() -> Result<()> {
        let (db, _location, schedule, employee) = setup_with_employee().await?;
        let application = apply_overtime(
            &db,
            employee.id,
            schedule.id,
            date(2024, 5, 11),
            String::new(),
            datetime(2024, 5, 9, 10, 0),
        )
        .await?;

        delete_overtime(&db, application.id).await?;
        assert!(get_overtime_application_by_id(&db, application.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_overtime_shift_end_to_end() -> Result<()> {
        let (db, location, schedule, employee) = setup_with_employee().await?;
        let owner = create_test_owner(&db, location.id, "owner").await?;
        insert_salary(&db, &employee, 100_000, date(2024, 1, 1)).await?;

        let application = apply_overtime(
            &db,
            employee.id,
            schedule.id,
            date(2024, 5, 11),
            String::new(),
            datetime(2024, 5, 9, 10, 0),
        )
        .await?;
        decide_overtime(&db, application.id, owner.id, Decision::Approve, datetime(2024, 5, 9, 11, 0))
            .await?;

        let record = crate::core::attendance::get_today_overtime_attendance(
            &db,
            employee.id,
            date(2024, 5, 11),
        )
        .await?
        .unwrap();

        // Not clocked in yet
        let err = clock_out(&db, record.id, in_area(datetime(2024, 5, 11, 17, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotClockedIn { .. }));

        overtime_clock_in(&db, record.id, in_area(datetime(2024, 5, 11, 9, 30))).await?;
        // Overtime breaks share the location pool
        break_in(&db, record.id, datetime(2024, 5, 11, 12, 0)).await?;
        break_out(&db, record.id, datetime(2024, 5, 11, 12, 45)).await?;
        let finished = clock_out(&db, record.id, in_area(datetime(2024, 5, 11, 17, 10))).await?;
        assert_eq!(finished.status, AttendanceStatus::Late);
        assert_eq!(finished.late_minutes, 15);

        let err = overtime_clock_in(&db, record.id, in_area(datetime(2024, 5, 11, 18, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyFinalized { .. }));

        let summary = monthly_summary(&db, employee.id, location.id, 5, 2024).await?;
        assert_eq!(summary.total_overtime_pay, 150_000);
        assert_eq!(summary.valid_attendance_count, 0);
        assert_eq!(summary.total_deduction, location.late_clock_in_penalty);
        Ok(())
    }
}
