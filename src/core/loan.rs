//! Loan business logic - Salary advances with a ceiling and a once-a-day rule.
//!
//! A loan is capped by the employee's net salary for the month it is issued in
//! and only one loan per employee per location can be issued on a calendar day.
//! The check and the write share one transaction.

use crate::{
    core::{
        activity_log::{AuditAction, record_if_admin},
        calendar::{MonthRange, day_bounds},
        employee::{find_active_actor, find_employee},
        payroll::summarize,
    },
    entities::{Loan, loan},
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDateTime};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Issues a loan to an employee at `issued_at`.
///
/// Fails with [`Error::LoanAlreadyIssuedToday`] when the employee already borrowed
/// that day, and with [`Error::LoanExceedsSalary`] when `amount` is above the
/// month's net salary. An amount equal to the net salary is accepted.
#[instrument(skip(db))]
pub async fn add_loan(
    db: &DatabaseConnection,
    actor_id: i64,
    employee_id: i64,
    amount: i64,
    issued_at: NaiveDateTime,
) -> Result<loan::Model> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    let actor = find_active_actor(db, actor_id).await?;

    let txn = db.begin().await?;
    let employee = find_employee(&txn, employee_id).await?;
    let issue_day = issued_at.date();
    let (day_start, day_end) = day_bounds(issue_day);

    let already_issued = Loan::find()
        .filter(loan::Column::EmployeeId.eq(employee.id))
        .filter(loan::Column::LocationId.eq(employee.location_id))
        .filter(loan::Column::CreatedAt.gte(day_start))
        .filter(loan::Column::CreatedAt.lt(day_end))
        .one(&txn)
        .await?;
    if already_issued.is_some() {
        return Err(Error::LoanAlreadyIssuedToday {
            employee_id,
            date: issue_day,
        });
    }

    let range = MonthRange::new(issue_day.month(), issue_day.year())?;
    let summary = summarize(&txn, employee.id, employee.location_id, &range, None).await?;
    if amount > summary.total_salary {
        return Err(Error::LoanExceedsSalary {
            requested: amount,
            available: summary.total_salary,
        });
    }

    let saved = loan::ActiveModel {
        employee_id: Set(employee.id),
        location_id: Set(employee.location_id),
        amount: Set(amount),
        created_at: Set(issued_at),
        updated_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(loan_id = saved.id, employee_id, amount, "loan issued");

    let description = format!(
        "{} issued a loan of {amount} to {} on {issue_day}",
        actor.username, employee.username
    );
    record_if_admin(db, &actor, AuditAction::Add, "Add Loan", "Loan", &description, issued_at)
        .await;

    Ok(saved)
}

/// Changes the amount of an existing loan.
///
/// The ceiling is evaluated in the month the loan was issued, with the loan's own
/// previous amount left out of the loan total.
#[instrument(skip(db))]
pub async fn update_loan(
    db: &DatabaseConnection,
    actor_id: i64,
    loan_id: i64,
    new_amount: i64,
    updated_at: NaiveDateTime,
) -> Result<loan::Model> {
    if new_amount <= 0 {
        return Err(Error::InvalidAmount { amount: new_amount });
    }
    let actor = find_active_actor(db, actor_id).await?;

    let txn = db.begin().await?;
    let existing = Loan::find_by_id(loan_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Loan", loan_id))?;

    let issue_day = existing.created_at.date();
    let range = MonthRange::new(issue_day.month(), issue_day.year())?;
    let summary = summarize(
        &txn,
        existing.employee_id,
        existing.location_id,
        &range,
        Some(existing.id),
    )
    .await?;
    if new_amount > summary.total_salary {
        return Err(Error::LoanExceedsSalary {
            requested: new_amount,
            available: summary.total_salary,
        });
    }

    let previous_amount = existing.amount;
    let mut active: loan::ActiveModel = existing.into();
    active.amount = Set(new_amount);
    active.updated_at = Set(Some(updated_at));
    let saved = active.update(&txn).await?;
    txn.commit().await?;
    info!(loan_id, previous_amount, new_amount, "loan updated");

    let description = format!(
        "{} changed loan {loan_id} from {previous_amount} to {new_amount}",
        actor.username
    );
    record_if_admin(
        db,
        &actor,
        AuditAction::Update,
        "Update Loan",
        "Loan",
        &description,
        updated_at,
    )
    .await;

    Ok(saved)
}

/// Loans issued to an employee at a location during a month, newest first.
pub async fn get_loans_for_month(
    db: &DatabaseConnection,
    employee_id: i64,
    location_id: i64,
    month: u32,
    year: i32,
) -> Result<Vec<loan::Model>> {
    let range = MonthRange::new(month, year)?;

    Loan::find()
        .filter(loan::Column::EmployeeId.eq(employee_id))
        .filter(loan::Column::LocationId.eq(location_id))
        .filter(loan::Column::CreatedAt.gte(range.start))
        .filter(loan::Column::CreatedAt.lt(range.end))
        .order_by_desc(loan::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{ActivityLog, AttendanceStatus, EmployeeModel};
    use crate::errors::ErrorKind;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    /// Employee earning 100_000 a shift with two worked shifts in May 2024.
    async fn setup_payroll() -> Result<(DatabaseConnection, EmployeeModel, EmployeeModel)> {
        let (db, location, _schedule, employee) = setup_with_employee().await?;
        let owner = create_test_owner(&db, location.id, "owner").await?;
        insert_salary(&db, &employee, 100_000, date(2024, 1, 1)).await?;
        insert_attendance(&db, &employee, AttendanceStatus::Present, datetime(2024, 5, 2, 9, 0), 0).await?;
        insert_attendance(&db, &employee, AttendanceStatus::Present, datetime(2024, 5, 3, 9, 0), 0).await?;
        Ok((db, owner, employee))
    }

    #[tokio::test]
    async fn test_second_loan_same_day_fails() -> Result<()> {
        let (db, owner, employee) = setup_payroll().await?;

        add_loan(&db, owner.id, employee.id, 10_000, datetime(2024, 5, 6, 9, 0)).await?;
        let err = add_loan(&db, owner.id, employee.id, 1, datetime(2024, 5, 6, 18, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LoanAlreadyIssuedToday { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);

        // Next day is fine
        add_loan(&db, owner.id, employee.id, 1, datetime(2024, 5, 7, 9, 0)).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_loan_ceiling_is_inclusive() -> Result<()> {
        let (db, owner, employee) = setup_payroll().await?;

        let err = add_loan(&db, owner.id, employee.id, 200_001, datetime(2024, 5, 6, 9, 0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::LoanExceedsSalary {
                requested: 200_001,
                available: 200_000
            }
        ));

        let loan = add_loan(&db, owner.id, employee.id, 200_000, datetime(2024, 5, 6, 9, 0)).await?;
        assert_eq!(loan.amount, 200_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_loan_excludes_own_amount() -> Result<()> {
        let (db, owner, employee) = setup_payroll().await?;
        let first = add_loan(&db, owner.id, employee.id, 150_000, datetime(2024, 5, 6, 9, 0)).await?;
        add_loan(&db, owner.id, employee.id, 20_000, datetime(2024, 5, 7, 9, 0)).await?;

        // 200_000 earned, 20_000 borrowed elsewhere
        let updated = update_loan(&db, owner.id, first.id, 180_000, datetime(2024, 5, 8, 9, 0)).await?;
        assert_eq!(updated.amount, 180_000);
        assert!(updated.updated_at.is_some());

        let err = update_loan(&db, owner.id, first.id, 180_001, datetime(2024, 5, 8, 10, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LoanExceedsSalary { available: 180_000, .. }));

        let loans = get_loans_for_month(&db, employee.id, employee.location_id, 5, 2024).await?;
        assert_eq!(loans.len(), 2);
        assert_eq!(loans[0].amount, 20_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_loans_are_audited() -> Result<()> {
        let (db, _owner, employee) = setup_payroll().await?;
        let admin = create_test_admin(&db, employee.location_id, "admin").await?;

        add_loan(&db, admin.id, employee.id, 5_000, datetime(2024, 5, 6, 9, 0)).await?;
        let entries = ActivityLog::find().all(&db).await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action_name, "Add Loan");
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_amount() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let result = add_loan(&db, 1, 1, -5, datetime(2024, 5, 6, 9, 0)).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: -5 })));
    }
}
