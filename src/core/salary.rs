//! Salary business logic - Time-versioned daily salary history.
//!
//! A salary is never edited in place. Each change adds a record with an effective
//! date, and the amount in force on a day is the record with the latest effective
//! date not after it (later writes win on equal dates).

use crate::{
    core::activity_log::{AuditAction, record_if_admin},
    entities::{Salary, salary},
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Resolves the salary in force on `as_of`, or today when `None`.
///
/// Fails with [`Error::SalaryUndefined`] when no record is effective yet.
pub async fn resolve_salary<C>(
    db: &C,
    employee_id: i64,
    as_of: Option<NaiveDate>,
) -> Result<salary::Model>
where
    C: ConnectionTrait,
{
    let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());

    find_effective_salary(db, employee_id, as_of)
        .await?
        .ok_or(Error::SalaryUndefined {
            employee_id,
            as_of,
        })
}

/// Same as [`resolve_salary`] but returns `None` instead of failing.
pub async fn find_effective_salary<C>(
    db: &C,
    employee_id: i64,
    as_of: NaiveDate,
) -> Result<Option<salary::Model>>
where
    C: ConnectionTrait,
{
    Salary::find()
        .filter(salary::Column::EmployeeId.eq(employee_id))
        .filter(salary::Column::EffectiveDate.lte(as_of))
        .order_by_desc(salary::Column::EffectiveDate)
        .order_by_desc(salary::Column::CreatedAt)
        .order_by_desc(salary::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Effective date for a salary targeted at a month: today for the current month,
/// otherwise the first day of the target month.
pub fn salary_effective_date(target_month: u32, target_year: i32, today: NaiveDate) -> Result<NaiveDate> {
    if target_month == today.month() && target_year == today.year() {
        return Ok(today);
    }

    NaiveDate::from_ymd_opt(target_year, target_month, 1).ok_or(Error::InvalidMonth {
        month: target_month,
        year: target_year,
    })
}

/// Adds a salary record for an employee, effective per [`salary_effective_date`]
/// with `created_at` as the request time. Records effective on the same day are
/// ordered by that time.
///
/// Fails with [`Error::InvalidAmount`] when `amount` is not positive.
#[instrument(skip(db))]
pub async fn add_salary(
    db: &DatabaseConnection,
    actor_id: i64,
    employee_id: i64,
    amount: i64,
    target_month: u32,
    target_year: i32,
    created_at: NaiveDateTime,
) -> Result<salary::Model> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    let effective_date = salary_effective_date(target_month, target_year, created_at.date())?;
    let actor = crate::core::employee::find_active_actor(db, actor_id).await?;
    let employee = crate::core::employee::find_employee(db, employee_id).await?;

    let record = salary::ActiveModel {
        employee_id: Set(employee.id),
        location_id: Set(employee.location_id),
        amount: Set(amount),
        effective_date: Set(effective_date),
        created_at: Set(created_at),
        ..Default::default()
    };
    let saved = record.insert(db).await?;
    info!(salary_id = saved.id, %effective_date, "salary added");

    let description = format!(
        "{} set the salary of {} to {amount} effective {effective_date}",
        actor.username, employee.username
    );
    record_if_admin(db, &actor, AuditAction::Add, "Add Salary", "Salary", &description, created_at)
        .await;

    Ok(saved)
}

/// Salary history of an employee, latest effective date first.
pub async fn get_salary_history(
    db: &DatabaseConnection,
    employee_id: i64,
) -> Result<Vec<salary::Model>> {
    Salary::find()
        .filter(salary::Column::EmployeeId.eq(employee_id))
        .order_by_desc(salary::Column::EffectiveDate)
        .order_by_desc(salary::Column::CreatedAt)
        .order_by_desc(salary::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::ActivityLog;
    use crate::errors::ErrorKind;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_resolve_salary_by_effective_date() -> Result<()> {
        let (db, _location, _schedule, employee) = setup_with_employee().await?;
        insert_salary(&db, &employee, 100, date(2024, 1, 1)).await?;
        insert_salary(&db, &employee, 120, date(2024, 3, 1)).await?;

        let feb = resolve_salary(&db, employee.id, Some(date(2024, 2, 15))).await?;
        assert_eq!(feb.amount, 100);
        let mar = resolve_salary(&db, employee.id, Some(date(2024, 3, 15))).await?;
        assert_eq!(mar.amount, 120);
        let first = resolve_salary(&db, employee.id, Some(date(2024, 3, 1))).await?;
        assert_eq!(first.amount, 120);

        let err = resolve_salary(&db, employee.id, Some(date(2023, 12, 31)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SalaryUndefined { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn test_later_write_wins_on_same_date() -> Result<()> {
        let (db, _location, _schedule, employee) = setup_with_employee().await?;
        insert_salary(&db, &employee, 100, date(2024, 1, 1)).await?;
        insert_salary(&db, &employee, 110, date(2024, 1, 1)).await?;

        let current = resolve_salary(&db, employee.id, Some(date(2024, 1, 20))).await?;
        assert_eq!(current.amount, 110);
        Ok(())
    }

    #[test]
    fn test_salary_effective_date() {
        let today = date(2024, 5, 20);
        assert_eq!(salary_effective_date(5, 2024, today).unwrap(), today);
        assert_eq!(salary_effective_date(3, 2024, today).unwrap(), date(2024, 3, 1));
        // Same month number in another year is not "this month"
        assert_eq!(salary_effective_date(5, 2023, today).unwrap(), date(2023, 5, 1));
        assert!(matches!(
            salary_effective_date(0, 2024, today),
            Err(Error::InvalidMonth { .. })
        ));
    }

    #[tokio::test]
    async fn test_add_salary_rejects_non_positive_amount() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let result = add_salary(&db, 1, 1, 0, 5, 2024, datetime(2024, 5, 20, 9, 0)).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: 0 })));
    }

    #[tokio::test]
    async fn test_add_salary_audits_admin() -> Result<()> {
        let (db, location, _schedule, employee) = setup_with_employee().await?;
        let admin = create_test_admin(&db, location.id, "admin").await?;

        let at = datetime(2024, 5, 20, 9, 0);
        let saved = add_salary(&db, admin.id, employee.id, 150_000, 4, 2024, at).await?;
        assert_eq!(saved.effective_date, date(2024, 4, 1));
        assert_eq!(saved.location_id, location.id);
        assert_eq!(saved.created_at, at);

        let history = get_salary_history(&db, employee.id).await?;
        assert_eq!(history.len(), 1);
        let entries = ActivityLog::find().all(&db).await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].created_at, at);
        Ok(())
    }

    #[tokio::test]
    async fn test_same_day_salaries_ordered_by_request_time() -> Result<()> {
        let (db, location, _schedule, employee) = setup_with_employee().await?;
        let owner = create_test_owner(&db, location.id, "owner").await?;

        // Written first but requested later in the day
        add_salary(&db, owner.id, employee.id, 200, 5, 2024, datetime(2024, 5, 20, 15, 0)).await?;
        let earlier =
            add_salary(&db, owner.id, employee.id, 100, 5, 2024, datetime(2024, 5, 20, 9, 0))
                .await?;
        assert_eq!(earlier.effective_date, date(2024, 5, 20));
        assert_eq!(earlier.created_at, datetime(2024, 5, 20, 9, 0));

        let current = resolve_salary(&db, employee.id, Some(date(2024, 5, 20))).await?;
        assert_eq!(current.amount, 200);
        Ok(())
    }
}
