//! Payroll business logic - Monthly salary breakdown per employee.
//!
//! The same numbers back the loan ceiling ([`crate::core::loan`]) and the
//! analytics views, so every figure is defined once here.

use crate::{
    core::{calendar::MonthRange, salary::resolve_salary},
    entities::{
        Attendance, AttendanceKind, Loan, OvertimeApplication, attendance, loan,
        overtime_application,
    },
    errors::Result,
};
use chrono::{Datelike, NaiveDate};
use sea_orm::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Salary breakdown of one employee for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MonthlySummary {
    /// Daily shifts finished PRESENT or LATE
    pub valid_attendance_count: u64,
    /// `valid_attendance_count` times the salary in force on the month's last day
    pub base_salary: i64,
    /// Sum of loans issued during the month
    pub total_loan: i64,
    /// Sum of deductions on every attendance record of the month
    pub total_deduction: i64,
    /// Overtime pay of overtime shifts finished PRESENT or LATE
    pub total_overtime_pay: i64,
    /// `base_salary - (total_loan + total_deduction) + total_overtime_pay`
    pub total_salary: i64,
}

impl MonthlySummary {
    fn with_total(mut self) -> Self {
        self.total_salary =
            self.base_salary - (self.total_loan + self.total_deduction) + self.total_overtime_pay;
        self
    }
}

/// Computes the monthly salary breakdown of an employee at a location.
///
/// Fails with [`crate::errors::Error::SalaryUndefined`] when no salary is in force
/// on the last day of the month.
pub async fn monthly_summary<C>(
    db: &C,
    employee_id: i64,
    location_id: i64,
    month: u32,
    year: i32,
) -> Result<MonthlySummary>
where
    C: ConnectionTrait,
{
    let range = MonthRange::new(month, year)?;
    summarize(db, employee_id, location_id, &range, None).await
}

/// Month-to-date net salary for the month containing `today`.
///
/// When `excluded_loan` names a loan, its amount is left out of the loan total,
/// which previews the ceiling available while that loan is being edited.
pub async fn current_total_salary<C>(
    db: &C,
    employee_id: i64,
    location_id: i64,
    today: NaiveDate,
    excluded_loan: Option<i64>,
) -> Result<i64>
where
    C: ConnectionTrait,
{
    let range = MonthRange::new(today.month(), today.year())?;
    let summary = summarize(db, employee_id, location_id, &range, excluded_loan).await?;
    Ok(summary.total_salary)
}

pub(crate) async fn summarize<C>(
    db: &C,
    employee_id: i64,
    location_id: i64,
    range: &MonthRange,
    excluded_loan: Option<i64>,
) -> Result<MonthlySummary>
where
    C: ConnectionTrait,
{
    let records = Attendance::find()
        .filter(attendance::Column::EmployeeId.eq(employee_id))
        .filter(attendance::Column::LocationId.eq(location_id))
        .filter(attendance::Column::ClockIn.gte(range.start))
        .filter(attendance::Column::ClockIn.lt(range.end))
        .all(db)
        .await?;

    let mut summary = MonthlySummary::default();
    let mut worked_overtime = Vec::new();
    for record in &records {
        summary.total_deduction += record.deduction_amount;
        if !record.status.is_worked() {
            continue;
        }
        match record.kind {
            AttendanceKind::Daily => summary.valid_attendance_count += 1,
            AttendanceKind::Overtime => worked_overtime.extend(record.overtime_application_id),
            AttendanceKind::Leave => {}
        }
    }

    if !worked_overtime.is_empty() {
        let applications = OvertimeApplication::find()
            .filter(overtime_application::Column::Id.is_in(worked_overtime.clone()))
            .all(db)
            .await?;
        summary.total_overtime_pay = worked_overtime
            .iter()
            .filter_map(|id| applications.iter().find(|a| a.id == *id))
            .map(|a| a.overtime_pay)
            .sum();
    }

    let mut loans = Loan::find()
        .filter(loan::Column::EmployeeId.eq(employee_id))
        .filter(loan::Column::LocationId.eq(location_id))
        .filter(loan::Column::CreatedAt.gte(range.start))
        .filter(loan::Column::CreatedAt.lt(range.end));
    if let Some(loan_id) = excluded_loan {
        loans = loans.filter(loan::Column::Id.ne(loan_id));
    }
    summary.total_loan = loans.all(db).await?.iter().map(|l| l.amount).sum();

    let salary = resolve_salary(db, employee_id, Some(range.last_day)).await?;
    let shifts = i64::try_from(summary.valid_attendance_count).unwrap_or(i64::MAX);
    summary.base_salary = shifts.saturating_mul(salary.amount);

    let summary = summary.with_total();
    debug!(
        employee_id,
        month = range.month(),
        year = range.year(),
        total_salary = summary.total_salary,
        "monthly summary computed"
    );
    Ok(summary)
}
