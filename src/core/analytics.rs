//! Analytics - Multi-month reporting views over a location's history.
//!
//! Every report covers a window of `period_months` calendar months ending with the
//! month containing `today`, and lists each month of the window even when nothing
//! happened in it. Figures use the same definitions as [`crate::core::payroll`].

use crate::{
    core::{
        calendar::{MonthRange, day_bounds},
        location::find_location,
        salary::find_effective_salary,
    },
    entities::{
        ApprovalStatus, Attendance, AttendanceKind, AttendanceStatus, Employee, LeaveApplication,
        LeaveType, OvertimeApplication, attendance, employee, leave_application,
        overtime_application,
    },
    errors::{Error, Result},
};
use chrono::{Months, NaiveDate, NaiveDateTime};
use sea_orm::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

/// Number of employees listed in the lateness ranking.
pub const TOP_LATE_EMPLOYEES: usize = 5;

/// A month label paired with an amount of money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyAmount {
    /// Label such as `"March 2025"`
    pub month: String,
    /// Amount for that month
    pub amount: i64,
}

/// A month label paired with a count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// Label such as `"March 2025"`
    pub month: String,
    /// Count for that month
    pub count: u64,
}

/// Salary expense of a location per month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseReport {
    /// One entry per month of the window, oldest first
    pub monthly: Vec<MonthlyAmount>,
    /// Sum over the window
    pub total: i64,
    /// `total` divided by the number of months
    pub average: i64,
    /// Most expensive month
    pub highest: Option<MonthlyAmount>,
    /// Least expensive month
    pub lowest: Option<MonthlyAmount>,
}

/// Lateness figures of one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeLateness {
    pub employee_id: i64,
    pub username: String,
    /// Records finished LATE
    pub late_count: u64,
    /// Sum of their late minutes
    pub late_minutes: i64,
}

/// Late arrivals at a location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatenessReport {
    /// Employees with at least one late record
    pub total_employees_late: usize,
    pub total_late_count: u64,
    pub total_late_minutes: i64,
    /// `total_late_minutes` in hours, one decimal
    pub total_late_hours: f64,
    /// Most frequently late employees, highest count first
    pub top_late_employees: Vec<EmployeeLateness>,
    /// Late records per month, oldest first
    pub monthly_distribution: Vec<MonthlyCount>,
}

/// Share of one leave type in the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaveTypeShare {
    pub leave_type: LeaveType,
    /// Lower-case label, e.g. `"sick"`
    pub label: &'static str,
    pub leave_days: i64,
    pub total_requests: u64,
    /// Percentage of all leave days in the window, two decimals
    pub percentage: f64,
}

/// Leave days of one month keyed by leave type label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyLeave {
    pub month: String,
    pub days_by_type: BTreeMap<&'static str, i64>,
}

/// Approved leave compared with approved overtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaveOvertimeReport {
    pub total_leave_days: i64,
    pub total_leave_requests: u64,
    /// One entry per month, every leave type present
    pub leave_by_month: Vec<MonthlyLeave>,
    /// One entry per leave type
    pub distribution: Vec<LeaveTypeShare>,
    pub total_overtime_days: u64,
    /// Approved overtime applications per month
    pub overtime_by_month: Vec<MonthlyCount>,
}

/// Reporting window: the months it spans and its half-open datetime bounds.
struct Window {
    months: Vec<MonthRange>,
    start: NaiveDateTime,
    end: NaiveDateTime,
    today: NaiveDate,
}

impl Window {
    fn new(period_months: u32, today: NaiveDate) -> Result<Self> {
        let invalid = Error::InvalidPeriod {
            months: period_months,
        };
        if period_months == 0 {
            return Err(invalid);
        }

        let first = today
            .checked_sub_months(Months::new(period_months - 1))
            .and_then(MonthRange::containing)
            .ok_or(invalid)?;

        let mut months = Vec::new();
        let mut current = Some(first);
        while let Some(month) = current {
            if month.first_day > today {
                break;
            }
            months.push(month);
            current = month.next();
        }

        Ok(Self {
            start: first.start,
            end: day_bounds(today).1,
            months,
            today,
        })
    }

    /// Index of the month containing `date`, if it falls inside the window.
    fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if date > self.today {
            return None;
        }
        self.months
            .iter()
            .position(|m| m.first_day <= date && date <= m.last_day)
    }

    fn labels(&self) -> impl Iterator<Item = String> + '_ {
        self.months.iter().map(MonthRange::label)
    }
}

async fn attendance_in_window(
    db: &DatabaseConnection,
    location_id: i64,
    window: &Window,
) -> Result<Vec<attendance::Model>> {
    Attendance::find()
        .filter(attendance::Column::LocationId.eq(location_id))
        .filter(attendance::Column::ClockIn.gte(window.start))
        .filter(attendance::Column::ClockIn.lt(window.end))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Monthly salary expense of a location.
///
/// A month's expense is the base salary of every employee (worked daily shifts
/// times the salary in force on the month's last day, 0 when none) plus the
/// overtime pay of worked overtime shifts, minus all deductions.
#[instrument(skip(db))]
pub async fn expense_report(
    db: &DatabaseConnection,
    location_id: i64,
    period_months: u32,
    today: NaiveDate,
) -> Result<ExpenseReport> {
    let window = Window::new(period_months, today)?;
    let location = find_location(db, location_id).await?;
    let records = attendance_in_window(db, location.id, &window).await?;

    let mut amounts = vec![0_i64; window.months.len()];
    let mut shifts: HashMap<(usize, i64), i64> = HashMap::new();
    let mut overtime: Vec<(usize, i64)> = Vec::new();

    for record in &records {
        let Some(idx) = record.clock_in.and_then(|t| window.index_of(t.date())) else {
            continue;
        };
        amounts[idx] -= record.deduction_amount;
        if !record.status.is_worked() {
            continue;
        }
        match record.kind {
            AttendanceKind::Daily => *shifts.entry((idx, record.employee_id)).or_default() += 1,
            AttendanceKind::Overtime => {
                if let Some(application_id) = record.overtime_application_id {
                    overtime.push((idx, application_id));
                }
            }
            AttendanceKind::Leave => {}
        }
    }

    for ((idx, employee_id), count) in shifts {
        let salary = find_effective_salary(db, employee_id, window.months[idx].last_day)
            .await?
            .map_or(0, |s| s.amount);
        amounts[idx] += count.saturating_mul(salary);
    }

    if !overtime.is_empty() {
        let ids: Vec<i64> = overtime.iter().map(|(_, id)| *id).collect();
        let pay: HashMap<i64, i64> = OvertimeApplication::find()
            .filter(overtime_application::Column::Id.is_in(ids))
            .all(db)
            .await?
            .into_iter()
            .map(|a| (a.id, a.overtime_pay))
            .collect();
        for (idx, application_id) in overtime {
            amounts[idx] += pay.get(&application_id).copied().unwrap_or(0);
        }
    }

    let monthly: Vec<MonthlyAmount> = window
        .labels()
        .zip(amounts)
        .map(|(month, amount)| MonthlyAmount { month, amount })
        .collect();
    let total: i64 = monthly.iter().map(|m| m.amount).sum();
    let average = total / i64::from(period_months);
    let highest = monthly.iter().max_by_key(|m| m.amount).cloned();
    let lowest = monthly.iter().min_by_key(|m| m.amount).cloned();

    debug!(location_id, total, "expense report computed");
    Ok(ExpenseReport {
        monthly,
        total,
        average,
        highest,
        lowest,
    })
}

/// Late arrivals of a location, ranked by employee.
#[instrument(skip(db))]
#[allow(clippy::cast_precision_loss)]
pub async fn lateness_report(
    db: &DatabaseConnection,
    location_id: i64,
    period_months: u32,
    today: NaiveDate,
) -> Result<LatenessReport> {
    let window = Window::new(period_months, today)?;
    let location = find_location(db, location_id).await?;
    let records = attendance_in_window(db, location.id, &window).await?;

    let mut monthly = vec![0_u64; window.months.len()];
    let mut per_employee: HashMap<i64, (u64, i64)> = HashMap::new();
    for record in records.iter().filter(|r| r.status == AttendanceStatus::Late) {
        let Some(idx) = record.clock_in.and_then(|t| window.index_of(t.date())) else {
            continue;
        };
        monthly[idx] += 1;
        let entry = per_employee.entry(record.employee_id).or_default();
        entry.0 += 1;
        entry.1 += record.late_minutes;
    }

    let usernames: HashMap<i64, String> = Employee::find()
        .filter(employee::Column::Id.is_in(per_employee.keys().copied().collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|e| (e.id, e.username))
        .collect();

    let mut ranking: Vec<EmployeeLateness> = per_employee
        .into_iter()
        .map(|(employee_id, (late_count, late_minutes))| EmployeeLateness {
            employee_id,
            username: usernames.get(&employee_id).cloned().unwrap_or_default(),
            late_count,
            late_minutes,
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.late_count
            .cmp(&a.late_count)
            .then(b.late_minutes.cmp(&a.late_minutes))
            .then(a.employee_id.cmp(&b.employee_id))
    });

    let total_employees_late = ranking.len();
    let total_late_count = ranking.iter().map(|e| e.late_count).sum();
    let total_late_minutes: i64 = ranking.iter().map(|e| e.late_minutes).sum();
    ranking.truncate(TOP_LATE_EMPLOYEES);

    Ok(LatenessReport {
        total_employees_late,
        total_late_count,
        total_late_minutes,
        total_late_hours: round_to(total_late_minutes as f64 / 60.0, 1),
        top_late_employees: ranking,
        monthly_distribution: window
            .labels()
            .zip(monthly)
            .map(|(month, count)| MonthlyCount { month, count })
            .collect(),
    })
}

/// Approved leave by type and month, next to approved overtime days per month.
///
/// Leave is bucketed by the month its range starts in.
#[instrument(skip(db))]
#[allow(clippy::cast_precision_loss)]
pub async fn leave_overtime_report(
    db: &DatabaseConnection,
    location_id: i64,
    period_months: u32,
    today: NaiveDate,
) -> Result<LeaveOvertimeReport> {
    let window = Window::new(period_months, today)?;
    let location = find_location(db, location_id).await?;
    let first_day = window.start.date();

    let leaves = LeaveApplication::find()
        .filter(leave_application::Column::LocationId.eq(location.id))
        .filter(leave_application::Column::Status.eq(ApprovalStatus::Approved))
        .filter(leave_application::Column::StartDate.gte(first_day))
        .filter(leave_application::Column::StartDate.lte(today))
        .all(db)
        .await?;

    let empty_month: BTreeMap<&'static str, i64> =
        LeaveType::ALL.iter().map(|t| (t.label(), 0)).collect();
    let mut by_month = vec![empty_month; window.months.len()];
    let mut by_type: BTreeMap<LeaveType, (i64, u64)> = BTreeMap::new();

    for leave in &leaves {
        let Some(idx) = window.index_of(leave.start_date) else {
            continue;
        };
        let days = leave.day_count();
        *by_month[idx].entry(leave.leave_type.label()).or_default() += days;
        let totals = by_type.entry(leave.leave_type).or_default();
        totals.0 += days;
        totals.1 += 1;
    }

    let total_leave_days: i64 = by_type.values().map(|(days, _)| days).sum();
    let total_leave_requests: u64 = by_type.values().map(|(_, requests)| requests).sum();
    let distribution = LeaveType::ALL
        .iter()
        .map(|&leave_type| {
            let (leave_days, total_requests) = by_type.get(&leave_type).copied().unwrap_or_default();
            let percentage = if total_leave_days > 0 {
                round_to(leave_days as f64 * 100.0 / total_leave_days as f64, 2)
            } else {
                0.0
            };
            LeaveTypeShare {
                leave_type,
                label: leave_type.label(),
                leave_days,
                total_requests,
                percentage,
            }
        })
        .collect();

    let overtime = OvertimeApplication::find()
        .filter(overtime_application::Column::LocationId.eq(location.id))
        .filter(overtime_application::Column::Status.eq(ApprovalStatus::Approved))
        .filter(overtime_application::Column::OvertimeDate.gte(first_day))
        .filter(overtime_application::Column::OvertimeDate.lte(today))
        .all(db)
        .await?;
    let mut overtime_counts = vec![0_u64; window.months.len()];
    for application in &overtime {
        if let Some(idx) = window.index_of(application.overtime_date) {
            overtime_counts[idx] += 1;
        }
    }

    Ok(LeaveOvertimeReport {
        total_leave_days,
        total_leave_requests,
        leave_by_month: window
            .labels()
            .zip(by_month)
            .map(|(month, days_by_type)| MonthlyLeave {
                month,
                days_by_type,
            })
            .collect(),
        distribution,
        total_overtime_days: overtime_counts.iter().sum(),
        overtime_by_month: window
            .labels()
            .zip(overtime_counts)
            .map(|(month, count)| MonthlyCount { month, count })
            .collect(),
    })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{
        approval::Decision,
        leave::{apply_leave, decide_leave},
        overtime::{apply_overtime, decide_overtime},
    };
    use crate::entities::EmployeeModel;
    use crate::test_utils::*;
    use sea_orm::{ActiveModelTrait, Set};

    async fn insert_late(
        db: &DatabaseConnection,
        employee: &EmployeeModel,
        clock_in: NaiveDateTime,
        late_minutes: i64,
    ) -> Result<()> {
        let record = insert_attendance(db, employee, AttendanceStatus::Late, clock_in, 0).await?;
        let mut active: attendance::ActiveModel = record.into();
        active.late_minutes = Set(late_minutes);
        active.update(db).await?;
        Ok(())
    }

    #[test]
    fn test_window_rejects_zero_period() {
        assert!(matches!(
            Window::new(0, date(2024, 5, 20)),
            Err(Error::InvalidPeriod { months: 0 })
        ));
    }

    #[test]
    fn test_window_spans_year_boundary() {
        let window = Window::new(3, date(2024, 1, 15)).unwrap();
        let labels: Vec<String> = window.labels().collect();
        assert_eq!(labels, vec!["November 2023", "December 2023", "January 2024"]);
        assert_eq!(window.start, datetime(2023, 11, 1, 0, 0));
        assert_eq!(window.end, datetime(2024, 1, 16, 0, 0));
        assert_eq!(window.index_of(date(2023, 12, 31)), Some(1));
        assert_eq!(window.index_of(date(2024, 1, 20)), None);
    }

    #[tokio::test]
    async fn test_expense_report_zero_fills_months() -> Result<()> {
        let (db, location, _schedule, employee) = setup_with_employee().await?;
        insert_salary(&db, &employee, 100_000, date(2024, 1, 1)).await?;

        insert_attendance(&db, &employee, AttendanceStatus::Present, datetime(2024, 4, 10, 9, 0), 0).await?;
        insert_attendance(&db, &employee, AttendanceStatus::Late, datetime(2024, 4, 11, 9, 40), 10_000).await?;
        insert_attendance(&db, &employee, AttendanceStatus::Absent, datetime(2024, 4, 12, 9, 0), 0).await?;
        insert_attendance(&db, &employee, AttendanceStatus::Present, datetime(2024, 5, 2, 9, 0), 0).await?;

        let report = expense_report(&db, location.id, 3, date(2024, 5, 20)).await?;
        let amounts: Vec<(&str, i64)> = report
            .monthly
            .iter()
            .map(|m| (m.month.as_str(), m.amount))
            .collect();
        assert_eq!(
            amounts,
            vec![("March 2024", 0), ("April 2024", 190_000), ("May 2024", 100_000)]
        );
        assert_eq!(report.total, 290_000);
        assert_eq!(report.average, 96_666);
        assert_eq!(report.highest.unwrap().month, "April 2024");
        assert_eq!(report.lowest.unwrap().month, "March 2024");
        Ok(())
    }

    #[tokio::test]
    async fn test_expense_report_unknown_location() -> Result<()> {
        let db = setup_test_db().await?;
        let err = expense_report(&db, 42, 1, date(2024, 5, 20)).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_lateness_report_ranks_employees() -> Result<()> {
        let (db, location, schedule, budi) = setup_with_employee().await?;
        let sari = create_test_employee(&db, location.id, Some(schedule.id), "sari").await?;

        insert_late(&db, &budi, datetime(2024, 4, 2, 9, 30), 30).await?;
        insert_late(&db, &sari, datetime(2024, 4, 3, 9, 20), 20).await?;
        insert_late(&db, &sari, datetime(2024, 5, 6, 9, 40), 40).await?;
        insert_attendance(&db, &budi, AttendanceStatus::Present, datetime(2024, 5, 7, 9, 0), 0).await?;

        let report = lateness_report(&db, location.id, 2, date(2024, 5, 20)).await?;
        assert_eq!(report.total_employees_late, 2);
        assert_eq!(report.total_late_count, 3);
        assert_eq!(report.total_late_minutes, 90);
        assert!((report.total_late_hours - 1.5).abs() < f64::EPSILON);

        let ranking: Vec<(&str, u64, i64)> = report
            .top_late_employees
            .iter()
            .map(|e| (e.username.as_str(), e.late_count, e.late_minutes))
            .collect();
        assert_eq!(ranking, vec![("sari", 2, 60), ("budi", 1, 30)]);

        let counts: Vec<u64> = report.monthly_distribution.iter().map(|m| m.count).collect();
        assert_eq!(counts, vec![2, 1]);
        Ok(())
    }

    #[tokio::test]
    async fn test_leave_overtime_report() -> Result<()> {
        let (db, location, schedule, employee) = setup_with_employee().await?;
        let owner = create_test_owner(&db, location.id, "owner").await?;
        insert_salary(&db, &employee, 100_000, date(2024, 1, 1)).await?;
        let submitted = datetime(2024, 3, 1, 8, 0);

        for (leave_type, start, end) in [
            (LeaveType::Sick, date(2024, 4, 1), date(2024, 4, 3)),
            (LeaveType::Personal, date(2024, 5, 6), date(2024, 5, 6)),
        ] {
            let application =
                apply_leave(&db, employee.id, leave_type, start, end, String::new(), submitted).await?;
            decide_leave(&db, application.id, owner.id, Decision::Approve, submitted).await?;
        }
        // Pending leave is not counted
        apply_leave(&db, employee.id, LeaveType::Other, date(2024, 5, 9), date(2024, 5, 9), String::new(), submitted).await?;

        let overtime =
            apply_overtime(&db, employee.id, schedule.id, date(2024, 5, 11), String::new(), submitted).await?;
        decide_overtime(&db, overtime.id, owner.id, Decision::Approve, submitted).await?;

        let report = leave_overtime_report(&db, location.id, 3, date(2024, 5, 20)).await?;
        assert_eq!(report.total_leave_days, 4);
        assert_eq!(report.total_leave_requests, 2);

        assert_eq!(report.leave_by_month.len(), 3);
        assert_eq!(report.leave_by_month[0].days_by_type["sick"], 0);
        assert_eq!(report.leave_by_month[1].days_by_type["sick"], 3);
        assert_eq!(report.leave_by_month[2].days_by_type["personal"], 1);
        assert_eq!(report.leave_by_month[2].days_by_type["other"], 0);

        let shares: Vec<(&str, i64, f64)> = report
            .distribution
            .iter()
            .map(|s| (s.label, s.leave_days, s.percentage))
            .collect();
        assert_eq!(
            shares,
            vec![("sick", 3, 75.0), ("personal", 1, 25.0), ("other", 0, 0.0)]
        );

        assert_eq!(report.total_overtime_days, 1);
        let overtime_counts: Vec<u64> = report.overtime_by_month.iter().map(|m| m.count).collect();
        assert_eq!(overtime_counts, vec![0, 0, 1]);
        Ok(())
    }
}
