//! Employee business logic - Accounts that clock in at a location.

use crate::{
    entities::{Employee, EmployeeRole, employee},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Attributes of a new employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    /// Unique login name
    pub username: String,
    /// Display name
    pub name: String,
    /// Account role
    pub role: EmployeeRole,
    /// Location the employee works at
    pub location_id: i64,
    /// Initial work schedule, if already known
    pub schedule_id: Option<i64>,
}

/// Creates an active employee after checking the referenced location and schedule.
#[instrument(skip(db, new), fields(username = %new.username))]
pub async fn create_employee(db: &DatabaseConnection, new: NewEmployee) -> Result<employee::Model> {
    if new.username.trim().is_empty() {
        return Err(Error::Config {
            message: "Username cannot be empty".to_string(),
        });
    }
    crate::core::location::find_location(db, new.location_id).await?;
    if let Some(schedule_id) = new.schedule_id {
        crate::core::location::find_schedule(db, schedule_id).await?;
    }

    let employee = employee::ActiveModel {
        username: Set(new.username.trim().to_string()),
        name: Set(new.name),
        role: Set(new.role),
        location_id: Set(new.location_id),
        schedule_id: Set(new.schedule_id),
        is_active: Set(true),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    let result = employee.insert(db).await?;
    info!(employee_id = result.id, "employee created");
    Ok(result)
}

/// Finds an employee by id.
pub async fn get_employee_by_id(
    db: &DatabaseConnection,
    employee_id: i64,
) -> Result<Option<employee::Model>> {
    Employee::find_by_id(employee_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists the active employees of a location ordered by username.
pub async fn get_employees_for_location(
    db: &DatabaseConnection,
    location_id: i64,
) -> Result<Vec<employee::Model>> {
    Employee::find()
        .filter(employee::Column::LocationId.eq(location_id))
        .filter(employee::Column::IsActive.eq(true))
        .order_by_asc(employee::Column::Username)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Assigns a work schedule to an employee.
///
/// The schedule must belong to the employee's location.
#[instrument(skip(db))]
pub async fn assign_schedule(
    db: &DatabaseConnection,
    employee_id: i64,
    schedule_id: i64,
) -> Result<employee::Model> {
    let employee = find_employee(db, employee_id).await?;
    let schedule = crate::core::location::find_schedule(db, schedule_id).await?;
    if schedule.location_id != employee.location_id {
        return Err(Error::not_found("WorkSchedule", schedule_id));
    }

    let mut active: employee::ActiveModel = employee.into();
    active.schedule_id = Set(Some(schedule_id));
    active.update(db).await.map_err(Into::into)
}

pub(crate) async fn find_employee<C>(db: &C, employee_id: i64) -> Result<employee::Model>
where
    C: ConnectionTrait,
{
    Employee::find_by_id(employee_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Employee", employee_id))
}

/// Looks up the actor of an administrative action. Inactive accounts cannot act.
pub(crate) async fn find_active_actor<C>(db: &C, actor_id: i64) -> Result<employee::Model>
where
    C: ConnectionTrait,
{
    Employee::find_by_id(actor_id)
        .filter(employee::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Employee", actor_id))
}
