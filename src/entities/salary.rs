//! Salary entity - A daily salary amount effective from a given date.
//!
//! Records are never updated; a raise is a new row with a later effective date.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Salary database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "salaries")]
pub struct Model {
    /// Unique identifier for the salary record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Employee the salary applies to
    pub employee_id: i64,
    /// Location that pays it
    pub location_id: i64,
    /// Amount earned per worked shift
    pub amount: i64,
    /// First day this amount applies
    pub effective_date: Date,
    /// When the record was written
    pub created_at: DateTime,
}

/// Defines relationships between Salary and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each salary belongs to one employee
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
