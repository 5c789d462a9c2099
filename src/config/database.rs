//! Database configuration module for `attendo`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs.
//! Parent tables are created before the tables that reference them.

use crate::entities::{
    ActivityLog, Attendance, AttendancePhoto, Employee, LeaveApplication, Loan, Location,
    OvertimeApplication, Salary, WorkSchedule,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/attendo.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(&get_database_url())
        .await
        .map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table used by the engine if it does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Location).await?;
    create_table(db, &schema, WorkSchedule).await?;
    create_table(db, &schema, Employee).await?;
    create_table(db, &schema, OvertimeApplication).await?;
    create_table(db, &schema, LeaveApplication).await?;
    create_table(db, &schema, Attendance).await?;
    create_table(db, &schema, AttendancePhoto).await?;
    create_table(db, &schema, Salary).await?;
    create_table(db, &schema, Loan).await?;
    create_table(db, &schema, ActivityLog).await?;

    Ok(())
}
