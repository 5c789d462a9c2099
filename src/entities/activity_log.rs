//! Activity log entity - Audit trail of administrative actions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Activity log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Employee who performed the action
    pub actor_id: i64,
    /// Verb of the action (e.g., "DELETE")
    pub action_method: String,
    /// Name of the action (e.g., "Delete Attendance")
    pub action_name: String,
    /// Affected entity type
    pub entity: String,
    /// Free-form detail
    pub description: String,
    /// When the action happened
    pub created_at: DateTime,
}

/// Activity log entries reference actors by id only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
