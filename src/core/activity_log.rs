//! Activity log business logic - Audit trail of administrative actions.
//!
//! Audit writes never fail the operation that triggered them: errors are logged
//! and dropped.

use crate::{
    entities::{ActivityLog, EmployeeRole, activity_log, employee},
    errors::{Error, Result},
};
use chrono::NaiveDateTime;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, warn};

/// Verb of an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// Something was created
    Add,
    /// Something was changed
    Update,
    /// Something was removed
    Delete,
}

impl AuditAction {
    /// Upper-case verb stored in the log.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

/// Writes an audit entry stamped with the time of the audited request, swallowing
/// any storage failure.
pub async fn record_activity(
    db: &DatabaseConnection,
    actor_id: i64,
    action: AuditAction,
    action_name: &str,
    entity: &str,
    description: &str,
    at: NaiveDateTime,
) {
    let entry = activity_log::ActiveModel {
        actor_id: Set(actor_id),
        action_method: Set(action.as_str().to_string()),
        action_name: Set(action_name.to_string()),
        entity: Set(entity.to_string()),
        description: Set(description.to_string()),
        created_at: Set(at),
        ..Default::default()
    };

    match entry.insert(db).await {
        Ok(saved) => debug!(log_id = saved.id, action_name, "activity recorded"),
        Err(e) => warn!(actor_id, action_name, error = %e, "failed to record activity"),
    }
}

/// Audits the action only when the actor is an admin; owners and employees are not logged.
pub(crate) async fn record_if_admin(
    db: &DatabaseConnection,
    actor: &employee::Model,
    action: AuditAction,
    action_name: &str,
    entity: &str,
    description: &str,
    at: NaiveDateTime,
) {
    if actor.role == EmployeeRole::Admin {
        record_activity(db, actor.id, action, action_name, entity, description, at).await;
    }
}

/// Lists entries created in `[from, to]`, newest first.
pub async fn list_activity(
    db: &DatabaseConnection,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Result<Vec<activity_log::Model>> {
    if from > to {
        return Err(Error::InvalidDateRange {
            start: from.to_string(),
            end: to.to_string(),
        });
    }

    ActivityLog::find()
        .filter(activity_log::Column::CreatedAt.between(from, to))
        .order_by_desc(activity_log::Column::CreatedAt)
        .order_by_desc(activity_log::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
