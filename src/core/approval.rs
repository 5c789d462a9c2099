//! Approval helpers shared by leave and overtime applications.

use crate::{
    entities::ApprovalStatus,
    errors::{Error, Result},
};

/// Outcome chosen by an approver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Grant the application
    Approve,
    /// Turn the application down
    Reject,
}

impl Decision {
    /// Status the application moves to.
    #[must_use]
    pub const fn status(self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// Fails with [`Error::ApplicationNotPending`] unless `status` is `PENDING`.
pub(crate) fn ensure_pending(entity: &'static str, id: i64, status: ApprovalStatus) -> Result<()> {
    if status == ApprovalStatus::Pending {
        Ok(())
    } else {
        Err(Error::ApplicationNotPending {
            entity,
            id,
            status: status.to_string(),
        })
    }
}
