//! Break-slot arbitration - Bounded concurrent-break capacity per location.
//!
//! The counter lives on the location row and is only ever changed through a single
//! conditional `UPDATE` whose `WHERE` clause carries the capacity guard, so two
//! employees racing for the last slot cannot both win:
//!
//! `UPDATE locations SET current_break_count = current_break_count + 1
//!  WHERE id = ? AND current_break_count < max_break_count`

use crate::{
    entities::{Attendance, Location, attendance, location},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument, warn};

/// Takes one break slot at the location.
///
/// Fails with [`Error::BreakLimitReached`] when every slot is taken and with
/// [`Error::NotFound`] when the location does not exist.
pub async fn acquire<C>(db: &C, location_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Location::update_many()
        .col_expr(
            location::Column::CurrentBreakCount,
            Expr::col(location::Column::CurrentBreakCount).add(1),
        )
        .filter(location::Column::Id.eq(location_id))
        .filter(
            Expr::col(location::Column::CurrentBreakCount)
                .lt(Expr::col(location::Column::MaxBreakCount)),
        )
        .exec(db)
        .await?;

    if result.rows_affected == 1 {
        debug!(location_id, "break slot acquired");
        return Ok(());
    }

    let location = Location::find_by_id(location_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Location", location_id))?;

    Err(Error::BreakLimitReached {
        location_id,
        max_break_count: location.max_break_count,
    })
}

/// Returns one break slot to the location. Never drops the counter below zero.
pub async fn release<C>(db: &C, location_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Location::update_many()
        .col_expr(
            location::Column::CurrentBreakCount,
            Expr::col(location::Column::CurrentBreakCount).sub(1),
        )
        .filter(location::Column::Id.eq(location_id))
        .filter(location::Column::CurrentBreakCount.gt(0))
        .exec(db)
        .await?;

    if result.rows_affected == 1 {
        debug!(location_id, "break slot released");
        return Ok(());
    }

    if Location::find_by_id(location_id).one(db).await?.is_none() {
        return Err(Error::not_found("Location", location_id));
    }

    warn!(location_id, "break slot released while counter was already zero");
    Ok(())
}

/// Recomputes every location's break counter from the open breaks on record.
///
/// Returns the number of locations whose counter was corrected.
#[instrument(skip(db))]
pub async fn reconcile_break_counts(db: &DatabaseConnection) -> Result<usize> {
    let txn = db.begin().await?;
    let locations = Location::find().all(&txn).await?;
    let mut corrected = 0;

    for location in locations {
        let open_breaks = Attendance::find()
            .filter(attendance::Column::LocationId.eq(location.id))
            .filter(attendance::Column::BreakIn.is_not_null())
            .filter(attendance::Column::BreakOut.is_null())
            .count(&txn)
            .await?;

        let expected = i32::try_from(open_breaks)
            .unwrap_or(i32::MAX)
            .clamp(0, location.max_break_count.max(0));

        if expected != location.current_break_count {
            warn!(
                location_id = location.id,
                stored = location.current_break_count,
                expected,
                "correcting break counter"
            );
            let mut active: location::ActiveModel = location.into();
            active.current_break_count = Set(expected);
            active.update(&txn).await?;
            corrected += 1;
        }
    }

    txn.commit().await?;
    info!(corrected, "break counters reconciled");
    Ok(corrected)
}
