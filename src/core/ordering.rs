//! Contiguous 1-based positions for ordered child rows.
//!
//! Every ordered table has a unique `(parent, position)` index, so rows are
//! parked on distinct negative positions before their final values are written.

use crate::errors::{Error, Result};
use sea_orm::{prelude::*, sea_query::Expr};

/// 1-based position of the row at `index` in an ordered list.
pub(crate) fn position_at(index: usize) -> Result<i32> {
    index
        .checked_add(1)
        .and_then(|p| i32::try_from(p).ok())
        .ok_or_else(|| Error::validation("Too many rows to order"))
}

/// Index in a list of `len` rows for a requested 1-based position, clamped so
/// that out-of-range requests go to the nearest end.
pub(crate) fn insertion_index(position: i32, len: usize) -> usize {
    usize::try_from(position.saturating_sub(1)).map_or(0, |index| index.min(len))
}

/// Rewrites the positions of `ids` to `1..=ids.len()` in slice order.
///
/// All ids must share the same parent.
pub(crate) async fn renumber<E, C>(
    db: &C,
    id_column: E::Column,
    position_column: E::Column,
    ids: &[i64],
) -> Result<()>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    for (index, id) in ids.iter().enumerate() {
        let parked = -position_at(index)?;
        E::update_many()
            .col_expr(position_column, Expr::value(parked))
            .filter(id_column.eq(*id))
            .exec(db)
            .await?;
    }
    for (index, id) in ids.iter().enumerate() {
        E::update_many()
            .col_expr(position_column, Expr::value(position_at(index)?))
            .filter(id_column.eq(*id))
            .exec(db)
            .await?;
    }
    Ok(())
}
