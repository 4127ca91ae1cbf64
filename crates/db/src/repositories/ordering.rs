//! Transactional position changes for ordered collections.
//!
//! Both functions take a connection that is already inside a transaction
//! (`&mut *tx`). Rows are locked with `SELECT ... FOR UPDATE` before the
//! planner decides what to write, so two concurrent moves in the same
//! collection serialize instead of interleaving. The tables' deferred
//! `uq_*_position` constraints are checked when the caller commits.
//!
//! Row locks alone do not close every race: a move that blocked on the
//! previous holder of a slot does not see a record a concurrent transaction
//! moved into that slot, and fails at commit. Callers wrap such moves in
//! [`retry_position_conflicts`] to re-run them against fresh rows.

use std::future::Future;

use sqlx::PgConnection;
use summit_core::error::CoreError;
use summit_core::ordering::{plan_swap, Slot, SwapPlan};
use summit_core::types::{DbId, Position};

use crate::error::DbError;

/// Tables whose rows carry a user-controlled `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderedTable {
    Committees,
    Secretariates,
}

impl OrderedTable {
    /// Table name. Only these literals are ever spliced into SQL.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Committees => "committees",
            Self::Secretariates => "secretariates",
        }
    }

    /// Entity label used in `NotFound` errors.
    pub fn entity(self) -> &'static str {
        match self {
            Self::Committees => "Committee",
            Self::Secretariates => "Secretariate",
        }
    }
}

/// Attempts made by [`retry_position_conflicts`] before giving up.
pub const POSITION_ATTEMPTS: u32 = 3;

/// Whether `err` is a unique violation on a `uq_*_position` constraint.
pub fn is_position_conflict(err: &sqlx::Error) -> bool {
    let sqlx::Error::Database(db_err) = err else {
        return false;
    };
    db_err.code().as_deref() == Some("23505")
        && db_err
            .constraint()
            .is_some_and(|c| c.starts_with("uq_") && c.ends_with("_position"))
}

/// Run `attempt` (one whole transaction) until it commits without a
/// position collision, at most [`POSITION_ATTEMPTS`] times.
///
/// A collision that survives every attempt becomes `CoreError::Conflict`.
pub async fn retry_position_conflicts<T, F, Fut>(
    table: OrderedTable,
    mut attempt: F,
) -> Result<T, DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let mut tries = 1;
    loop {
        match attempt().await {
            Err(DbError::Sqlx(e)) if is_position_conflict(&e) => {
                if tries >= POSITION_ATTEMPTS {
                    tracing::warn!(table = table.as_str(), tries, "Position conflict persisted");
                    let msg = "That position is already taken".to_string();
                    return Err(CoreError::Conflict(msg).into());
                }
                tracing::debug!(table = table.as_str(), tries, "Position conflict, retrying");
                tries += 1;
            }
            other => return other,
        }
    }
}

async fn lock_by_id(
    conn: &mut PgConnection,
    table: OrderedTable,
    id: DbId,
) -> Result<Option<Slot>, sqlx::Error> {
    let query = format!(
        "SELECT id, position FROM {} WHERE id = $1 FOR UPDATE",
        table.as_str()
    );
    let row: Option<(DbId, Position)> = sqlx::query_as(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(|(id, position)| Slot { id, position }))
}

async fn lock_by_position(
    conn: &mut PgConnection,
    table: OrderedTable,
    position: Position,
    exclude_id: DbId,
) -> Result<Option<Slot>, sqlx::Error> {
    let query = format!(
        "SELECT id, position FROM {} WHERE position = $1 AND id <> $2 FOR UPDATE",
        table.as_str()
    );
    let row: Option<(DbId, Position)> = sqlx::query_as(&query)
        .bind(position)
        .bind(exclude_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(|(id, position)| Slot { id, position }))
}

async fn set_position(
    conn: &mut PgConnection,
    table: OrderedTable,
    id: DbId,
    position: Position,
) -> Result<u64, sqlx::Error> {
    let query = format!("UPDATE {} SET position = $2 WHERE id = $1", table.as_str());
    let result = sqlx::query(&query)
        .bind(id)
        .bind(position)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Move record `id` to `requested`, swapping with the current holder.
///
/// Returns `None` (and writes nothing) if the record does not exist.
pub async fn swap_position(
    conn: &mut PgConnection,
    table: OrderedTable,
    id: DbId,
    requested: Position,
) -> Result<Option<SwapPlan>, DbError> {
    let Some(target) = lock_by_id(conn, table, id).await? else {
        return Ok(None);
    };
    let holder = lock_by_position(conn, table, requested, id).await?;

    let plan = plan_swap(target, requested, holder)?;
    for m in plan.moves() {
        set_position(conn, table, m.id, m.to).await?;
    }

    if let SwapPlan::Moves(moves) = &plan {
        tracing::debug!(
            table = table.as_str(),
            id,
            from = target.position,
            to = requested,
            displaced = moves.len() > 1,
            "Swapped positions"
        );
    }
    Ok(Some(plan))
}

/// Assign explicit positions to several records.
///
/// Entries must already have passed
/// [`validate_reorder`](summit_core::ordering::validate_reorder). Fails with
/// `NotFound` on the first unknown id; the caller's transaction is then
/// dropped and nothing is written.
pub async fn reorder(
    conn: &mut PgConnection,
    table: OrderedTable,
    entries: &[Slot],
) -> Result<(), DbError> {
    // Lock in id order so concurrent bulk reorders cannot deadlock.
    let mut ids: Vec<DbId> = entries.iter().map(|e| e.id).collect();
    ids.sort_unstable();
    let query = format!(
        "SELECT id FROM {} WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        table.as_str()
    );
    let found: Vec<DbId> = sqlx::query_scalar(&query)
        .bind(ids.as_slice())
        .fetch_all(&mut *conn)
        .await?;

    if let Some(missing) = ids.iter().find(|id| found.binary_search(id).is_err()) {
        return Err(CoreError::NotFound {
            entity: table.entity(),
            id: *missing,
        }
        .into());
    }

    for entry in entries {
        set_position(conn, table, entry.id, entry.position).await?;
    }

    tracing::debug!(table = table.as_str(), count = entries.len(), "Reordered records");
    Ok(())
}
