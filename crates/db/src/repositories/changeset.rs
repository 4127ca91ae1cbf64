//! Turn a [`ChangeSet`] into a single parameterized `UPDATE`.
//!
//! Column names come from the diff builders in `models`, which only ever
//! pass string literals. Values are always bound, never interpolated.

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{Executor, FromRow, Postgres};
use summit_core::diff::{ChangeSet, FieldValue};
use summit_core::types::DbId;

/// Build `UPDATE <table> SET a = $2, b = $3 WHERE id = $1 RETURNING <columns>`.
///
/// Returns `None` for an empty change set.
pub fn update_sql(table: &str, columns: &str, changes: &ChangeSet) -> Option<String> {
    if changes.is_empty() {
        return None;
    }
    let assignments = changes
        .iter()
        .enumerate()
        .map(|(i, change)| format!("{} = ${}", change.field, i + 2))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "UPDATE {table} SET {assignments} WHERE id = $1 RETURNING {columns}"
    ))
}

fn bind_value<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    value: &FieldValue,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    match value {
        FieldValue::Text(v) => query.bind(v.clone()),
        FieldValue::Int(v) => query.bind(*v),
        FieldValue::Date(v) => query.bind(*v),
        FieldValue::Time(v) => query.bind(*v),
    }
}

/// Apply `changes` to row `id` of `table`.
///
/// Returns the updated row, or `None` if no row has that id. An empty
/// change set performs no write and returns `None`; callers check
/// [`ChangeSet::is_empty`] first.
pub async fn apply<'e, O, E>(
    executor: E,
    table: &'static str,
    columns: &'static str,
    id: DbId,
    changes: &ChangeSet,
) -> Result<Option<O>, sqlx::Error>
where
    O: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    E: Executor<'e, Database = Postgres>,
{
    let Some(sql) = update_sql(table, columns, changes) else {
        return Ok(None);
    };

    let mut query = sqlx::query_as::<_, O>(&sql).bind(id);
    for change in changes {
        query = bind_value(query, &change.value);
    }

    tracing::debug!(table, id, fields = ?changes.fields(), "Applying field changes");
    query.fetch_optional(executor).await
}
