//! Entity contract used by the generic repository
//!
//! An entity maps to one table. It declares the table name, the columns written on
//! save, whether deletes are soft, and how to load its associations. Validation rules
//! come from the `validator` derive.

use std::future::Future;

use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, PgConnection, Postgres};
use validator::Validate;

/// A persistable record
///
/// `load_associations` uses RPITIT (stable since Rust 1.75) so implementors can write
/// plain `async fn`.
pub trait Entity:
    for<'r> FromRow<'r, PgRow> + Validate + Send + Sync + Unpin + Sized + 'static
{
    /// Table name
    const TABLE: &'static str;

    /// Name used in logs
    const NAME: &'static str;

    /// Columns written by `save`, in `bind_columns` order; excludes `id` and the
    /// database-managed timestamps
    const COLUMNS: &'static [&'static str];

    /// Rows are hidden through `deleted_at` instead of being removed
    const SOFT_DELETE: bool = false;

    /// Primary key, `None` until persisted
    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);

    /// Push one bind per entry of [`Entity::COLUMNS`]
    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>);

    /// Fill association fields for freshly fetched rows
    fn load_associations(
        conn: &mut PgConnection,
        rows: &mut [Self],
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send {
        let _ = (conn, rows);
        async { Ok(()) }
    }
}

/// Fetch rows of `R` whose `column` is one of `ids`
///
/// Used by `load_associations` implementations to batch-load one relation in a single
/// query.
pub async fn fetch_related<R: Entity>(
    conn: &mut PgConnection,
    column: &'static str,
    mut ids: Vec<i64>,
) -> Result<Vec<R>, sqlx::Error> {
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let live = if R::SOFT_DELETE { " AND deleted_at IS NULL" } else { "" };
    let sql = format!(
        "SELECT * FROM {} WHERE {} = ANY($1){} ORDER BY id",
        R::TABLE,
        column,
        live
    );
    sqlx::query_as::<_, R>(&sql)
        .bind(ids)
        .fetch_all(&mut *conn)
        .await
}
