use std::{marker::PhantomData, sync::Arc};

use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    adapter::ConnectionAdapter,
    row::{MapError, Row, SqlValue},
    statement::{placeholders, Statement},
    DbError,
};
use crate::clock::Clock;

/// Upper bound on rows returned by [`Repository::list_all`].
pub const LIST_LIMIT: usize = 100;

/// What an entity has to expose to be stored through a [`Repository`].
pub trait Record: Sized + Send + Sync + 'static {
    /// Partial update; absent fields keep their stored value.
    type Patch: Send + Sync;

    const TABLE: &'static str;
    /// Columns written on insert and read back by selects. `id` comes first.
    const COLUMNS: &'static [&'static str];
    /// Columns rewritten by an update, in `update_values` order.
    const UPDATE_COLUMNS: &'static [&'static str];

    fn id(&self) -> Uuid;
    fn insert_values(&self) -> Vec<SqlValue>;
    fn update_values(&self) -> Vec<SqlValue>;
    fn map_row(row: Option<&Row>) -> Result<Self, MapError>;

    fn patch_id(patch: &Self::Patch) -> Uuid;
    fn apply(&mut self, patch: Self::Patch);

    /// Called right before the insert is built.
    fn stamp_created(&mut self, _now: OffsetDateTime) {}
}

pub(crate) fn insert_statement<R: Record>(record: &R) -> Statement {
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        R::TABLE,
        R::COLUMNS.join(", "),
        placeholders(0, R::COLUMNS.len()).join(", ")
    );
    Statement::new(sql).bind_all(record.insert_values())
}

pub(crate) fn update_statement<R: Record>(record: &R) -> Statement {
    let n = R::UPDATE_COLUMNS.len();
    let sets: Vec<String> = R::UPDATE_COLUMNS
        .iter()
        .zip(placeholders(0, n))
        .map(|(column, p)| format!("{column} = {p}"))
        .collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ${}",
        R::TABLE,
        sets.join(", "),
        n + 1
    );
    Statement::new(sql)
        .bind_all(record.update_values())
        .bind(SqlValue::Uuid(record.id()))
}

pub(crate) fn delete_statement<R: Record>(id: Uuid) -> Statement {
    Statement::new(format!("DELETE FROM {} WHERE id = $1", R::TABLE)).bind(SqlValue::Uuid(id))
}

pub(crate) fn select_by_statement<R: Record>(column: &'static str, value: SqlValue) -> Statement {
    Statement::new(format!(
        "SELECT {} FROM {} WHERE {column} = $1 LIMIT 1",
        R::COLUMNS.join(", "),
        R::TABLE
    ))
    .bind(value)
}

pub(crate) fn select_all_statement<R: Record>() -> Statement {
    Statement::new(format!(
        "SELECT {} FROM {} LIMIT {LIST_LIMIT}",
        R::COLUMNS.join(", "),
        R::TABLE
    ))
}

/// CRUD skeleton shared by every entity.
pub struct Repository<R, A> {
    adapter: Arc<A>,
    clock: Arc<dyn Clock>,
    _record: PhantomData<fn() -> R>,
}

impl<R, A> Clone for Repository<R, A> {
    fn clone(&self) -> Self {
        Self {
            adapter: Arc::clone(&self.adapter),
            clock: Arc::clone(&self.clock),
            _record: PhantomData,
        }
    }
}

impl<R: Record, A: ConnectionAdapter> Repository<R, A> {
    pub fn new(adapter: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            adapter,
            clock,
            _record: PhantomData,
        }
    }

    /// Inserts `record`; hands it back only if the store reports a written row.
    pub async fn create(
        &self,
        mut record: R,
        cancel: &CancellationToken,
    ) -> Result<Option<R>, DbError> {
        record.stamp_created(self.clock.now_utc());
        let affected = self
            .adapter
            .execute_command(insert_statement(&record), cancel)
            .await?;
        debug!(table = R::TABLE, id = %record.id(), affected, "create");
        Ok((affected > 0).then_some(record))
    }

    pub async fn get(&self, id: Uuid, cancel: &CancellationToken) -> Result<Option<R>, DbError> {
        self.find_one_by("id", SqlValue::Uuid(id), cancel).await
    }

    pub async fn list_all(&self, cancel: &CancellationToken) -> Result<Vec<R>, DbError> {
        self.adapter
            .execute_query_list(select_all_statement::<R>(), R::map_row, cancel)
            .await
    }

    /// Read-modify-write: the stored row is fetched, the patch laid over it and
    /// the merged entity written back. A missing row is never created.
    pub async fn update(&self, patch: R::Patch, cancel: &CancellationToken) -> Result<bool, DbError> {
        let id = R::patch_id(&patch);
        let Some(mut current) = self.get(id, cancel).await? else {
            warn!(table = R::TABLE, %id, "update target not found");
            return Ok(false);
        };
        current.apply(patch);
        let affected = self
            .adapter
            .execute_command(update_statement(&current), cancel)
            .await?;
        debug!(table = R::TABLE, %id, affected, "update");
        Ok(affected > 0)
    }

    pub async fn delete(&self, record: &R, cancel: &CancellationToken) -> Result<bool, DbError> {
        let affected = self
            .adapter
            .execute_command(delete_statement::<R>(record.id()), cancel)
            .await?;
        debug!(table = R::TABLE, id = %record.id(), affected, "delete");
        Ok(affected > 0)
    }

    /// Single-row lookup on one column.
    pub(crate) async fn find_one_by(
        &self,
        column: &'static str,
        value: SqlValue,
        cancel: &CancellationToken,
    ) -> Result<Option<R>, DbError> {
        self.adapter
            .execute_query_single(select_by_statement::<R>(column, value), R::map_row, cancel)
            .await
    }
}
