use std::future::Future;

use async_trait::async_trait;
use sqlx::{
    postgres::{PgArguments, PgPool, PgRow},
    query::Query,
    Column, Postgres, Row as _, TypeInfo, ValueRef,
};
use time::{OffsetDateTime, PrimitiveDateTime};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use super::{
    row::{MapError, Row, SqlValue},
    statement::Statement,
    DbError,
};

/// Turns one row into an entity. `None` means the caller had no row to give.
pub type Mapper<T> = fn(Option<&Row>) -> Result<T, MapError>;

/// Executes statements against the store.
///
/// Implementations open one connection per call, perform no retries and hand
/// driver errors back untouched as [`DbError::Transport`].
#[async_trait]
pub trait ConnectionAdapter: Send + Sync + 'static {
    /// Runs an insert/update/delete and returns the affected-row count.
    async fn execute_command(
        &self,
        stmt: Statement,
        cancel: &CancellationToken,
    ) -> Result<u64, DbError>;

    /// Maps the first row, if any.
    async fn execute_query_single<T: Send + 'static>(
        &self,
        stmt: Statement,
        mapper: Mapper<T>,
        cancel: &CancellationToken,
    ) -> Result<Option<T>, DbError>;

    /// Maps every row in result-set order.
    async fn execute_query_list<T: Send + 'static>(
        &self,
        stmt: Statement,
        mapper: Mapper<T>,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>, DbError>;
}

/// Races `work` against the token; cancellation drops the in-flight I/O.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, work: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, DbError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DbError::Cancelled),
        result = work => result,
    }
}

#[derive(Clone)]
pub struct PgConnectionAdapter {
    pool: PgPool,
}

impl PgConnectionAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionAdapter for PgConnectionAdapter {
    async fn execute_command(
        &self,
        stmt: Statement,
        cancel: &CancellationToken,
    ) -> Result<u64, DbError> {
        debug!(sql = stmt.sql(), params = stmt.params().len(), "execute command");
        cancellable(cancel, async {
            let mut conn = self.pool.acquire().await?;
            let done = bind(&stmt).execute(&mut *conn).await?;
            Ok::<u64, DbError>(done.rows_affected())
        })
        .await
    }

    async fn execute_query_single<T: Send + 'static>(
        &self,
        stmt: Statement,
        mapper: Mapper<T>,
        cancel: &CancellationToken,
    ) -> Result<Option<T>, DbError> {
        debug!(sql = stmt.sql(), params = stmt.params().len(), "execute query (single)");
        cancellable(cancel, async {
            let mut conn = self.pool.acquire().await?;
            let Some(pg_row) = bind(&stmt).fetch_optional(&mut *conn).await? else {
                return Ok(None);
            };
            let row = decode_row(&pg_row)?;
            Ok::<Option<T>, DbError>(Some(mapper(Some(&row))?))
        })
        .await
    }

    async fn execute_query_list<T: Send + 'static>(
        &self,
        stmt: Statement,
        mapper: Mapper<T>,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>, DbError> {
        debug!(sql = stmt.sql(), params = stmt.params().len(), "execute query (list)");
        cancellable(cancel, async {
            let mut conn = self.pool.acquire().await?;
            let pg_rows = bind(&stmt).fetch_all(&mut *conn).await?;
            let mut out = Vec::with_capacity(pg_rows.len());
            for pg_row in &pg_rows {
                let row = decode_row(pg_row)?;
                out.push(mapper(Some(&row))?);
            }
            Ok::<Vec<T>, DbError>(out)
        })
        .await
    }
}

fn bind(stmt: &Statement) -> Query<'_, Postgres, PgArguments> {
    stmt.params()
        .iter()
        .fold(sqlx::query(stmt.sql()), |query, value| match value {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(v) => query.bind(*v),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.as_str()),
            SqlValue::Uuid(v) => query.bind(*v),
            SqlValue::Timestamp(v) => query.bind(*v),
        })
}

fn decode_row(pg_row: &PgRow) -> Result<Row, sqlx::Error> {
    let mut row = Row::with_capacity(pg_row.len());
    for column in pg_row.columns() {
        let idx = column.ordinal();
        if pg_row.try_get_raw(idx)?.is_null() {
            row.push(column.name(), SqlValue::Null);
            continue;
        }
        let value = match column.type_info().name() {
            "UUID" => SqlValue::Uuid(pg_row.try_get::<Uuid, _>(idx)?),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
                SqlValue::Text(pg_row.try_get::<String, _>(idx)?)
            }
            "TIMESTAMPTZ" => SqlValue::Timestamp(pg_row.try_get::<OffsetDateTime, _>(idx)?),
            "TIMESTAMP" => {
                SqlValue::Timestamp(pg_row.try_get::<PrimitiveDateTime, _>(idx)?.assume_utc())
            }
            "BOOL" => SqlValue::Bool(pg_row.try_get::<bool, _>(idx)?),
            "INT2" => SqlValue::Int(pg_row.try_get::<i16, _>(idx)?.into()),
            "INT4" => SqlValue::Int(pg_row.try_get::<i32, _>(idx)?.into()),
            "INT8" => SqlValue::Int(pg_row.try_get::<i64, _>(idx)?),
            other => {
                return Err(sqlx::Error::ColumnDecode {
                    index: column.name().to_string(),
                    source: format!("unsupported column type {other}").into(),
                })
            }
        };
        row.push(column.name(), value);
    }
    Ok(row)
}
