use std::{borrow::Cow, collections::VecDeque, error::Error as StdError, fmt, sync::Mutex};

use async_trait::async_trait;
use sqlx::error::{DatabaseError, ErrorKind};
use tokio_util::sync::CancellationToken;

use super::{
    adapter::{cancellable, ConnectionAdapter, Mapper},
    row::Row,
    statement::Statement,
    DbError,
};

/// Fake adapter: records every statement and replays scripted answers.
///
/// Commands first pop a scripted failure, then the affected-row queue (0 once
/// empty); queries pop a result set from the row queue (empty once exhausted).
#[derive(Default)]
pub(crate) struct ScriptedAdapter {
    command_errors: Mutex<VecDeque<DbError>>,
    affected: Mutex<VecDeque<u64>>,
    rows: Mutex<VecDeque<Vec<Row>>>,
    executed: Mutex<Vec<Statement>>,
}

impl ScriptedAdapter {
    pub(crate) fn push_affected(&self, count: u64) {
        self.affected.lock().unwrap().push_back(count);
    }

    /// The next command fails with `err` instead of touching any rows.
    pub(crate) fn push_command_error(&self, err: DbError) {
        self.command_errors.lock().unwrap().push_back(err);
    }

    pub(crate) fn push_rows(&self, rows: Vec<Row>) {
        self.rows.lock().unwrap().push_back(rows);
    }

    pub(crate) fn executed(&self) -> Vec<Statement> {
        self.executed.lock().unwrap().clone()
    }

    fn record(&self, stmt: Statement) {
        self.executed.lock().unwrap().push(stmt);
    }

    fn next_rows(&self) -> Vec<Row> {
        self.rows.lock().unwrap().pop_front().unwrap_or_default()
    }
}

#[async_trait]
impl ConnectionAdapter for ScriptedAdapter {
    async fn execute_command(
        &self,
        stmt: Statement,
        cancel: &CancellationToken,
    ) -> Result<u64, DbError> {
        cancellable(cancel, async {
            self.record(stmt);
            if let Some(err) = self.command_errors.lock().unwrap().pop_front() {
                return Err(err);
            }
            Ok::<_, DbError>(self.affected.lock().unwrap().pop_front().unwrap_or(0))
        })
        .await
    }

    async fn execute_query_single<T: Send + 'static>(
        &self,
        stmt: Statement,
        mapper: Mapper<T>,
        cancel: &CancellationToken,
    ) -> Result<Option<T>, DbError> {
        cancellable(cancel, async {
            self.record(stmt);
            match self.next_rows().first() {
                Some(row) => Ok::<_, DbError>(Some(mapper(Some(row))?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn execute_query_list<T: Send + 'static>(
        &self,
        stmt: Statement,
        mapper: Mapper<T>,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>, DbError> {
        cancellable(cancel, async {
            self.record(stmt);
            let mut out = Vec::new();
            for row in &self.next_rows() {
                out.push(mapper(Some(row))?);
            }
            Ok::<_, DbError>(out)
        })
        .await
    }
}

/// Driver error reporting a violated UNIQUE constraint.
#[derive(Debug)]
struct UniqueViolation {
    constraint: &'static str,
}

impl fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate key value violates unique constraint \"{}\"",
            self.constraint
        )
    }
}

impl StdError for UniqueViolation {}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed("23505"))
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }

    fn constraint(&self) -> Option<&str> {
        Some(self.constraint)
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }
}

pub(crate) fn unique_violation(constraint: &'static str) -> DbError {
    DbError::Transport(sqlx::Error::Database(Box::new(UniqueViolation { constraint })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_unique_violation_is_recognized() {
        assert!(unique_violation("movies_title_key").is_unique_violation());
        assert!(!DbError::Transport(sqlx::Error::PoolTimedOut).is_unique_violation());
        assert!(!DbError::Cancelled.is_unique_violation());
    }
}
