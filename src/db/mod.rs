pub mod adapter;
pub mod repository;
pub mod row;
pub mod statement;
#[cfg(test)]
pub(crate) mod testing;

pub use adapter::{ConnectionAdapter, PgConnectionAdapter};
pub use repository::{Record, Repository};
pub use row::{MapError, Row, SqlValue};

/// Errors raised by the data-access layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Anything the driver reported, passed through as-is.
    #[error(transparent)]
    Transport(#[from] sqlx::Error),
    #[error(transparent)]
    Mapping(#[from] MapError),
    #[error("database operation cancelled")]
    Cancelled,
}

impl DbError {
    /// True when the store rejected a write because of a unique constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::Transport(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }
}
