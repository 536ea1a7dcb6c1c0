use tokio_util::sync::CancellationToken;

use super::repo_types::Movie;
use crate::db::{ConnectionAdapter, DbError, Repository, SqlValue};

pub type MoviesRepository<A> = Repository<Movie, A>;

impl<A: ConnectionAdapter> Repository<Movie, A> {
    /// Find a movie by its exact title.
    pub async fn get_by_title(
        &self,
        title: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Movie>, DbError> {
        self.find_one_by("title", SqlValue::Text(title.to_owned()), cancel)
            .await
    }
}
