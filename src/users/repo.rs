use tokio_util::sync::CancellationToken;

use super::repo_types::User;
use crate::db::{ConnectionAdapter, DbError, Repository, SqlValue};

pub type UsersRepository<A> = Repository<User, A>;

impl<A: ConnectionAdapter> Repository<User, A> {
    /// Find a user by exact email.
    pub async fn find_by_email(
        &self,
        email: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<User>, DbError> {
        self.find_one_by("email", SqlValue::Text(email.to_owned()), cancel)
            .await
    }
}
