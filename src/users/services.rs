use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    repo::UsersRepository,
    repo_types::{User, UserPatch},
};
use crate::{
    auth::password::{hash_password, verify_password},
    db::ConnectionAdapter,
    outcome::{ServiceOutcome, ValidationOutcome},
};

pub const DUPLICATE_EMAIL: &str = "A user with same email already exists";
pub const CREATE_FAILED: &str = "Failed creating user";

/// Requested changes to a user; the password arrives in plain text.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct UserService<A> {
    repo: UsersRepository<A>,
}

impl<A> Clone for UserService<A> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<A: ConnectionAdapter> UserService<A> {
    pub fn new(repo: UsersRepository<A>) -> Self {
        Self { repo }
    }

    /// Rejects a user whose email is already registered.
    pub async fn validate_create(
        &self,
        user: &User,
        cancel: &CancellationToken,
    ) -> anyhow::Result<ValidationOutcome> {
        let mut validation = ValidationOutcome::default();
        if self.repo.find_by_email(&user.email, cancel).await?.is_some() {
            validation.push(DUPLICATE_EMAIL);
        }
        Ok(validation)
    }

    pub async fn create(
        &self,
        mut user: User,
        password: &str,
        cancel: &CancellationToken,
    ) -> anyhow::Result<ServiceOutcome<User>> {
        let validation = self.validate_create(&user, cancel).await?;
        if validation.has_errors() {
            warn!(email = %user.email, "email already registered");
            return Ok(ServiceOutcome::Validation(validation));
        }

        user.password_hash = hash_password(password)?;

        let id = user.id;
        match self.repo.create(user, cancel).await {
            Ok(Some(created)) => {
                info!(user_id = %created.id, email = %created.email, "user registered");
                Ok(ServiceOutcome::created(created))
            }
            Ok(None) => {
                error!(user_id = %id, "insert affected no rows");
                Ok(ServiceOutcome::failed(CREATE_FAILED))
            }
            // Lost the lookup-then-insert race; the unique constraint caught it.
            Err(e) if e.is_unique_violation() => {
                warn!(user_id = %id, "email taken by a concurrent create");
                let mut validation = ValidationOutcome::default();
                validation.push(DUPLICATE_EMAIL);
                Ok(ServiceOutcome::Validation(validation))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The user whose email and password both match, if any.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Option<User>> {
        let Some(user) = self.repo.find_by_email(email, cancel).await? else {
            warn!(%email, "login unknown email");
            return Ok(None);
        };

        match verify_password(password, &user.password_hash) {
            Ok(true) => {
                info!(user_id = %user.id, "user logged in");
                Ok(Some(user))
            }
            Ok(false) => {
                warn!(user_id = %user.id, "login invalid password");
                Ok(None)
            }
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "stored hash unusable; login refused");
                Ok(None)
            }
        }
    }

    pub async fn update(
        &self,
        changes: UserChanges,
        cancel: &CancellationToken,
    ) -> anyhow::Result<bool> {
        let password_hash = changes
            .password
            .as_deref()
            .map(hash_password)
            .transpose()?;
        let patch = UserPatch {
            id: changes.id,
            name: changes.name,
            email: changes.email,
            password_hash,
        };
        Ok(self.repo.update(patch, cancel).await?)
    }

    pub async fn find_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Option<User>> {
        Ok(self.repo.get(id, cancel).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::datetime;

    use super::*;
    use crate::{
        clock::FixedClock,
        db::{
            testing::{unique_violation, ScriptedAdapter},
            DbError, Record, Repository, Row, SqlValue,
        },
        outcome::EntityOutcome,
    };

    fn service(adapter: &Arc<ScriptedAdapter>) -> UserService<ScriptedAdapter> {
        UserService::new(Repository::new(
            Arc::clone(adapter),
            Arc::new(FixedClock(datetime!(2024-06-01 09:15:00 UTC))),
        ))
    }

    fn row_of(u: &User) -> Row {
        User::COLUMNS.iter().copied().zip(u.insert_values()).collect()
    }

    fn stored_with_password(password: &str) -> User {
        User {
            password_hash: hash_password(password).unwrap(),
            created_date: datetime!(2023-01-01 00:00 UTC),
            ..User::new("Ada", "a@b.com")
        }
    }

    #[tokio::test]
    async fn create_hashes_password_before_insert() {
        let adapter = Arc::new(ScriptedAdapter::default());
        adapter.push_affected(1);

        let outcome = service(&adapter)
            .create(User::new("Ada", "a@b.com"), "hunter22", &CancellationToken::new())
            .await
            .unwrap();
        let created = outcome.into_entity().expect("created");
        assert_ne!(created.password_hash, "hunter22");
        assert!(verify_password("hunter22", &created.password_hash).unwrap());
        assert_eq!(created.created_date, datetime!(2024-06-01 09:15:00 UTC));

        let insert = adapter.executed().pop().unwrap();
        assert_eq!(
            insert.params()[3],
            SqlValue::Text(created.password_hash.clone())
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_a_validation_outcome() {
        let adapter = Arc::new(ScriptedAdapter::default());
        adapter.push_rows(vec![row_of(&stored_with_password("x"))]);

        let outcome = service(&adapter)
            .create(User::new("Bob", "a@b.com"), "pw", &CancellationToken::new())
            .await
            .unwrap();
        match outcome {
            ServiceOutcome::Validation(v) => assert_eq!(v.errors(), &[DUPLICATE_EMAIL]),
            other => panic!("expected validation outcome, got {other:?}"),
        }
        assert_eq!(adapter.executed().len(), 1);
    }

    #[tokio::test]
    async fn zero_rows_written_is_a_failed_outcome() {
        let adapter = Arc::new(ScriptedAdapter::default());
        adapter.push_affected(0);

        let outcome = service(&adapter)
            .create(User::new("Ada", "a@b.com"), "pw", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ServiceOutcome::Entity(EntityOutcome::Failed(CREATE_FAILED.into()))
        );
    }

    #[tokio::test]
    async fn login_requires_both_email_and_password() {
        let stored = stored_with_password("s3cret-pw");
        let adapter = Arc::new(ScriptedAdapter::default());
        adapter.push_rows(vec![row_of(&stored)]);
        adapter.push_rows(vec![row_of(&stored)]);
        let svc = service(&adapter);
        let cancel = CancellationToken::new();

        let ok = svc.login("a@b.com", "s3cret-pw", &cancel).await.unwrap();
        assert_eq!(ok, Some(stored));

        let wrong = svc.login("a@b.com", "S3cret-pw", &cancel).await.unwrap();
        assert!(wrong.is_none());

        // queue is empty now: unknown email
        let unknown = svc.login("x@b.com", "s3cret-pw", &cancel).await.unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn login_refuses_unhashed_legacy_rows() {
        let legacy = User {
            password_hash: "plaintext".into(),
            ..stored_with_password("unused")
        };
        let adapter = Arc::new(ScriptedAdapter::default());
        adapter.push_rows(vec![row_of(&legacy)]);

        let res = service(&adapter)
            .login("a@b.com", "plaintext", &CancellationToken::new())
            .await
            .unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn update_hashes_new_password_and_keeps_the_rest() {
        let stored = stored_with_password("old-pw");
        let adapter = Arc::new(ScriptedAdapter::default());
        adapter.push_rows(vec![row_of(&stored)]);
        adapter.push_affected(1);

        let changes = UserChanges {
            id: stored.id,
            password: Some("new-pw-123".into()),
            ..Default::default()
        };
        assert!(service(&adapter)
            .update(changes, &CancellationToken::new())
            .await
            .unwrap());

        let write = adapter.executed().pop().unwrap();
        assert_eq!(write.params()[0], SqlValue::Text("Ada".into()));
        assert_eq!(write.params()[1], SqlValue::Text("a@b.com".into()));
        let SqlValue::Text(new_hash) = &write.params()[2] else {
            panic!("hash should be text");
        };
        assert!(verify_password("new-pw-123", new_hash).unwrap());
    }

    #[tokio::test]
    async fn find_by_id_unknown_is_none() {
        let adapter = Arc::new(ScriptedAdapter::default());
        let res = service(&adapter)
            .find_by_id(Uuid::new_v4(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn unique_violation_on_insert_is_a_duplicate_email() {
        let adapter = Arc::new(ScriptedAdapter::default());
        adapter.push_command_error(unique_violation("users_email_key"));

        let outcome = service(&adapter)
            .create(User::new("Ada", "a@b.com"), "hunter22", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ServiceOutcome::Validation(vec![DUPLICATE_EMAIL.to_string()].into())
        );
    }

    #[tokio::test]
    async fn other_insert_failures_propagate() {
        let adapter = Arc::new(ScriptedAdapter::default());
        adapter.push_command_error(DbError::Transport(sqlx::Error::PoolTimedOut));

        let err = service(&adapter)
            .create(User::new("Ada", "a@b.com"), "hunter22", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::Transport(sqlx::Error::PoolTimedOut))
        ));
    }
}
