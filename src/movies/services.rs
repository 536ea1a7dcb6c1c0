use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    repo::MoviesRepository,
    repo_types::{Movie, MoviePatch},
};
use crate::{
    db::ConnectionAdapter,
    outcome::{ServiceOutcome, ValidationOutcome},
};

pub const DUPLICATE_TITLE: &str = "A movie with same title already exists";
pub const CREATE_FAILED: &str = "Failed creating movie";

pub struct MovieService<A> {
    repo: MoviesRepository<A>,
}

impl<A> Clone for MovieService<A> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<A: ConnectionAdapter> MovieService<A> {
    pub fn new(repo: MoviesRepository<A>) -> Self {
        Self { repo }
    }

    /// Rejects a movie whose title is already taken.
    pub async fn validate_create(
        &self,
        movie: &Movie,
        cancel: &CancellationToken,
    ) -> anyhow::Result<ValidationOutcome> {
        let mut validation = ValidationOutcome::default();
        if self.repo.get_by_title(&movie.title, cancel).await?.is_some() {
            validation.push(DUPLICATE_TITLE);
        }
        Ok(validation)
    }

    pub async fn create(
        &self,
        movie: Movie,
        cancel: &CancellationToken,
    ) -> anyhow::Result<ServiceOutcome<Movie>> {
        let validation = self.validate_create(&movie, cancel).await?;
        if validation.has_errors() {
            warn!(title = %movie.title, errors = ?validation.errors(), "movie rejected");
            return Ok(ServiceOutcome::Validation(validation));
        }

        let id = movie.id;
        match self.repo.create(movie, cancel).await {
            Ok(Some(created)) => {
                info!(movie_id = %created.id, title = %created.title, "movie created");
                Ok(ServiceOutcome::created(created))
            }
            Ok(None) => {
                error!(movie_id = %id, "insert affected no rows");
                Ok(ServiceOutcome::failed(CREATE_FAILED))
            }
            // Lost the lookup-then-insert race; the unique constraint caught it.
            Err(e) if e.is_unique_violation() => {
                warn!(movie_id = %id, "title taken by a concurrent create");
                let mut validation = ValidationOutcome::default();
                validation.push(DUPLICATE_TITLE);
                Ok(ServiceOutcome::Validation(validation))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Option<Movie>> {
        Ok(self.repo.get(id, cancel).await?)
    }

    pub async fn list_all(&self, cancel: &CancellationToken) -> anyhow::Result<Vec<Movie>> {
        Ok(self.repo.list_all(cancel).await?)
    }

    pub async fn update(
        &self,
        patch: MoviePatch,
        cancel: &CancellationToken,
    ) -> anyhow::Result<bool> {
        Ok(self.repo.update(patch, cancel).await?)
    }

    /// `None` when there is no such movie, otherwise whether the delete took.
    pub async fn delete(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Option<bool>> {
        let Some(movie) = self.repo.get(id, cancel).await? else {
            return Ok(None);
        };
        Ok(Some(self.repo.delete(&movie, cancel).await?))
    }
}
