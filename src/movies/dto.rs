use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Movie, MoviePatch};
use crate::outcome::ValidationOutcome;

/// Request body for creating a movie.
#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    pub category: String,
    #[serde(with = "time::serde::rfc3339")]
    pub release_date: OffsetDateTime,
}

impl CreateMovieRequest {
    pub fn validate(&self) -> ValidationOutcome {
        let mut v = ValidationOutcome::default();
        if self.title.trim().is_empty() {
            v.push("Title is required");
        }
        if self.category.trim().is_empty() {
            v.push("Category is required");
        }
        v
    }

    pub fn into_movie(self, id: Uuid) -> Movie {
        Movie {
            id,
            title: self.title,
            category: self.category,
            release_date: self.release_date,
        }
    }
}

/// Request body for `PUT /movies`. Omitted fields are left as stored.
#[derive(Debug, Deserialize)]
pub struct UpdateMovieRequest {
    pub movie_id: Uuid,
    pub title: Option<String>,
    pub category: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub release_date: Option<OffsetDateTime>,
}

impl UpdateMovieRequest {
    pub fn into_patch(self) -> MoviePatch {
        MoviePatch {
            id: self.movie_id,
            title: self.title,
            category: self.category,
            release_date: self.release_date,
        }
    }

    /// The create request a PUT for an unknown id falls back to.
    pub fn into_create(self) -> Option<CreateMovieRequest> {
        Some(CreateMovieRequest {
            title: self.title?,
            category: self.category?,
            release_date: self.release_date?,
        })
    }
}
