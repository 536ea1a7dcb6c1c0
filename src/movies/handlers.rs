use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateMovieRequest, UpdateMovieRequest},
    repo_types::Movie,
};
use crate::{
    auth::jwt::AuthUser,
    outcome::ValidationOutcome,
    problem::{creation_response, internal, validation_problem},
    state::AppState,
};

pub fn movies_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/movies",
            get(list_movies).post(create_movie).put(update_movie),
        )
        .route("/movies/:id", get(get_movie).delete(delete_movie))
}

#[instrument(skip(state))]
pub async fn list_movies(
    State(state): State<AppState>,
) -> Result<Json<Vec<Movie>>, (StatusCode, String)> {
    let cancel = state.request_token();
    let movies = state.movies.list_all(&cancel).await.map_err(internal)?;
    Ok(Json(movies))
}

#[instrument(skip(state))]
pub async fn get_movie(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Movie>, (StatusCode, String)> {
    let cancel = state.request_token();
    match state.movies.find_by_id(id, &cancel).await.map_err(internal)? {
        Some(movie) => Ok(Json(movie)),
        None => Err((StatusCode::NOT_FOUND, "Movie not found".into())),
    }
}

#[instrument(skip(state, payload))]
pub async fn create_movie(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateMovieRequest>,
) -> Result<Response, (StatusCode, String)> {
    let validation = payload.validate();
    if validation.has_errors() {
        warn!(%user_id, "invalid create movie request");
        return Ok(validation_problem(validation));
    }

    let cancel = state.request_token();
    let outcome = state
        .movies
        .create(payload.into_movie(Uuid::new_v4()), &cancel)
        .await
        .map_err(internal)?;
    Ok(creation_response(outcome, |m| format!("/movies/{}", m.id)))
}

/// Updates the movie if it exists, otherwise creates it under a fresh id.
#[instrument(skip(state, payload))]
pub async fn update_movie(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateMovieRequest>,
) -> Result<Response, (StatusCode, String)> {
    let cancel = state.request_token();
    let existing = state
        .movies
        .find_by_id(payload.movie_id, &cancel)
        .await
        .map_err(internal)?;

    if existing.is_some() {
        let movie_id = payload.movie_id;
        let updated = state
            .movies
            .update(payload.into_patch(), &cancel)
            .await
            .map_err(internal)?;
        if !updated {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed updating movie".into(),
            ));
        }
        info!(%movie_id, %user_id, "movie updated");
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let Some(create) = payload.into_create() else {
        let mut validation = ValidationOutcome::default();
        validation.push("Title, category and release_date are required to create a movie");
        return Ok(validation_problem(validation));
    };
    let validation = create.validate();
    if validation.has_errors() {
        return Ok(validation_problem(validation));
    }

    let outcome = state
        .movies
        .create(create.into_movie(Uuid::new_v4()), &cancel)
        .await
        .map_err(internal)?;
    Ok(creation_response(outcome, |m| format!("/movies/{}", m.id)))
}

#[instrument(skip(state))]
pub async fn delete_movie(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let cancel = state.request_token();
    match state.movies.delete(id, &cancel).await.map_err(internal)? {
        None => Err((StatusCode::NOT_FOUND, "Movie not found".into())),
        Some(false) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed deleting movie".into(),
        )),
        Some(true) => {
            info!(movie_id = %id, %user_id, "movie deleted");
            Ok(StatusCode::NO_CONTENT)
        }
    }
}
