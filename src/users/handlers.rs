use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreateUserRequest, LoginRequest, LoginResponse, PublicUser, UpdateUserRequest};
use crate::{
    auth::jwt::{AuthUser, JwtKeys},
    outcome::ValidationOutcome,
    problem::{creation_response, internal, validation_problem},
    state::AppState,
};

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).put(update_user))
        .route("/users/login", post(login))
        .route("/users/:id", get(get_user))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<Response, (StatusCode, String)> {
    payload.normalize();
    let validation = payload.validate();
    if validation.has_errors() {
        warn!(email = %payload.email, "invalid registration request");
        return Ok(validation_problem(validation));
    }

    let cancel = state.request_token();
    let (user, password) = payload.into_parts();
    let outcome = state
        .users
        .create(user, &password, &cancel)
        .await
        .map_err(internal)?;
    Ok(creation_response(outcome, |u| format!("/users/{}", u.id)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    let cancel = state.request_token();
    let Some(user) = state
        .users
        .login(&payload.email, &payload.password, &cancel)
        .await
        .map_err(internal)?
    else {
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    };

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(&user).map_err(internal)?;

    Ok(Json(LoginResponse {
        access_token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let cancel = state.request_token();
    match state.users.find_by_id(id, &cancel).await.map_err(internal)? {
        Some(user) => Ok(Json(user.into())),
        None => Err((StatusCode::NOT_FOUND, "User not found".into())),
    }
}

/// Only the account owner may change an existing user.
fn ensure_self(caller: Uuid, target: Uuid) -> Result<(), (StatusCode, String)> {
    if caller == target {
        return Ok(());
    }
    warn!(%caller, %target, "update of another user refused");
    Err((StatusCode::FORBIDDEN, "Cannot modify another user".into()))
}

/// Updates the user if it exists, otherwise registers it under a fresh id.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(mut payload): Json<UpdateUserRequest>,
) -> Result<Response, (StatusCode, String)> {
    payload.normalize();
    let validation = payload.validate();
    if validation.has_errors() {
        return Ok(validation_problem(validation));
    }

    let cancel = state.request_token();
    let existing = state
        .users
        .find_by_id(payload.user_id, &cancel)
        .await
        .map_err(internal)?;

    if existing.is_some() {
        let user_id = payload.user_id;
        ensure_self(caller, user_id)?;
        let updated = state
            .users
            .update(payload.into_changes(), &cancel)
            .await
            .map_err(internal)?;
        if !updated {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed updating user".into(),
            ));
        }
        info!(%user_id, %caller, "user updated");
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let Some(create) = payload.into_create() else {
        let mut validation = ValidationOutcome::default();
        validation.push("Name, email and password are required to create a user");
        return Ok(validation_problem(validation));
    };

    let (user, password) = create.into_parts();
    let outcome = state
        .users
        .create(user, &password, &cancel)
        .await
        .map_err(internal)?;
    Ok(creation_response(outcome, |u| format!("/users/{}", u.id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_may_only_update_themselves() {
        let me = Uuid::new_v4();
        assert!(ensure_self(me, me).is_ok());

        let err = ensure_self(me, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.0, StatusCode::FORBIDDEN);
    }
}
