use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::outcome::{EntityOutcome, ServiceOutcome, ValidationOutcome};

#[derive(Debug, Serialize)]
pub struct ErrorsBody {
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub(crate) const INTERNAL_ERROR: &str = "Internal server error";

/// Logs the cause; the client only sees a generic message.
pub(crate) fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.into())
}

pub(crate) fn validation_problem(validation: ValidationOutcome) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorsBody {
            errors: validation.into_errors(),
        }),
    )
        .into_response()
}

/// 201 with a `Location` header, 400 for rejected input, 500 for a failed write.
pub(crate) fn creation_response<T: Serialize>(
    outcome: ServiceOutcome<T>,
    location: impl FnOnce(&T) -> String,
) -> Response {
    match outcome {
        ServiceOutcome::Validation(validation) => validation_problem(validation),
        ServiceOutcome::Entity(EntityOutcome::Failed(error)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error })).into_response()
        }
        ServiceOutcome::Entity(EntityOutcome::Created(entity)) => {
            let uri = location(&entity);
            (StatusCode::CREATED, [(header::LOCATION, uri)], Json(entity)).into_response()
        }
    }
}
