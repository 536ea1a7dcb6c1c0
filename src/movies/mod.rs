use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod mapper;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use services::MovieService;

pub fn router() -> Router<AppState> {
    handlers::movies_routes()
}
