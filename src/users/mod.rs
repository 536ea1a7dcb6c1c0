use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod mapper;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo_types::User;
pub use services::UserService;

pub fn router() -> Router<AppState> {
    handlers::users_routes()
}
