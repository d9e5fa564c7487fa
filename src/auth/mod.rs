use crate::state::AppState;
use axum::Router;

pub mod claims;
pub mod cookie;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
mod repo_types;

pub use claims::Identity;
pub use extractors::AuthUser;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
