pub mod dto;
pub mod handlers;
pub mod repo;
pub mod validate;

use crate::state::AppState;
use axum::Router;

pub use repo::Point;

pub fn router() -> Router<AppState> {
    handlers::point_routes()
}
