pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod points;
pub mod state;

pub use app::{build_app, serve};
pub use state::AppState;
