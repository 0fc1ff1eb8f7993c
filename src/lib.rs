//! Recipe catalog HTTP service: list recipes by popularity, create recipes,
//! and fetch a recipe while counting the view.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod recipes;
pub mod state;
pub mod validation;

pub use app::build_app;
pub use state::AppState;
