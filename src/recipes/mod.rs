mod dto;
pub mod handlers;
mod repo;
pub mod repo_types;

pub use dto::{RecipeIn, RecipeOut};
pub use repo_types::Recipe;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
