use axum::{
    extract::{rejection::PathRejection, Path},
    routing::get,
    Json, Router,
};
use tracing::{debug, info, instrument, warn};

use super::{
    dto::{RecipeIn, RecipeOut},
    repo_types::Recipe,
};
use crate::{
    db::Session,
    error::{ApiError, ApiResult, FieldError},
    state::AppState,
    validation::ValidatedJson,
};

pub const NOT_FOUND_MESSAGE: &str = "Recipe not found";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/:id", get(get_recipe))
}

// --- handlers ---

/// GET /recipes
#[instrument(skip(session))]
pub async fn list_recipes(mut session: Session) -> ApiResult<Json<Vec<RecipeOut>>> {
    let recipes = Recipe::list_popular(session.conn()).await?;
    debug!(count = recipes.len(), "listed recipes");
    Ok(Json(recipes.into_iter().map(RecipeOut::from).collect()))
}

/// POST /recipes
#[instrument(skip_all)]
pub async fn create_recipe(
    mut session: Session,
    ValidatedJson(body): ValidatedJson<RecipeIn>,
) -> ApiResult<Json<RecipeOut>> {
    let recipe = Recipe::create(session.conn(), &body.as_new()).await?;
    session.commit().await?;
    info!(recipe_id = recipe.id, title = %recipe.title, "recipe created");
    Ok(Json(recipe.into()))
}

/// GET /recipes/:id, counting one view
#[instrument(skip_all)]
pub async fn get_recipe(
    mut session: Session,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<RecipeOut>> {
    let Path(id) = id.map_err(|rejection| {
        ApiError::Validation(vec![FieldError::new(
            &["path", "recipe_id"],
            rejection.body_text(),
            "int_parsing",
        )])
    })?;

    let Some(recipe) = Recipe::record_view(session.conn(), id).await? else {
        warn!(recipe_id = id, "recipe not found");
        return Err(ApiError::NotFound(NOT_FOUND_MESSAGE.into()));
    };
    session.commit().await?;
    debug!(recipe_id = id, views = recipe.views, "recipe viewed");
    Ok(Json(recipe.into()))
}
