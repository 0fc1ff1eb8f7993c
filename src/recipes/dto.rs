use serde::Serialize;
use validator::Validate;

use super::repo_types::{NewRecipe, Recipe};
use crate::validation::{FromBody, Fields};

/// Body of `POST /recipes`.
#[derive(Debug, Clone, Validate)]
pub struct RecipeIn {
    #[validate(length(
        min = 1,
        code = "string_too_short",
        message = "String should have at least 1 character"
    ))]
    pub title: String,
    #[validate(range(
        min = 2,
        code = "greater_than",
        message = "Input should be greater than 1"
    ))]
    pub cooking_time: i64,
    pub ingredients: String, // comma separated by convention
    pub description: String,
}

impl FromBody for RecipeIn {
    fn from_fields(fields: &mut Fields<'_>) -> Option<Self> {
        let title = fields.required("title");
        let cooking_time = fields.integer("cooking_time");
        let ingredients = fields.required("ingredients");
        let description = fields.required("description");
        Some(Self {
            title: title?,
            cooking_time: cooking_time?,
            ingredients: ingredients?,
            description: description?,
        })
    }
}

impl RecipeIn {
    pub fn as_new(&self) -> NewRecipe<'_> {
        NewRecipe {
            title: &self.title,
            cooking_time: self.cooking_time,
            ingredients: &self.ingredients,
            description: &self.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeOut {
    pub id: i64,
    pub title: String,
    pub cooking_time: i64,
    pub ingredients: String,
    pub description: String,
    pub views: i64,
}

impl From<Recipe> for RecipeOut {
    fn from(r: Recipe) -> Self {
        Self {
            id: r.id,
            title: r.title,
            cooking_time: r.cooking_time,
            ingredients: r.ingredients,
            description: r.description,
            views: r.views,
        }
    }
}
