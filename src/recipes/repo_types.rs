use sqlx::FromRow;

/// Row of the `recipes` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub cooking_time: i64, // minutes
    pub ingredients: String,
    pub description: String,
    pub views: i64,
}

/// Values for a row that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewRecipe<'a> {
    pub title: &'a str,
    pub cooking_time: i64,
    pub ingredients: &'a str,
    pub description: &'a str,
}
