use sqlx::SqliteConnection;

use super::repo_types::{NewRecipe, Recipe};

impl Recipe {
    /// Every recipe, most viewed first; ties go to the quicker dish.
    pub async fn list_popular(conn: &mut SqliteConnection) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, title, cooking_time, ingredients, description, views
            FROM recipes
            ORDER BY views DESC, cooking_time ASC, id ASC
            "#,
        )
        .fetch_all(conn)
        .await?;
        Ok(rows)
    }

    pub async fn create(conn: &mut SqliteConnection, new: &NewRecipe<'_>) -> anyhow::Result<Recipe> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (title, cooking_time, ingredients, description, views)
            VALUES (?, ?, ?, ?, 0)
            RETURNING id, title, cooking_time, ingredients, description, views
            "#,
        )
        .bind(new.title)
        .bind(new.cooking_time)
        .bind(new.ingredients)
        .bind(new.description)
        .fetch_one(conn)
        .await?;
        Ok(recipe)
    }

    /// Bumps the view counter by one and returns the updated row, or `None`
    /// if no recipe has this id. The increment happens inside the statement,
    /// so concurrent viewers never lose a count.
    pub async fn record_view(conn: &mut SqliteConnection, id: i64) -> anyhow::Result<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            UPDATE recipes
            SET views = views + 1
            WHERE id = ?
            RETURNING id, title, cooking_time, ingredients, description, views
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(recipe)
    }
}

#[cfg(test)]
impl Recipe {
    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> anyhow::Result<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, title, cooking_time, ingredients, description, views
            FROM recipes
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(recipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{memory_pool, Session};

    fn new_recipe(title: &'static str, cooking_time: i64) -> NewRecipe<'static> {
        NewRecipe {
            title,
            cooking_time,
            ingredients: "salt, pepper",
            description: "mix",
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_zero_views() {
        let pool = memory_pool().await;
        let mut s = Session::begin(&pool).await.unwrap();
        let a = Recipe::create(s.conn(), &new_recipe("A", 10)).await.unwrap();
        let b = Recipe::create(s.conn(), &new_recipe("B", 10)).await.unwrap();
        s.commit().await.unwrap();

        assert_eq!(a.views, 0);
        assert_eq!(a.title, "A");
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn record_view_increments_once_per_call() {
        let pool = memory_pool().await;
        let mut s = Session::begin(&pool).await.unwrap();
        let r = Recipe::create(s.conn(), &new_recipe("A", 10)).await.unwrap();
        for expected in 1..=3 {
            let viewed = Recipe::record_view(s.conn(), r.id).await.unwrap().unwrap();
            assert_eq!(viewed.views, expected);
        }
        let stored = Recipe::find_by_id(s.conn(), r.id).await.unwrap().unwrap();
        assert_eq!(stored.views, 3);
    }

    #[tokio::test]
    async fn record_view_on_unknown_id_is_none() {
        let pool = memory_pool().await;
        let mut s = Session::begin(&pool).await.unwrap();
        assert!(Recipe::record_view(s.conn(), 42).await.unwrap().is_none());
        assert!(Recipe::find_by_id(s.conn(), 42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_orders_by_views_then_cooking_time() {
        let pool = memory_pool().await;
        let mut s = Session::begin(&pool).await.unwrap();
        let slow = Recipe::create(s.conn(), &new_recipe("slow", 90)).await.unwrap();
        let fast = Recipe::create(s.conn(), &new_recipe("fast", 5)).await.unwrap();
        let popular = Recipe::create(s.conn(), &new_recipe("popular", 120)).await.unwrap();
        Recipe::record_view(s.conn(), popular.id).await.unwrap();
        Recipe::record_view(s.conn(), popular.id).await.unwrap();

        let listed: Vec<i64> = Recipe::list_popular(s.conn())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(listed, vec![popular.id, fast.id, slow.id]);
    }
}
