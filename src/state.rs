use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::{config::AppConfig, db};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
}

impl AppState {
    /// Connects the pool and makes sure the schema exists.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let db = db::connect(config).await?;
        db::ensure_schema(&db).await?;
        Ok(Self { db })
    }

    pub fn from_pool(db: SqlitePool) -> Self {
        Self { db }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
