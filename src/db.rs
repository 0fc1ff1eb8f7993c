use std::str::FromStr;

use anyhow::Context;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqliteConnection, SqlitePool, Transaction,
};
use tracing::{debug, error, info};

use crate::{config::AppConfig, error::ApiError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS recipes (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        title        TEXT    NOT NULL,
        cooking_time INTEGER NOT NULL,
        ingredients  TEXT    NOT NULL,
        description  TEXT    NOT NULL,
        views        INTEGER NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_recipes_title ON recipes (title)",
];

pub async fn connect(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("parse DATABASE_URL {}", config.database_url))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .context("connect to database")?;
    info!(url = %config.database_url, "database pool ready");
    Ok(pool)
}

/// Creates the recipes table and its index if they do not exist yet.
pub async fn ensure_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    let mut tx = pool.begin().await.context("begin schema transaction")?;
    for stmt in SCHEMA {
        sqlx::query(stmt)
            .execute(&mut *tx)
            .await
            .context("apply schema")?;
    }
    tx.commit().await.context("commit schema")?;
    debug!("schema ensured");
    Ok(())
}

pub async fn close(pool: SqlitePool) {
    pool.close().await;
    info!("database pool closed");
}

/// One transaction per request.
///
/// Nothing is persisted unless the handler calls [`Session::commit`]; dropping
/// the session rolls back and hands the connection back to the pool.
pub struct Session {
    tx: Transaction<'static, Sqlite>,
}

impl Session {
    pub async fn begin(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }

    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = SqlitePool::from_ref(state);
        Session::begin(&pool).await.map_err(|e| {
            error!(error = %e, "could not open session");
            ApiError::Database(e)
        })
    }
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    // A single long-lived connection: every new `:memory:` connection is a
    // separate empty database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    ensure_schema(&pool).await.expect("schema");
    pool
}
