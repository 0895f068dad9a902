use anyhow::Context;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL,
    password_hash TEXT NOT NULL
)
"#;

/// Open the user database and make sure the schema exists.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let db = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .with_context(|| format!("connect to database {}", database_url))?;
    init_schema(&db).await?;
    Ok(db)
}

pub async fn init_schema(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(SCHEMA)
        .execute(db)
        .await
        .context("create users table")?;
    tracing::debug!("users table ready");
    Ok(())
}

/// Single-connection in-memory database; every connection to `:memory:` is a
/// fresh database, so the pool must never recycle its only connection.
#[cfg(test)]
pub async fn memory() -> SqlitePool {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    init_schema(&db).await.expect("schema");
    db
}
