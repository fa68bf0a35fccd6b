use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::config::AppConfig;

const CREATE_USUARIOS: &str = r#"
    CREATE TABLE IF NOT EXISTS usuarios (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        usuario TEXT UNIQUE NOT NULL,
        "contraseña_hash" TEXT NOT NULL,
        fecha_registro TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

// Declared for the pending task feature; nothing reads or writes it yet.
const CREATE_TAREAS: &str = r#"
    CREATE TABLE IF NOT EXISTS tareas (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        usuario_id INTEGER,
        titulo TEXT NOT NULL,
        descripcion TEXT,
        completada BOOLEAN DEFAULT FALSE,
        fecha_creacion TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (usuario_id) REFERENCES usuarios (id)
    )
"#;

/// Open the SQLite file named by the config, creating it if missing.
pub async fn connect(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("parse DATABASE_URL {}", config.database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let db = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_with(options)
        .await
        .context("connect to database")?;
    Ok(db)
}

/// In-memory database with a single long-lived connection, so every
/// query sees the same schema.
#[cfg(test)]
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("connect to in-memory database")?;
    init_schema(&db).await?;
    Ok(db)
}

pub async fn init_schema(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(CREATE_USUARIOS)
        .execute(db)
        .await
        .context("create table usuarios")?;
    sqlx::query(CREATE_TAREAS)
        .execute(db)
        .await
        .context("create table tareas")?;
    tracing::info!("database schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_creates_both_tables() {
        let db = connect_in_memory().await.expect("in-memory db");
        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('usuarios', 'tareas') ORDER BY name",
        )
        .fetch_all(&db)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(names, vec!["tareas", "usuarios"]);
    }

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let db = connect_in_memory().await.expect("in-memory db");
        init_schema(&db).await.expect("second init should succeed");
    }
}
