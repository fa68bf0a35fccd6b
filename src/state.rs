use crate::auth::session::SessionStore;
use crate::config::AppConfig;
use crate::db;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub sessions: SessionStore,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config).await?;
        db::init_schema(&db).await?;

        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        let sessions = SessionStore::new(config.session.ttl());
        Self {
            db,
            config,
            sessions,
        }
    }

    /// State backed by an in-memory database and a fixed session secret.
    #[cfg(test)]
    pub async fn for_tests() -> Self {
        let db = db::connect_in_memory().await.expect("in-memory db");
        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            db_max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            session: crate::config::SessionConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                cookie_secure: false,
            },
        });
        Self::from_parts(db, config)
    }
}
