use std::time::Duration;

use rand::{rngs::OsRng, RngCore};
use serde::Deserialize;

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 60 * 24 * 7;
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub cookie_secure: bool,
}

impl SessionConfig {
    /// Session lifetime, clamped to `1..=MAX_SESSION_TTL_MINUTES` minutes.
    pub fn ttl(&self) -> Duration {
        let minutes = self.ttl_minutes.clamp(1, MAX_SESSION_TTL_MINUTES) as u64;
        Duration::from_secs(minutes * 60)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://tareas.db".into());
        let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(5000);

        // Without an explicit secret every restart invalidates all sessions.
        let secret = std::env::var("SESSION_SECRET").unwrap_or_else(|_| random_secret());
        let session = SessionConfig {
            secret,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "tareas".into()),
            audience: std::env::var("SESSION_AUDIENCE").unwrap_or_else(|_| "tareas-users".into()),
            ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(DEFAULT_SESSION_TTL_MINUTES)
                .clamp(1, MAX_SESSION_TTL_MINUTES),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
        };

        Ok(Self {
            database_url,
            db_max_connections,
            host,
            port,
            session,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 32 random bytes, hex encoded.
pub fn random_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
