use sqlx::FromRow;
use time::PrimitiveDateTime;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String, // salt || sha256 hex, never sent to clients
    pub created_at: PrimitiveDateTime,
}
