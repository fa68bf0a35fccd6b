use crate::auth::repo_types::User;
use sqlx::SqlitePool;

impl User {
    /// Find a user by exact username.
    pub async fn find_by_username(db: &SqlitePool, username: &str) -> sqlx::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, usuario AS username, "contraseña_hash" AS password_hash,
                   fecha_registro AS created_at
            FROM usuarios
            WHERE usuario = ?
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a user with an already hashed password.
    pub async fn create(db: &SqlitePool, username: &str, password_hash: &str) -> sqlx::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO usuarios (usuario, "contraseña_hash")
            VALUES (?, ?)
            RETURNING id, usuario AS username, "contraseña_hash" AS password_hash,
                      fecha_registro AS created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}
