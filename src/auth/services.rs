use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    auth::{
        password::{hash_password, verify_password},
        repo_types::User,
        session::{Session, SessionStore},
    },
    error::AppError,
};

pub const MIN_USERNAME_CHARS: usize = 3;
pub const MIN_PASSWORD_CHARS: usize = 4;

pub const MISSING_FIELDS: &str = "Faltan campos requeridos: usuario y contraseña";
pub const USERNAME_TOO_SHORT: &str = "El nombre de usuario debe tener al menos 3 caracteres";
pub const PASSWORD_TOO_SHORT: &str = "La contraseña debe tener al menos 4 caracteres";
pub const USERNAME_TAKEN: &str = "El usuario ya existe";
pub const USER_NOT_FOUND: &str = "Usuario no encontrado";
pub const WRONG_PASSWORD: &str = "Contraseña incorrecta";
pub const LOGIN_REQUIRED: &str = "Acceso denegado. Debe iniciar sesion.";

pub(crate) fn validate_new_credentials(username: &str, password: &str) -> Result<(), AppError> {
    if username.chars().count() < MIN_USERNAME_CHARS {
        return Err(AppError::Validation(USERNAME_TOO_SHORT.into()));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::Validation(PASSWORD_TOO_SHORT.into()));
    }
    Ok(())
}

/// Register a user and return the stored record. The username is trimmed
/// before validation and storage.
pub async fn register(db: &SqlitePool, username: &str, password: &str) -> Result<User, AppError> {
    let username = username.trim();
    validate_new_credentials(username, password)?;

    if User::find_by_username(db, username).await?.is_some() {
        warn!(username, "username already registered");
        return Err(AppError::Conflict(USERNAME_TAKEN.into()));
    }

    let hash = hash_password(password);

    // A concurrent registration can slip past the lookup above; the
    // UNIQUE constraint on `usuario` settles it.
    let user = User::create(db, username, &hash)
        .await
        .map_err(|e| insert_error(username, e))?;

    info!(user_id = user.id, username = %user.username, created_at = %user.created_at, "user registered");
    Ok(user)
}

/// Check credentials and open a session for the user.
pub async fn login(
    db: &SqlitePool,
    sessions: &SessionStore,
    username: &str,
    password: &str,
) -> Result<Session, AppError> {
    let username = username.trim();

    let Some(user) = User::find_by_username(db, username).await? else {
        warn!(username, "login unknown username");
        return Err(AppError::NotFound(USER_NOT_FOUND.into()));
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::Unauthorized(WRONG_PASSWORD.into()));
    }

    let session = sessions.create(user.id, &user.username).await;
    let active_sessions = sessions.len().await;
    info!(
        user_id = user.id,
        username = %user.username,
        active_sessions,
        "user logged in"
    );
    Ok(session)
}

/// Drop the session and return the username it belonged to.
pub async fn logout(sessions: &SessionStore, session: &Session) -> Result<String, AppError> {
    let Some(removed) = sessions.remove(session.id).await else {
        return Err(AppError::Unauthorized(LOGIN_REQUIRED.into()));
    };
    info!(user_id = removed.user_id, username = %removed.username, "user logged out");
    Ok(removed.username)
}

fn insert_error(username: &str, e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        warn!(username, "username registered concurrently");
        return AppError::Conflict(USERNAME_TAKEN.into());
    }
    e.into()
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
