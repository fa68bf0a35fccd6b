use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{CredentialsRequest, LoginResponse, MessageResponse, RegisterResponse},
        extractors::{removal_cookie, session_cookie, AuthSession},
        services::{self, MISSING_FIELDS},
        session::SessionKeys,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/registro", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Unwrap a credentials body; malformed JSON and missing fields are both
/// reported as a validation error.
fn credentials(
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(String, String), AppError> {
    let parts = match payload {
        Ok(Json(body)) => body.into_parts(),
        Err(rejection) => {
            warn!(error = %rejection, "unreadable credentials body");
            None
        }
    };
    parts.ok_or_else(|| AppError::Validation(MISSING_FIELDS.into()))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let (username, password) = credentials(payload)?;
    let user = services::register(&state.db, &username, &password).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Usuario registrado exitosamente".into(),
            user_id: user.id,
            username: user.username,
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let (username, password) = credentials(payload)?;
    let session = services::login(&state.db, &state.sessions, &username, &password).await?;

    let keys = SessionKeys::from_ref(&state);
    let token = match keys.sign(&session) {
        Ok(t) => t,
        Err(e) => {
            // Don't leave an unreachable session behind.
            state.sessions.remove(session.id).await;
            return Err(e.context("sign session token").into());
        }
    };
    let jar = jar.add(session_cookie(token, state.config.session.cookie_secure));

    Ok((
        jar,
        Json(LoginResponse {
            message: "Inicio de sesión exitoso".into(),
            username: session.username,
            user_id: session.user_id,
        }),
    ))
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    AuthSession(session): AuthSession,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let username = services::logout(&state.sessions, &session).await?;
    let jar = jar.add(removal_cookie());

    Ok((
        jar,
        Json(MessageResponse {
            message: format!("Sesión cerrada para {username}"),
        }),
    ))
}
