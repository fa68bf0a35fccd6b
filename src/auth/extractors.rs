use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::warn;

use super::{
    services::LOGIN_REQUIRED,
    session::{Session, SessionKeys},
};
use crate::{error::AppError, state::AppState};

pub const SESSION_COOKIE: &str = "session";

/// Guard for routes that need a logged in user. Verifies the signed
/// session cookie and that the session is still live on the server.
pub struct AuthSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Unauthorized(LOGIN_REQUIRED.into()))?;

        let keys = SessionKeys::from_ref(state);
        let claims = match keys.verify(&token) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "invalid or expired session cookie");
                return Err(AppError::Unauthorized(LOGIN_REQUIRED.into()));
            }
        };

        let Some(session) = state.sessions.get(claims.jti).await else {
            warn!(session_id = %claims.jti, "session cookie for closed session");
            return Err(AppError::Unauthorized(LOGIN_REQUIRED.into()));
        };
        if !claims.matches(&session) {
            warn!(session_id = %claims.jti, claimed_uid = claims.uid, "session cookie identity mismatch");
            return Err(AppError::Unauthorized(LOGIN_REQUIRED.into()));
        }

        Ok(AuthSession(session))
    }
}

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Cookie that, once added to a jar, tells the client to drop the session.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .build()
}
