use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::{config::SessionConfig, state::AppState};

/// Server-side state of a logged in client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: i64,
    pub username: String,
    pub expires_at: OffsetDateTime,
}

impl Session {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

/// Payload of the signed session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub jti: Uuid,        // session id
    pub uid: i64,         // user id
    pub username: String,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

impl SessionClaims {
    /// Whether the signed identity matches what the server holds.
    pub fn matches(&self, session: &Session) -> bool {
        self.jti == session.id && self.uid == session.user_id && self.username == session.username
    }
}

/// In-memory registry of live sessions, keyed by session id. Expired
/// entries are invisible to `get` and pruned on every `create`.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::config::DEFAULT_SESSION_TTL_MINUTES as u64 * 60))
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn create(&self, user_id: i64, username: &str) -> Session {
        let now = OffsetDateTime::now_utc();
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            username: username.to_string(),
            expires_at: now.saturating_add(self.ttl.try_into().unwrap_or(time::Duration::MAX)),
        };

        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        let pruned = before - sessions.len();
        sessions.insert(session.id, session.clone());
        debug!(session_id = %session.id, user_id, pruned, "session created");
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Session> {
        let now = OffsetDateTime::now_utc();
        self.inner
            .read()
            .await
            .get(&id)
            .filter(|s| !s.is_expired(now))
            .cloned()
    }

    pub async fn remove(&self, id: Uuid) -> Option<Session> {
        let removed = self.inner.write().await.remove(&id);
        debug!(session_id = %id, existed = removed.is_some(), "session removed");
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// Signing material for session cookies.
#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl From<&SessionConfig> for SessionKeys {
    fn from(cfg: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
        }
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        SessionKeys::from(&state.config.session)
    }
}

impl SessionKeys {
    /// Sign a token that expires together with the session.
    pub fn sign(&self, session: &Session) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = SessionClaims {
            jti: session.id,
            uid: session.user_id,
            username: session.username.clone(),
            iat: now.unix_timestamp().max(0) as usize,
            exp: session.expires_at.unix_timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(session_id = %session.id, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        debug!(session_id = %data.claims.jti, "session token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> SessionKeys {
        SessionKeys::from(&SessionConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 5,
            cookie_secure: false,
        })
    }

    fn sample_session() -> Session {
        Session {
            id: Uuid::new_v4(),
            user_id: 7,
            username: "alice".into(),
            expires_at: OffsetDateTime::now_utc() + time::Duration::minutes(5),
        }
    }

    #[test]
    fn sign_and_verify_session_token() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let session = sample_session();
        let token = keys.sign(&session).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.jti, session.id);
        assert_eq!(claims.uid, 7);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp as i64, session.expires_at.unix_timestamp());
        assert!(claims.matches(&session));
    }

    #[test]
    fn claims_must_match_stored_session() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let session = sample_session();
        let claims = keys.verify(&keys.sign(&session).unwrap()).unwrap();

        let renamed = Session { username: "mallory".into(), ..session.clone() };
        assert!(!claims.matches(&renamed));
        let other_user = Session { user_id: 8, ..session };
        assert!(!claims.matches(&other_user));
    }

    #[test]
    fn sign_handles_far_future_expiry() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let session = Session {
            expires_at: OffsetDateTime::now_utc().saturating_add(time::Duration::MAX),
            ..sample_session()
        };
        let claims = keys.verify(&keys.sign(&session).unwrap()).unwrap();
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_other_secret() {
        let good = make_keys("secret-a", "iss", "aud");
        let bad = make_keys("secret-b", "iss", "aud");
        let token = good.sign(&sample_session()).unwrap();
        assert!(bad.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let bad = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good.sign(&sample_session()).unwrap();
        assert!(bad.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let mut token = keys.sign(&sample_session()).unwrap();
        token.push('x');
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn store_create_get_remove() {
        let store = SessionStore::default();
        let session = store.create(3, "carol").await;
        assert_eq!(store.get(session.id).await, Some(session.clone()));
        assert_eq!(store.len().await, 1);

        assert_eq!(store.remove(session.id).await, Some(session.clone()));
        assert!(store.get(session.id).await.is_none());
        assert!(store.remove(session.id).await.is_none());
    }

    #[tokio::test]
    async fn expired_sessions_are_hidden_and_pruned() {
        let store = SessionStore::new(Duration::ZERO);
        let first = store.create(1, "erin").await;
        assert!(store.get(first.id).await.is_none());

        for _ in 0..50 {
            store.create(1, "erin").await;
        }
        // each create drops every entry that expired before it
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn live_sessions_survive_pruning() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = store.create(1, "erin").await;
        let b = store.create(2, "frank").await;
        assert_eq!(store.len().await, 2);
        assert_eq!(store.get(a.id).await, Some(a));
        assert_eq!(store.get(b.id).await, Some(b));
    }

    #[tokio::test]
    async fn huge_ttl_does_not_overflow() {
        let store = SessionStore::new(Duration::MAX);
        let session = store.create(1, "erin").await;
        assert!(store.get(session.id).await.is_some());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = SessionStore::default();
        let other = store.clone();
        let session = store.create(1, "dave").await;
        assert!(other.get(session.id).await.is_some());
    }
}
