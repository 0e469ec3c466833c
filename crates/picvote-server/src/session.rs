//! In-memory session and login-state tracking.
//!
//! A session is an opaque UUID handed to the browser in an `HttpOnly`
//! cookie and mapped server-side to the authenticated identity. OAuth
//! `state` tokens live in the same store with a short TTL. Everything is
//! lost on restart, which simply logs users out.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use picvote_shared::identity::Identity;

pub const SESSION_COOKIE: &str = "picvote_session";

/// How long an issued OAuth `state` token stays redeemable.
const LOGIN_STATE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone)]
struct Session {
    identity: Identity,
    expires_at: DateTime<Utc>,
}

/// Server-side session table.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    login_states: Arc<RwLock<HashMap<Uuid, DateTime<Utc>>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            login_states: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Open a session for a freshly authenticated identity.
    pub async fn create(&self, identity: Identity) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            id,
            Session {
                identity,
                expires_at: Utc::now() + self.ttl,
            },
        );
        id
    }

    /// Resolve a session id to its identity, if present and unexpired.
    pub async fn identity(&self, id: Uuid) -> Option<Identity> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .filter(|s| s.expires_at > Utc::now())
            .map(|s| s.identity.clone())
    }

    /// Resolve the identity attached to a request, or `None` for anonymous
    /// callers.
    pub async fn identity_from_headers(&self, headers: &HeaderMap) -> Option<Identity> {
        let id = session_cookie(headers)?;
        self.identity(id).await
    }

    /// Drop a session (logout).
    pub async fn remove(&self, id: Uuid) {
        self.sessions.write().await.remove(&id);
    }

    /// Issue a short-lived OAuth `state` token.
    pub async fn issue_login_state(&self) -> Uuid {
        let state = Uuid::new_v4();
        self.login_states
            .write()
            .await
            .insert(state, Utc::now() + Duration::minutes(LOGIN_STATE_TTL_MINUTES));
        state
    }

    /// Consume a `state` token. Single use: a second redemption fails.
    pub async fn take_login_state(&self, state: Uuid) -> bool {
        let mut states = self.login_states.write().await;
        match states.remove(&state) {
            Some(expires_at) => expires_at > Utc::now(),
            None => false,
        }
    }

    /// Evict expired sessions and stale login states.
    pub async fn purge_expired(&self) {
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        let removed = before - sessions.len();
        drop(sessions);

        self.login_states.write().await.retain(|_, exp| *exp > now);

        if removed > 0 {
            debug!(removed, "Purged expired sessions");
        }
    }
}

/// Extract the session id from a request's `Cookie` header.
pub fn session_cookie(headers: &HeaderMap) -> Option<Uuid> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE {
            Uuid::parse_str(value.trim()).ok()
        } else {
            None
        }
    })
}

/// `Set-Cookie` value establishing a session.
pub fn session_cookie_value(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value clearing the session (logout).
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use picvote_shared::types::Provider;

    fn alice() -> Identity {
        Identity::new(Provider::Google, "g-1", "Alice")
    }

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, value.parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn create_then_resolve() {
        let store = SessionStore::new(3600);
        let id = store.create(alice()).await;
        assert_eq!(store.identity(id).await, Some(alice()));
    }

    #[tokio::test]
    async fn expired_session_is_not_resolved() {
        let store = SessionStore::new(0);
        let id = store.create(alice()).await;
        assert_eq!(store.identity(id).await, None);
    }

    #[tokio::test]
    async fn removed_session_is_gone() {
        let store = SessionStore::new(3600);
        let id = store.create(alice()).await;
        store.remove(id).await;
        assert_eq!(store.identity(id).await, None);
    }

    #[tokio::test]
    async fn identity_comes_from_the_cookie_header() {
        let store = SessionStore::new(3600);
        let id = store.create(alice()).await;

        let headers =
            headers_with_cookie(&format!("theme=dark; {SESSION_COOKIE}={id}; lang=ca"));
        assert_eq!(store.identity_from_headers(&headers).await, Some(alice()));

        let anonymous = headers_with_cookie("theme=dark");
        assert_eq!(store.identity_from_headers(&anonymous).await, None);
    }

    #[tokio::test]
    async fn login_state_is_single_use() {
        let store = SessionStore::new(3600);
        let state = store.issue_login_state().await;
        assert!(store.take_login_state(state).await);
        assert!(!store.take_login_state(state).await);
        assert!(!store.take_login_state(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn purge_drops_expired_sessions() {
        let store = SessionStore::new(0);
        store.create(alice()).await;
        store.purge_expired().await;
        assert!(store.sessions.read().await.is_empty());
    }

    #[test]
    fn cookie_values_are_well_formed() {
        let id = Uuid::new_v4();
        let value = session_cookie_value(id);
        assert!(value.starts_with(&format!("{SESSION_COOKIE}={id}")));
        assert!(value.contains("HttpOnly"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
