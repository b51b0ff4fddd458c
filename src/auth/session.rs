use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use tokio::sync::RwLock;

use crate::constants::TOKEN_LENGTH;
use crate::oauth::TokenPair;

/// Generate a cryptographically secure random session token.
pub fn generate_session_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Per-browser OAuth state.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    /// Set once the access token exchange succeeded.
    pub authorized: bool,
    pub oauth_token: String,
    pub oauth_token_secret: String,
}

impl fmt::Debug for SessionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionData")
            .field("authorized", &self.authorized)
            .field("oauth_token", &self.oauth_token)
            .field("oauth_token_secret", &"<redacted>")
            .finish()
    }
}

impl SessionData {
    /// The stored token pair, empty if the handshake has not started.
    #[must_use]
    pub fn token_pair(&self) -> TokenPair {
        TokenPair::new(self.oauth_token.clone(), self.oauth_token_secret.clone())
    }
}

#[derive(Debug, Clone)]
struct StoredSession {
    data: SessionData,
    expires_at: DateTime<Utc>,
}

/// In-memory session storage keyed by session token.
///
/// Sessions expire after `ttl` without being saved again.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
    ttl: chrono::Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Look up a live session.
    pub async fn load(&self, token: &str) -> Option<SessionData> {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .filter(|s| s.expires_at > Utc::now())
            .map(|s| s.data.clone())
    }

    /// Store a session and push its expiry out by the TTL.
    pub async fn save(&self, token: &str, data: SessionData) {
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.sessions
            .write()
            .await
            .insert(token.to_string(), StoredSession { data, expires_at });
    }

    pub async fn remove(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    /// Drop every expired session and return how many were removed.
    pub async fn delete_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    /// Number of stored sessions, expired or not.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
