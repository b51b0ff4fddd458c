use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::session::{generate_session_token, SessionData};
use crate::constants::SESSION_COOKIE;
use crate::oauth::TokenPair;
use crate::web::AppState;

#[derive(Debug)]
struct SessionInner {
    data: SessionData,
    modified: bool,
}

/// The current request's session.
///
/// Put in place by [`session_layer`]; changes made through it are saved
/// once the handler returns.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionInner>>,
}

impl Session {
    pub(crate) fn new(data: SessionData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                data,
                modified: false,
            })),
        }
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut SessionInner) -> T) -> T {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }

    /// Snapshot of the session data.
    #[must_use]
    pub fn get(&self) -> SessionData {
        self.with_inner(|inner| inner.data.clone())
    }

    /// Modify the session data.
    pub fn update(&self, f: impl FnOnce(&mut SessionData)) {
        self.with_inner(|inner| {
            f(&mut inner.data);
            inner.modified = true;
        });
    }

    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.with_inner(|inner| inner.data.authorized)
    }

    #[must_use]
    pub fn token_pair(&self) -> TokenPair {
        self.with_inner(|inner| inner.data.token_pair())
    }

    fn is_modified(&self) -> bool {
        self.with_inner(|inner| inner.modified)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Session>().cloned().ok_or_else(|| {
            tracing::error!("Session extractor used on a route without the session layer");
            (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable").into_response()
        })
    }
}

/// Read the session token from the request cookies.
pub fn get_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            cookie
                .trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
                .filter(|token| !token.is_empty())
                .map(String::from)
        })
}

fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}{secure}")
}

/// Load the browser's session before the handler runs and persist it after.
///
/// A new session is only stored once a handler writes to it. Every save
/// slides the store's expiry, so the cookie is re-sent with a fresh
/// `Max-Age` each time to keep the browser in step.
pub async fn session_layer(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let existing = match get_session_token(request.headers()) {
        Some(token) => state
            .sessions
            .load(&token)
            .await
            .map(|data| (token, data)),
        None => None,
    };
    let is_new = existing.is_none();
    let (token, data) = existing.unwrap_or_else(|| (generate_session_token(), SessionData::default()));

    let session = Session::new(data);
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    if is_new && !session.is_modified() {
        return response;
    }

    state.sessions.save(&token, session.get()).await;

    if is_new {
        tracing::debug!("Created new session");
    }

    let cookie = session_cookie(
        &token,
        state.config.session_ttl.as_secs(),
        state.config.cookie_secure,
    );
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!("Failed to build session cookie: {e}"),
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_session_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc123; other=1"),
        );
        assert_eq!(get_session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_get_session_token_ignores_similar_names() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sessionid=zzz; session="));
        assert_eq!(get_session_token(&headers), None);
        assert_eq!(get_session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_session_cookie() {
        assert_eq!(
            session_cookie("tok", 60, false),
            "session=tok; HttpOnly; SameSite=Lax; Path=/; Max-Age=60"
        );
        assert!(session_cookie("tok", 60, true).ends_with("; Secure"));
    }

    #[test]
    fn test_update_marks_modified() {
        let session = Session::new(SessionData::default());
        assert!(!session.is_modified());

        session.update(|s| {
            s.authorized = true;
            s.oauth_token = "t".into();
        });

        assert!(session.is_modified());
        assert!(session.is_authorized());
        assert_eq!(session.get().oauth_token, "t");
    }
}
