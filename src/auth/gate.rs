//! Authorization gate wrapped around views that talk to Twitter.

use std::future::Future;

use axum::response::{IntoResponse, Redirect, Response};
use tracing::{debug, warn};

use super::middleware::Session;
use crate::twitter::{TwitterClient, TwitterError};
use crate::web::{AppError, AppState, AUTH_PATH};

/// Whether a view needs a completed OAuth handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    /// The session must hold an access token.
    Required,
    /// The view runs mid-handshake, with whatever tokens the session has.
    NotRequired,
}

/// Run `view` with a Twitter client built from the session's tokens.
///
/// Sends the browser to [`AUTH_PATH`] instead when authorization is required
/// but missing, or when Twitter rejects the stored tokens. Any other error is
/// returned as an [`AppError`].
///
/// # Errors
///
/// Returns an error if the view fails with anything other than a 401.
pub async fn token_required<F, Fut>(
    state: &AppState,
    session: &Session,
    authorization: Authorization,
    view: F,
) -> Result<Response, AppError>
where
    F: FnOnce(TwitterClient) -> Fut,
    Fut: Future<Output = Result<Response, TwitterError>>,
{
    if authorization == Authorization::Required && !session.is_authorized() {
        debug!("Session is not authorized, starting OAuth flow");
        return Ok(Redirect::to(AUTH_PATH).into_response());
    }

    let client = state.twitter_client(session.token_pair());

    match view(client).await {
        Ok(response) => Ok(response),
        Err(e) if e.is_unauthorized() => {
            warn!(error = %e, "Twitter rejected session tokens, restarting OAuth flow");
            Ok(Redirect::to(AUTH_PATH).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
