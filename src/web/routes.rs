use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use tracing::info;

use super::{pages, AppError, AppState};
use crate::auth::{token_required, Authorization, Session};
use crate::likes;
use crate::oauth::TokenPair;
use crate::twitter::{TwitterClient, TwitterError};

pub const AUTH_PATH: &str = "/auth/";
pub const CALLBACK_PATH: &str = "/callback/";
pub const COUNT_LIKES_PATH: &str = "/count-likes/";

const GREETING: &str = "Hello, world!~";
const ACCESS_DENIED: &str = "access denied.";
const NO_ARGUMENT: &str = "no argument found.";

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/healthz", get(health))
        .route(AUTH_PATH, get(auth))
        .route(CALLBACK_PATH, get(callback))
        .route(COUNT_LIKES_PATH, get(count_likes))
}

async fn home() -> &'static str {
    GREETING
}

async fn health() -> &'static str {
    "OK"
}

/// Start the OAuth handshake (GET /auth/).
///
/// Stores the request token in the session and sends the browser to Twitter.
async fn auth(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    let client = state.twitter_client(TokenPair::default());
    let tokens = client
        .get_authentication_tokens(&state.config.callback_url)
        .await?;

    session.update(|s| {
        s.oauth_token = tokens.oauth_token.clone();
        s.oauth_token_secret = tokens.oauth_token_secret.clone();
        s.authorized = false;
    });

    info!("Issued request token, redirecting to Twitter for approval");
    Ok(Redirect::to(&tokens.auth_url).into_response())
}

/// Query arguments Twitter appends to the callback URL.
///
/// Keys may repeat. `denied` counts if present at all, and the first
/// `oauth_verifier` wins.
#[derive(Debug, Default)]
struct CallbackParams {
    denied: bool,
    oauth_verifier: Option<String>,
}

impl CallbackParams {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "denied" => params.denied = true,
                "oauth_verifier" if params.oauth_verifier.is_none() => {
                    params.oauth_verifier = Some(value);
                }
                _ => {}
            }
        }
        params
    }
}

/// Finish the OAuth handshake (GET /callback/).
async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let params = CallbackParams::from_pairs(pairs);
    let handle = session.clone();
    token_required(&state, &session, Authorization::NotRequired, |tw| {
        callback_view(tw, handle, params)
    })
    .await
}

async fn callback_view(
    tw: TwitterClient,
    session: Session,
    params: CallbackParams,
) -> Result<Response, TwitterError> {
    if params.denied {
        info!("User declined authorization");
        return Ok(ACCESS_DENIED.into_response());
    }
    let Some(verifier) = params.oauth_verifier else {
        return Ok(NO_ARGUMENT.into_response());
    };

    let token = tw.get_authorized_tokens(&verifier).await?;
    session.update(|s| {
        s.authorized = true;
        s.oauth_token = token.oauth_token;
        s.oauth_token_secret = token.oauth_token_secret;
    });

    info!("OAuth handshake complete");
    Ok(Redirect::to(COUNT_LIKES_PATH).into_response())
}

/// Rank the authors of the user's likes (GET /count-likes/).
async fn count_likes(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    token_required(&state, &session, Authorization::Required, count_likes_view).await
}

async fn count_likes_view(tw: TwitterClient) -> Result<Response, TwitterError> {
    let top_users = likes::count_likes(&tw).await?;
    Ok(Html(pages::render_count_likes_page(&top_users).into_string()).into_response())
}
