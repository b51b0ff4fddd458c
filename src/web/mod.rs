mod error;
pub mod pages;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::AppError;
pub use routes::{AUTH_PATH, CALLBACK_PATH, COUNT_LIKES_PATH};

use crate::auth::{session_layer, SessionStore};
use crate::config::Config;
use crate::oauth::{Consumer, TokenPair};
use crate::twitter::{build_http_client, TwitterClient};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: SessionStore,
    pub http: reqwest::Client,
}

impl AppState {
    /// Build the state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: Config, sessions: SessionStore) -> Result<Self> {
        let http = build_http_client(config.http_timeout).context("Failed to create HTTP client")?;
        Ok(Self {
            config: Arc::new(config),
            sessions,
            http,
        })
    }

    /// A Twitter client signing with the app credentials and `token`.
    #[must_use]
    pub fn twitter_client(&self, token: TokenPair) -> TwitterClient {
        TwitterClient::new(
            self.http.clone(),
            self.config.twitter_api_url.clone(),
            Consumer {
                key: self.config.app_key.clone(),
                secret: self.config.app_secret.clone(),
            },
            token,
        )
    }
}

/// Start the web server.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn serve(state: AppState) -> Result<()> {
    let addr: SocketAddr = format_addr(&state.config.web_host, state.config.web_port)
        .parse()
        .context("Invalid web server address")?;

    let app = create_app(state);

    info!(addr = %addr, "Starting HTTP web server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind web server")?;

    axum::serve(listener, app.into_make_service())
        .await
        .context("Web server error")?;

    Ok(())
}

/// Join host and port, bracketing IPv6 literals.
fn format_addr(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Create the main application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_layer,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
