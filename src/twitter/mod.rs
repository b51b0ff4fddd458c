//! Minimal Twitter API client.
//!
//! Covers the three-legged OAuth 1.0a handshake and the `favorites/list`
//! endpoint. Every request is signed with the application credentials and,
//! once the handshake has started, the token pair held in the session.

mod error;
mod models;

use std::time::Duration;

use reqwest::{header, StatusCode};
use tracing::{debug, info, warn};

pub use error::TwitterError;
pub use models::{AuthenticationTokens, Like, TwitterUser};

use crate::constants::USER_AGENT;
use crate::oauth::{parse_form_body, Consumer, Signer, TokenPair};
use models::ApiErrorBody;

/// Build the shared HTTP client used for all Twitter requests.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Twitter API client bound to one set of credentials.
///
/// `Debug` goes through the redacting impls of [`Consumer`] and [`TokenPair`].
#[derive(Debug, Clone)]
pub struct TwitterClient {
    http: reqwest::Client,
    api_url: String,
    consumer: Consumer,
    token: TokenPair,
}

impl TwitterClient {
    /// Create a client. `token` may be empty before the handshake starts.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        api_url: impl Into<String>,
        consumer: Consumer,
        token: TokenPair,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            consumer,
            token,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_url)
    }

    fn sign(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        extra_oauth: &[(&str, &str)],
    ) -> Result<String, TwitterError> {
        Signer::new(&self.consumer, Some(&self.token))
            .authorization_header(method, url, params, extra_oauth)
            .map_err(|e| TwitterError::Signing(e.to_string()))
    }

    /// Obtain a request token and the URL where the user approves it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the platform does not confirm
    /// the callback, or the response lacks a token.
    pub async fn get_authentication_tokens(
        &self,
        callback_url: &str,
    ) -> Result<AuthenticationTokens, TwitterError> {
        let url = self.endpoint("oauth/request_token");
        let authorization = self.sign("POST", &url, &[], &[("oauth_callback", callback_url)])?;

        debug!(url = %url, "Requesting OAuth request token");

        let response = self
            .http
            .post(&url)
            .header(header::AUTHORIZATION, authorization)
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;

        let mut oauth_token = None;
        let mut oauth_token_secret = None;
        let mut callback_confirmed = false;
        for (key, value) in parse_form_body(&body) {
            match key.as_str() {
                "oauth_token" => oauth_token = Some(value),
                "oauth_token_secret" => oauth_token_secret = Some(value),
                "oauth_callback_confirmed" => callback_confirmed = value == "true",
                _ => {}
            }
        }

        if !callback_confirmed {
            warn!("Request token response did not confirm the callback");
            return Err(TwitterError::CallbackNotConfirmed);
        }
        let oauth_token = oauth_token
            .filter(|t| !t.is_empty())
            .ok_or(TwitterError::MissingToken("oauth_token"))?;
        let oauth_token_secret = oauth_token_secret
            .filter(|t| !t.is_empty())
            .ok_or(TwitterError::MissingToken("oauth_token_secret"))?;

        let auth_url = format!(
            "{}?oauth_token={}",
            self.endpoint("oauth/authenticate"),
            urlencoding::encode(&oauth_token)
        );

        Ok(AuthenticationTokens {
            oauth_token,
            oauth_token_secret,
            auth_url,
        })
    }

    /// Exchange the verifier from the callback for an access token pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response lacks a token.
    pub async fn get_authorized_tokens(&self, verifier: &str) -> Result<TokenPair, TwitterError> {
        let url = self.endpoint("oauth/access_token");
        let params = vec![("oauth_verifier".to_string(), verifier.to_string())];
        let authorization = self.sign("POST", &url, &params, &[])?;

        debug!(url = %url, "Exchanging OAuth verifier for access token");

        let response = self
            .http
            .post(&url)
            .header(header::AUTHORIZATION, authorization)
            .form(&params)
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;

        let mut token = TokenPair::default();
        for (key, value) in parse_form_body(&body) {
            match key.as_str() {
                "oauth_token" => token.oauth_token = value,
                "oauth_token_secret" => token.oauth_token_secret = value,
                "screen_name" => info!(screen_name = %value, "Access token granted"),
                _ => {}
            }
        }

        if token.oauth_token.is_empty() {
            return Err(TwitterError::MissingToken("oauth_token"));
        }
        if token.oauth_token_secret.is_empty() {
            return Err(TwitterError::MissingToken("oauth_token_secret"));
        }

        Ok(token)
    }

    /// Fetch one page of the authenticated user's likes.
    ///
    /// `max_id` is inclusive: the status with that id is returned again.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a list of
    /// statuses.
    pub async fn get_favorites(
        &self,
        count: u32,
        max_id: Option<u64>,
    ) -> Result<Vec<Like>, TwitterError> {
        let url = self.endpoint("1.1/favorites/list.json");
        let mut params = vec![("count".to_string(), count.to_string())];
        if let Some(max_id) = max_id {
            params.push(("max_id".to_string(), max_id.to_string()));
        }
        let authorization = self.sign("GET", &url, &params, &[])?;

        let response = self
            .http
            .get(&url)
            .header(header::AUTHORIZATION, authorization)
            .query(&params)
            .send()
            .await?;
        let body = check_status(response).await?.bytes().await?;

        serde_json::from_slice(&body).map_err(|e| TwitterError::Decode(e.to_string()))
    }
}

/// Map a non-success response onto a [`TwitterError`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TwitterError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let reset_at = response
            .headers()
            .get("x-rate-limit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        warn!(reset_at = ?reset_at, "Twitter API rate limit hit");
        return Err(TwitterError::RateLimited { reset_at });
    }

    let body = response.text().await.unwrap_or_default();
    // OAuth endpoints answer in plain text; the REST API answers in JSON.
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| body.trim().to_string());

    if status == StatusCode::UNAUTHORIZED {
        return Err(TwitterError::Unauthorized(message));
    }
    Err(TwitterError::Api { status, message })
}
