use reqwest::StatusCode;
use thiserror::Error;

/// Errors from talking to the Twitter API.
#[derive(Debug, Error)]
pub enum TwitterError {
    /// The API rejected our credentials (HTTP 401).
    #[error("authentication rejected: {0}")]
    Unauthorized(String),
    #[error("rate limited{}", .reset_at.map(|t| format!(" until {t}")).unwrap_or_default())]
    RateLimited { reset_at: Option<i64> },
    #[error("Twitter API returned {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("request to Twitter failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode Twitter response: {0}")]
    Decode(String),
    #[error("OAuth callback was not confirmed")]
    CallbackNotConfirmed,
    #[error("token response is missing {0}")]
    MissingToken(&'static str),
    #[error("failed to sign request: {0}")]
    Signing(String),
}

impl TwitterError {
    /// Whether the error means the stored tokens are no longer accepted.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// HTTP status of the failed response, if the error came from one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            Self::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }
}
