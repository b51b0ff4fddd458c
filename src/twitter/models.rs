use serde::{Deserialize, Serialize};

/// A Twitter user as embedded in API responses.
///
/// Only the fields used for ranking and display are typed; everything else is
/// carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwitterUser {
    pub id_str: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub screen_name: String,
    #[serde(default)]
    pub profile_image_url_https: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TwitterUser {
    /// Profile URL on twitter.com.
    #[must_use]
    pub fn profile_url(&self) -> String {
        format!("https://twitter.com/{}", self.screen_name)
    }
}

/// A liked status from `favorites/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub id: u64,
    pub user: TwitterUser,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Temporary credentials plus the URL the browser is sent to for approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationTokens {
    pub oauth_token: String,
    pub oauth_token_secret: String,
    pub auth_url: String,
}

/// Error body returned by the API, e.g. `{"errors":[{"code":89,"message":"Invalid or expired token."}]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEntry {
    #[serde(default)]
    pub message: String,
}

impl ApiErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.errors
            .into_iter()
            .next()
            .map(|e| e.message)
            .filter(|m| !m.is_empty())
            .or(self.error)
    }
}
