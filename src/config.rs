use std::fmt;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    // Twitter application credentials
    pub app_key: String,
    pub app_secret: String,
    pub callback_url: String,
    pub twitter_api_url: String,
    pub http_timeout: Duration,

    // Sessions
    pub session_ttl: Duration,
    pub session_cleanup_interval: Duration,
    pub cookie_secure: bool,

    // Web Server
    pub web_host: String,
    pub web_port: u16,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("app_key", &self.app_key)
            .field("app_secret", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .field("twitter_api_url", &self.twitter_api_url)
            .field("http_timeout", &self.http_timeout)
            .field("session_ttl", &self.session_ttl)
            .field("session_cleanup_interval", &self.session_cleanup_interval)
            .field("cookie_secure", &self.cookie_secure)
            .field("web_host", &self.web_host)
            .field("web_port", &self.web_port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Twitter application credentials
            app_key: required_env("APP_KEY")?,
            app_secret: required_env("APP_SECRET")?,
            callback_url: required_env("CALLBACK_URL")?,
            twitter_api_url: env_or_default("TWITTER_API_URL", "https://api.twitter.com")
                .trim_end_matches('/')
                .to_string(),
            http_timeout: Duration::from_secs(parse_env_u64("HTTP_TIMEOUT_SECS", 30)?),

            // Sessions
            session_ttl: Duration::from_secs(parse_env_u64("SESSION_TTL_SECS", 86_400)?),
            session_cleanup_interval: Duration::from_secs(parse_env_u64(
                "SESSION_CLEANUP_INTERVAL_SECS",
                600,
            )?),
            cookie_secure: parse_env_bool("COOKIE_SECURE", false)?,

            // Web Server
            web_host: env_or_default("WEB_HOST", "::1"),
            web_port: parse_env_u16("WEB_PORT", 8080)?,
        })
    }

    /// Configuration with placeholder credentials, for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            app_key: "test-app-key".to_string(),
            app_secret: "test-app-secret".to_string(),
            callback_url: "http://localhost:8080/callback/".to_string(),
            twitter_api_url: "http://127.0.0.1:1".to_string(),
            http_timeout: Duration::from_secs(5),
            session_ttl: Duration::from_secs(3600),
            session_cleanup_interval: Duration::from_secs(600),
            cookie_secure: false,
            web_host: "127.0.0.1".to_string(),
            web_port: 8080,
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "APP_KEY".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.app_secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "APP_SECRET".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if url::Url::parse(&self.callback_url).is_err() {
            return Err(ConfigError::InvalidValue {
                name: "CALLBACK_URL".to_string(),
                message: format!("not a valid URL: '{}'", self.callback_url),
            });
        }
        if url::Url::parse(&self.twitter_api_url).is_err() {
            return Err(ConfigError::InvalidValue {
                name: "TWITTER_API_URL".to_string(),
                message: format!("not a valid URL: '{}'", self.twitter_api_url),
            });
        }
        if self.session_ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_TTL_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.session_cleanup_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_CLEANUP_INTERVAL_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}
