//! OAuth 1.0a request signing.
//!
//! Implements the HMAC-SHA1 signature method from RFC 5849: parameters are
//! percent-encoded, sorted and joined into a signature base string, which is
//! signed with `consumer_secret&token_secret`. The result is sent in an
//! `Authorization: OAuth ...` header.

use base64::engine::general_purpose::STANDARD as BASE64;
use std::fmt;

use base64::Engine;
use hmac::digest::{InvalidLength, KeyInit};
use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sha1::Sha1;

use crate::constants::NONCE_LENGTH;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const REDACTED: &str = "<redacted>";

/// Application (consumer) credentials.
#[derive(Clone)]
pub struct Consumer {
    pub key: String,
    pub secret: String,
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("key", &self.key)
            .field("secret", &REDACTED)
            .finish()
    }
}

/// An OAuth token and its secret, either a request token or an access token.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TokenPair {
    pub oauth_token: String,
    pub oauth_token_secret: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("oauth_token", &self.oauth_token)
            .field("oauth_token_secret", &REDACTED)
            .finish()
    }
}

impl TokenPair {
    #[must_use]
    pub fn new(oauth_token: impl Into<String>, oauth_token_secret: impl Into<String>) -> Self {
        Self {
            oauth_token: oauth_token.into(),
            oauth_token_secret: oauth_token_secret.into(),
        }
    }

    /// Whether there is a token to sign with. A session that has not started
    /// the handshake carries an empty pair.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.oauth_token.is_empty()
    }
}

/// Percent-encode per RFC 3986: everything except `A-Z a-z 0-9 - . _ ~`.
#[must_use]
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Build the signature base string for a request.
///
/// `base_url` must not contain a query string; query and form parameters
/// belong in `params` together with the `oauth_*` protocol parameters.
#[must_use]
pub fn signature_base_string(method: &str, base_url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(base_url),
        percent_encode(&normalized)
    )
}

/// Sign a base string with HMAC-SHA1 and return the base64 signature.
///
/// # Errors
///
/// Returns an error if the MAC rejects the signing key.
pub fn sign(
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, InvalidLength> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac = <Hmac<Sha1> as KeyInit>::new_from_slice(key.as_bytes())?;
    mac.update(base_string.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Generate a random nonce for a single request.
pub fn generate_nonce() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

/// Builds the `Authorization` header for one request.
#[derive(Debug)]
pub struct Signer<'a> {
    consumer: &'a Consumer,
    token: Option<&'a TokenPair>,
    nonce: String,
    timestamp: i64,
}

impl<'a> Signer<'a> {
    /// Signer with a fresh nonce and the current time. An empty token pair
    /// is treated as no token.
    #[must_use]
    pub fn new(consumer: &'a Consumer, token: Option<&'a TokenPair>) -> Self {
        Self {
            consumer,
            token: token.filter(|t| !t.is_empty()),
            nonce: generate_nonce(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Fix nonce and timestamp, for reproducible signatures.
    #[must_use]
    pub fn with_nonce_and_timestamp(mut self, nonce: impl Into<String>, timestamp: i64) -> Self {
        self.nonce = nonce.into();
        self.timestamp = timestamp;
        self
    }

    /// Compute the `Authorization` header value.
    ///
    /// `request_params` are the query and form parameters of the request.
    /// `extra_oauth` are protocol parameters beyond the standard set, such as
    /// `oauth_callback` or `oauth_verifier`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be signed.
    pub fn authorization_header(
        &self,
        method: &str,
        base_url: &str,
        request_params: &[(String, String)],
        extra_oauth: &[(&str, &str)],
    ) -> Result<String, InvalidLength> {
        let mut oauth_params: Vec<(String, String)> = vec![
            ("oauth_consumer_key".into(), self.consumer.key.clone()),
            ("oauth_nonce".into(), self.nonce.clone()),
            ("oauth_signature_method".into(), SIGNATURE_METHOD.into()),
            ("oauth_timestamp".into(), self.timestamp.to_string()),
            ("oauth_version".into(), OAUTH_VERSION.into()),
        ];
        if let Some(token) = self.token {
            oauth_params.push(("oauth_token".into(), token.oauth_token.clone()));
        }
        for (k, v) in extra_oauth {
            oauth_params.push(((*k).to_string(), (*v).to_string()));
        }

        let mut all_params = oauth_params.clone();
        all_params.extend(request_params.iter().cloned());

        let base_string = signature_base_string(method, base_url, &all_params);
        let token_secret = self.token.map_or("", |t| t.oauth_token_secret.as_str());
        let signature = sign(&base_string, &self.consumer.secret, token_secret)?;

        oauth_params.push(("oauth_signature".into(), signature));
        oauth_params.sort();

        let fields = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {fields}"))
    }
}

/// Parse an `application/x-www-form-urlencoded` token response body.
#[must_use]
pub fn parse_form_body(body: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(body.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_percent_encode_reserved() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(percent_encode("!*'()"), "%21%2A%27%28%29");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
    }

    #[test]
    fn test_signature_matches_published_example() {
        let params = pairs(&[
            ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
            ("include_entities", "true"),
            ("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog"),
            ("oauth_nonce", "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg"),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "1318622958"),
            (
                "oauth_token",
                "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            ),
            ("oauth_version", "1.0"),
        ]);
        let base = signature_base_string(
            "post",
            "https://api.twitter.com/1.1/statuses/update.json",
            &params,
        );
        assert!(base.starts_with(
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&include_entities%3Dtrue%26"
        ));
        assert!(base.ends_with("status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"));

        let signature = sign(
            &base,
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        )
        .unwrap();
        assert_eq!(signature, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn test_sign_without_token_secret() {
        let params = pairs(&[("oauth_callback", "http://localhost/cb")]);
        let base = signature_base_string("POST", "http://x/oauth/request_token", &params);
        assert_eq!(
            base,
            "POST&http%3A%2F%2Fx%2Foauth%2Frequest_token&oauth_callback%3Dhttp%253A%252F%252Flocalhost%252Fcb"
        );
        assert_eq!(sign(&base, "secret", "").unwrap(), "qNjnLefv0QFuHCqaAgeXclUmEbE=");
    }

    #[test]
    fn test_header_omits_empty_token() {
        let consumer = Consumer {
            key: "key".into(),
            secret: "secret".into(),
        };
        let empty = TokenPair::default();
        let header = Signer::new(&consumer, Some(&empty))
            .with_nonce_and_timestamp("abc", 1)
            .authorization_header("GET", "http://x/y", &[], &[])
            .unwrap();

        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_consumer_key=\"key\""));
        assert!(header.contains("oauth_nonce=\"abc\""));
        assert!(header.contains("oauth_timestamp=\"1\""));
        assert!(header.contains("oauth_signature=\""));
        assert!(!header.contains("oauth_token="));
    }

    #[test]
    fn test_header_includes_token_and_extras() {
        let consumer = Consumer {
            key: "key".into(),
            secret: "secret".into(),
        };
        let token = TokenPair::new("tok", "toksecret");
        let header = Signer::new(&consumer, Some(&token)).authorization_header(
            "POST",
            "http://x/oauth/request_token",
            &[],
            &[("oauth_callback", "http://localhost/cb")],
        )
        .unwrap();

        assert!(header.contains("oauth_token=\"tok\""));
        assert!(header.contains("oauth_callback=\"http%3A%2F%2Flocalhost%2Fcb\""));
    }

    #[test]
    fn test_generate_nonce() {
        let a = generate_nonce();
        let b = generate_nonce();
        assert_eq!(a.len(), NONCE_LENGTH);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let consumer = Consumer {
            key: "app-key".into(),
            secret: "app-secret".into(),
        };
        let token = TokenPair::new("tok", "toksecret");

        let consumer_debug = format!("{consumer:?}");
        let token_debug = format!("{token:?}");
        let signer_debug = format!("{:?}", Signer::new(&consumer, Some(&token)));

        assert!(consumer_debug.contains("app-key"));
        assert!(token_debug.contains("tok"));
        for output in [&consumer_debug, &token_debug, &signer_debug] {
            assert!(!output.contains("app-secret"), "{output}");
            assert!(!output.contains("toksecret"), "{output}");
        }
    }

    #[test]
    fn test_parse_form_body() {
        let parsed = parse_form_body("oauth_token=a%2Bb&oauth_token_secret=s&x=");
        assert_eq!(
            parsed,
            pairs(&[("oauth_token", "a+b"), ("oauth_token_secret", "s"), ("x", "")])
        );
    }
}
