//! Shared constants used across the application.

/// User agent sent with every request to the Twitter API.
pub const USER_AGENT: &str = concat!("likes-counter/", env!("CARGO_PKG_VERSION"));

/// Number of likes requested per page (the API maximum).
pub const LIKES_PAGE_SIZE: u32 = 200;

/// Maximum number of pages fetched for a single ranking.
pub const MAX_LIKES_PAGES: usize = 5;

/// A page with fewer items than this ends pagination.
///
/// `max_id` is inclusive, so a page holding only the cursor item means the
/// timeline is exhausted.
pub const MIN_PAGE_ITEMS: usize = 2;

/// Number of users shown on the ranking page.
pub const TOP_USERS_LIMIT: usize = 15;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Length of generated session tokens.
pub const TOKEN_LENGTH: usize = 64;

/// Length of the `oauth_nonce` sent with each signed request.
pub const NONCE_LENGTH: usize = 32;
