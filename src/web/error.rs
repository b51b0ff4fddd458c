use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// An error that ends a request with a 500.
///
/// The cause is logged; the browser only sees a generic message.
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    /// The underlying error.
    #[must_use]
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
