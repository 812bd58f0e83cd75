//! Mapping of lookup failures onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rego_core::ValidationError;
use rego_scraper::ScrapeError;
use thiserror::Error;
use tracing::error;

/// Body returned when the plate has no matching record.
pub const INVALID_REGISTRATION_BODY: &str = "Invalid registration.";

/// Body returned for failures on the lookup service's side.
pub const LOOKUP_FAILED_BODY: &str = "Unable to complete registration lookup.";

/// Body returned when the lookup deadline passes.
pub const LOOKUP_TIMEOUT_BODY: &str = "Registration lookup timed out.";

/// Every way a request can fail.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),
}

impl ApiError {
    /// Status code sent for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(ValidationError::Missing) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) | ApiError::Scrape(ScrapeError::InvalidRegistration) => {
                StatusCode::FORBIDDEN
            }
            ApiError::Scrape(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Scrape(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn body(&self) -> String {
        match self {
            ApiError::Validation(e) => e.to_string(),
            ApiError::Scrape(ScrapeError::InvalidRegistration) => {
                INVALID_REGISTRATION_BODY.to_string()
            }
            ApiError::Scrape(e) if e.is_timeout() => LOOKUP_TIMEOUT_BODY.to_string(),
            ApiError::Scrape(_) => LOOKUP_FAILED_BODY.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Scrape(ScrapeError::Extraction { selector, reason }) => {
                error!(%selector, %reason, "Results page did not match the expected layout");
            }
            ApiError::Scrape(e) if e.is_timeout() => error!("Lookup timed out: {}", e),
            ApiError::Scrape(ScrapeError::Browser(e)) => error!("Browser automation failed: {}", e),
            _ => {}
        }

        (self.status(), self.body()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
