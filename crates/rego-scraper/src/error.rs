use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Invalid registration")]
    InvalidRegistration,

    #[error("Expected element missing at {selector}: {reason}")]
    Extraction { selector: String, reason: String },

    #[error("Browser error: {0}")]
    Browser(#[from] rego_browser::BrowserError),

    #[error("Lookup did not finish within {0:?}")]
    Timeout(Duration),
}

impl ScrapeError {
    pub(crate) fn missing(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Extraction {
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failure came from a deadline rather than the page itself.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Browser(rego_browser::BrowserError::Timeout(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
