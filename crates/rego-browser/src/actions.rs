use crate::error::{BrowserError, Result};
use std::time::Duration;

/// Browser actions for automation
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Fill a form field by selector
    async fn fill_field(&self, selector: &str, value: &str) -> Result<()>;

    /// Click an element by selector
    async fn click(&self, selector: &str) -> Result<()>;

    /// Press a named key on whatever element has focus
    async fn press_key(&self, key: &str) -> Result<()>;

    /// Wait until no request has been in flight for `idle`, giving up after `timeout`
    async fn wait_for_network_idle(&self, idle: Duration, timeout: Duration) -> Result<()>;

    /// Take a full-page PNG screenshot
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Outer HTML of the document's root element
    async fn page_html(&self) -> Result<String>;

    /// Shut the browser down. Later calls are no-ops.
    async fn close(&mut self) -> Result<()>;
}

/// Opens isolated browser sessions, one per lookup.
#[async_trait::async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a fresh browser with a single blank page
    async fn launch(&self) -> Result<Box<dyn BrowserActions>>;
}

/// Helper to extract domain from URL
pub fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {}", e)))?;

    url.host_str()
        .ok_or_else(|| BrowserError::NavigationError("No host in URL".to_string()))
        .map(|s| s.to_string())
}
