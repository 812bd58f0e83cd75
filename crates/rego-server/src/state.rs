//! Server context shared by all request handlers.

use rego_browser::{BrowserEngine, BrowserLauncher};
use rego_core::AppConfig;
use rego_scraper::LookupEngine;
use std::sync::Arc;

/// Built once at startup and handed to every handler through axum state.
#[derive(Clone)]
pub struct AppState {
    /// Lookup engine; owns the session limit
    pub engine: Arc<LookupEngine>,
}

impl AppState {
    /// State backed by headless Chromium.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_launcher(config, Arc::new(BrowserEngine::with_config(config.browser.clone())))
    }

    /// State backed by any browser launcher.
    pub fn with_launcher(config: &AppConfig, launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            engine: Arc::new(LookupEngine::new(
                launcher,
                config.lookup.clone(),
                config.layout.clone(),
            )),
        }
    }
}
