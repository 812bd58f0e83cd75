//! Configuration management for the lookup service.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::layout::PageLayout;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "REGO_CHECK_CONFIG";

/// Main application configuration.
///
/// This is loaded from `~/.config/rego-check/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Lookup form and deadline settings
    pub lookup: LookupConfig,
    /// Results page layout
    pub layout: PageLayout,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// The file named by `REGO_CHECK_CONFIG` takes precedence over the
    /// XDG location.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => PathBuf::from(path),
            None => Self::config_path()?,
        };
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file, using defaults if it is absent.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides, then validate.
    ///
    /// Supports the following environment variables:
    /// - `REGO_CHECK_PORT`: Override listen port
    /// - `REGO_CHECK_HEADLESS`: Override browser headless mode (true/false)
    /// - `REGO_CHECK_SCREENSHOT_PATH`: Override screenshot path (empty disables)
    /// - `REGO_CHECK_MAX_SESSIONS`: Override concurrent browser session limit
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup function.
    ///
    /// Unparsable values are ignored and the file value is kept.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("REGO_CHECK_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
                tracing::debug!("Override server.port from env: {}", port);
            }
        }

        if let Some(val) = var("REGO_CHECK_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(val) = var("REGO_CHECK_SCREENSHOT_PATH") {
            self.lookup.screenshot_path = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
            tracing::debug!(
                "Override lookup.screenshot_path from env: {:?}",
                self.lookup.screenshot_path
            );
        }

        if let Some(val) = var("REGO_CHECK_MAX_SESSIONS") {
            if let Ok(max) = val.parse() {
                self.lookup.max_concurrent_sessions = max;
                tracing::debug!("Override lookup.max_concurrent_sessions from env: {}", max);
            }
        }
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        url::Url::parse(&self.lookup.url)
            .map_err(|e| invalid("lookup.url", &e.to_string()))?;

        if self.lookup.max_concurrent_sessions == 0 {
            return Err(invalid("lookup.max_concurrent_sessions", "must be at least 1"));
        }
        if self.lookup.request_timeout_secs == 0 {
            return Err(invalid("lookup.request_timeout_secs", "must be at least 1"));
        }
        if self.lookup.close_timeout_secs == 0 {
            return Err(invalid("lookup.close_timeout_secs", "must be at least 1"));
        }
        if self.lookup.network_idle_timeout_secs == 0 {
            return Err(invalid("lookup.network_idle_timeout_secs", "must be at least 1"));
        }
        if self.browser.navigation_timeout_secs == 0 {
            return Err(invalid("browser.navigation_timeout_secs", "must be at least 1"));
        }

        self.layout.validate()
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/rego-check/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("au", "rego-check", "rego-check").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Chrome/Chromium binary; detected automatically when unset
    pub chrome_executable: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_secs: 30,
            chrome_executable: None,
        }
    }
}

/// Lookup form and deadline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Free registration check page
    pub url: String,
    /// Plate number input
    pub plate_input_selector: String,
    /// Terms and conditions checkbox
    pub terms_selector: String,
    /// Key pressed to submit the form
    pub submit_key: String,
    /// Quiet window with no in-flight requests that counts as idle
    pub network_idle_ms: u64,
    /// Upper bound on the network idle wait
    pub network_idle_timeout_secs: u64,
    /// Deadline for a whole lookup, including waiting for a session slot
    pub request_timeout_secs: u64,
    /// Bound on shutting a session down once the lookup is over
    pub close_timeout_secs: u64,
    /// Browser sessions allowed to run at once
    pub max_concurrent_sessions: usize,
    /// Where the diagnostic screenshot is written; `None` disables it
    pub screenshot_path: Option<PathBuf>,
}

impl LookupConfig {
    /// Quiet window as a `Duration`.
    #[must_use]
    pub fn network_idle(&self) -> Duration {
        Duration::from_millis(self.network_idle_ms)
    }

    /// Network idle bound as a `Duration`.
    #[must_use]
    pub fn network_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.network_idle_timeout_secs)
    }

    /// Lookup deadline as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Session shutdown bound as a `Duration`.
    #[must_use]
    pub fn close_timeout(&self) -> Duration {
        Duration::from_secs(self.close_timeout_secs)
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            url: "https://my.service.nsw.gov.au/MyServiceNSW/index#/rms/freeRegoCheck/details"
                .to_string(),
            plate_input_selector: "input[name=formly_2_input_plateNumber_0]".to_string(),
            terms_selector:
                "input[name=formly_2_checkbox-label-with-action_termsAndConditions_1]".to_string(),
            submit_key: "Enter".to_string(),
            network_idle_ms: 500,
            network_idle_timeout_secs: 30,
            request_timeout_secs: 90,
            close_timeout_secs: 10,
            max_concurrent_sessions: 4,
            screenshot_path: Some(PathBuf::from("screenshot.png")),
        }
    }
}
