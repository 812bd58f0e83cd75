//! Lookup engine driving the free registration check form.
//!
//! Each call to [`LookupEngine::lookup`] owns one browser session from
//! launch to close. The number of sessions alive at once is bounded by a
//! semaphore, and the whole lookup (waiting for a slot included) runs
//! under a single deadline. Closing the session afterwards has its own
//! shorter bound.

use crate::error::{Result, ScrapeError};
use crate::parser::ResultParser;
use rego_browser::{BrowserActions, BrowserError, BrowserLauncher};
use rego_core::{LookupConfig, PageLayout, Plate, VehicleRecord};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, info_span, warn, Instrument};

/// Runs registration lookups against the configured form.
pub struct LookupEngine {
    /// Opens one isolated browser per lookup
    launcher: Arc<dyn BrowserLauncher>,
    /// Form selectors, waits and deadline
    config: LookupConfig,
    /// Results page layout
    layout: PageLayout,
    /// Slots for concurrently open browser sessions
    sessions: Arc<Semaphore>,
}

impl LookupEngine {
    /// Create a new lookup engine.
    #[must_use]
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        config: LookupConfig,
        layout: PageLayout,
    ) -> Self {
        let sessions = Arc::new(Semaphore::new(config.max_concurrent_sessions.max(1)));
        Self {
            launcher,
            config,
            layout,
            sessions,
        }
    }

    /// Look up a plate.
    ///
    /// The browser session is closed exactly once whether the lookup
    /// succeeds, the plate is unknown, the page layout does not match,
    /// the browser fails, or the deadline passes.
    pub async fn lookup(&self, plate: &Plate) -> Result<VehicleRecord> {
        let span = info_span!("lookup", id = %uuid::Uuid::new_v4(), plate = %plate);
        self.lookup_inner(plate).instrument(span).await
    }

    async fn lookup_inner(&self, plate: &Plate) -> Result<VehicleRecord> {
        let budget = self.config.request_timeout();
        let deadline = Instant::now() + budget;
        let started = Instant::now();

        let _permit = timeout_at(deadline, self.sessions.acquire())
            .await
            .map_err(|_| ScrapeError::Timeout(budget))?
            .map_err(|_| BrowserError::ChromiumError("session limiter closed".to_string()))?;

        info!("Starting registration lookup");

        let mut session = timeout_at(deadline, self.launcher.launch())
            .await
            .map_err(|_| ScrapeError::Timeout(budget))??;

        let outcome = timeout_at(deadline, self.drive(session.as_ref(), plate))
            .await
            .unwrap_or(Err(ScrapeError::Timeout(budget)));

        match tokio::time::timeout(self.config.close_timeout(), session.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to close browser session: {}", e),
            Err(_) => warn!(
                "Browser session did not close within {:?}; dropping it",
                self.config.close_timeout()
            ),
        }

        match &outcome {
            Ok(_) => info!(elapsed = ?started.elapsed(), "Lookup complete"),
            Err(ScrapeError::InvalidRegistration) => info!("Plate not found"),
            Err(e) => warn!(elapsed = ?started.elapsed(), "Lookup failed: {}", e),
        }
        outcome
    }

    /// Steps through the form on an open session.
    async fn drive(&self, page: &dyn BrowserActions, plate: &Plate) -> Result<VehicleRecord> {
        page.navigate(&self.config.url).await?;

        debug!("Filling plate number");
        page.fill_field(&self.config.plate_input_selector, plate.as_str())
            .await?;

        debug!("Accepting terms and conditions");
        page.click(&self.config.terms_selector).await?;

        debug!("Submitting form");
        page.press_key(&self.config.submit_key).await?;

        page.wait_for_network_idle(
            self.config.network_idle(),
            self.config.network_idle_timeout(),
        )
        .await?;

        self.save_screenshot(page).await;

        let html = page.page_html().await?;
        debug!(bytes = html.len(), "Captured results page");

        ResultParser::new(&self.layout).parse(&html)
    }

    /// Diagnostic only; failures are logged and otherwise ignored.
    async fn save_screenshot(&self, page: &dyn BrowserActions) {
        let Some(path) = &self.config.screenshot_path else {
            return;
        };

        let png = match page.screenshot().await {
            Ok(png) => png,
            Err(e) => {
                warn!("Screenshot capture failed: {}", e);
                return;
            }
        };

        match tokio::fs::write(path, &png).await {
            Ok(()) => debug!("Wrote screenshot to {}", path.display()),
            Err(e) => warn!("Failed to write screenshot to {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{invalid_page, results_page, Fault, ScriptedLauncher};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    fn test_config(screenshot_dir: &TempDir) -> LookupConfig {
        LookupConfig {
            request_timeout_secs: 1,
            screenshot_path: Some(screenshot_dir.path().join("screenshot.png")),
            ..LookupConfig::default()
        }
    }

    fn engine(launcher: &Arc<ScriptedLauncher>, config: LookupConfig) -> LookupEngine {
        let launcher: Arc<dyn BrowserLauncher> = launcher.clone();
        LookupEngine::new(launcher, config, PageLayout::default())
    }

    fn plate() -> Plate {
        Plate::parse(Some("ABC123")).expect("valid plate")
    }

    #[tokio::test]
    async fn test_lookup_success() {
        let tmp = TempDir::new().expect("create temp dir");
        let launcher = Arc::new(ScriptedLauncher::new(results_page()));
        let engine = engine(&launcher, test_config(&tmp));

        let record = assert_ok!(engine.lookup(&plate()).await);
        assert_eq!(record.vehicle.model, "Toyota Corolla");
        assert_eq!(record.vehicle.identification_number, "1HGCM82633A004352");
        assert_eq!(record.vehicle.registration.conditions, "N/A");

        assert_eq!(launcher.counters.launched(), 1);
        assert_eq!(launcher.counters.closed(), 1);
        assert!(tmp.path().join("screenshot.png").exists());
    }

    #[tokio::test]
    async fn test_invalid_registration_closes_session() {
        let tmp = TempDir::new().expect("create temp dir");
        let launcher = Arc::new(ScriptedLauncher::new(invalid_page()));
        let engine = engine(&launcher, test_config(&tmp));

        let err = assert_err!(engine.lookup(&plate()).await);
        assert!(matches!(err, ScrapeError::InvalidRegistration));
        assert_eq!(launcher.counters.closed(), 1);
    }

    #[tokio::test]
    async fn test_extraction_failure_closes_session() {
        let tmp = TempDir::new().expect("create temp dir");
        let launcher = Arc::new(ScriptedLauncher::new(
            "<html><body>maintenance</body></html>".to_string(),
        ));
        let engine = engine(&launcher, test_config(&tmp));

        let err = assert_err!(engine.lookup(&plate()).await);
        assert!(matches!(err, ScrapeError::Extraction { .. }));
        assert_eq!(launcher.counters.closed(), 1);
    }

    #[tokio::test]
    async fn test_browser_failures_close_session() {
        for fault in [Fault::Navigate, Fault::MissingPlateInput] {
            let tmp = TempDir::new().expect("create temp dir");
            let launcher = Arc::new(ScriptedLauncher::new(results_page()).with_fault(fault));
            let engine = engine(&launcher, test_config(&tmp));

            let err = assert_err!(engine.lookup(&plate()).await);
            assert!(matches!(err, ScrapeError::Browser(_)), "{fault:?}: {err}");
            assert_eq!(launcher.counters.launched(), 1, "{fault:?}");
            assert_eq!(launcher.counters.closed(), 1, "{fault:?}");
        }
    }

    #[tokio::test]
    async fn test_launch_failure() {
        let tmp = TempDir::new().expect("create temp dir");
        let launcher = Arc::new(ScriptedLauncher::new(results_page()).with_fault(Fault::Launch));
        let engine = engine(&launcher, test_config(&tmp));

        let err = assert_err!(engine.lookup(&plate()).await);
        assert!(matches!(err, ScrapeError::Browser(BrowserError::ChromiumError(_))));
        assert_eq!(launcher.counters.closed(), 0);
    }

    #[tokio::test]
    async fn test_deadline_closes_session() {
        let tmp = TempDir::new().expect("create temp dir");
        let launcher =
            Arc::new(ScriptedLauncher::new(results_page()).with_fault(Fault::StallNetwork));
        let engine = engine(&launcher, test_config(&tmp));

        let err = assert_err!(engine.lookup(&plate()).await);
        assert!(matches!(err, ScrapeError::Timeout(d) if d == Duration::from_secs(1)));
        assert!(err.is_timeout());
        assert_eq!(launcher.counters.closed(), 1);
    }

    #[tokio::test]
    async fn test_hung_close_is_bounded() {
        let tmp = TempDir::new().expect("create temp dir");
        let launcher =
            Arc::new(ScriptedLauncher::new(results_page()).with_fault(Fault::HangClose));
        let config = LookupConfig {
            request_timeout_secs: 5,
            close_timeout_secs: 1,
            screenshot_path: None,
            ..test_config(&tmp)
        };
        let engine = engine(&launcher, config);

        let outcome = tokio::time::timeout(Duration::from_secs(3), engine.lookup(&plate()))
            .await
            .expect("lookup returns despite a hung close");
        let record = assert_ok!(outcome);
        assert_eq!(record.vehicle.model, "Toyota Corolla");
        assert_eq!(launcher.counters.closed(), 1);
    }

    #[tokio::test]
    async fn test_screenshot_failure_is_not_fatal() {
        let tmp = TempDir::new().expect("create temp dir");
        let launcher =
            Arc::new(ScriptedLauncher::new(results_page()).with_fault(Fault::Screenshot));
        let engine = engine(&launcher, test_config(&tmp));

        assert_ok!(engine.lookup(&plate()).await);
        assert!(!tmp.path().join("screenshot.png").exists());
    }

    #[tokio::test]
    async fn test_unwritable_screenshot_path_is_not_fatal() {
        let tmp = TempDir::new().expect("create temp dir");
        let launcher = Arc::new(ScriptedLauncher::new(results_page()));
        let config = LookupConfig {
            screenshot_path: Some(tmp.path().join("missing-dir").join("screenshot.png")),
            ..test_config(&tmp)
        };
        let engine = engine(&launcher, config);

        let record = assert_ok!(engine.lookup(&plate()).await);
        assert_eq!(record.vehicle.weight.tare, "1200");
        assert_eq!(launcher.counters.closed(), 1);
    }

    #[tokio::test]
    async fn test_sessions_are_bounded() {
        let tmp = TempDir::new().expect("create temp dir");
        let launcher = Arc::new(
            ScriptedLauncher::new(results_page()).with_idle_delay(Duration::from_millis(50)),
        );
        let config = LookupConfig {
            max_concurrent_sessions: 1,
            request_timeout_secs: 5,
            screenshot_path: None,
            ..test_config(&tmp)
        };
        let engine = engine(&launcher, config);

        let plate = plate();
        let (first, second, third) = tokio::join!(
            engine.lookup(&plate),
            engine.lookup(&plate),
            engine.lookup(&plate)
        );
        assert_ok!(first);
        assert_ok!(second);
        assert_ok!(third);

        assert_eq!(launcher.counters.launched(), 3);
        assert_eq!(launcher.counters.closed(), 3);
        assert_eq!(launcher.counters.peak_active(), 1);
    }
}
