use crate::actions::{extract_domain, BrowserActions, BrowserLauncher};
use crate::error::{BrowserError, Result};
use crate::keys::key_definition;
use crate::network::{wait_for_idle, NetworkActivity};
use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures_util::stream::StreamExt;
use rego_core::BrowserConfig;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Script returning the markup of the document's root element.
const ROOT_HTML_SCRIPT: &str = "document.querySelector('*').outerHTML";

/// How long a graceful browser shutdown may take before the process is killed.
const GRACEFUL_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Launches headless Chromium sessions
#[derive(Debug, Clone)]
pub struct BrowserEngine {
    config: BrowserConfig,
}

impl BrowserEngine {
    /// Create a new browser engine with default configuration
    pub fn new() -> Self {
        Self::with_config(BrowserConfig::default())
    }

    /// Create a new browser engine with specific settings
    pub fn with_config(config: BrowserConfig) -> Self {
        Self { config }
    }

    fn chromium_config(&self) -> Result<ChromiumConfig> {
        let mut builder = ChromiumConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .window_size(self.config.window_width, self.config.window_height)
            .request_timeout(Duration::from_secs(self.config.navigation_timeout_secs));

        if !self.config.headless {
            builder = builder.with_head();
        }

        if let Some(path) = &self.config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(BrowserError::ChromiumError)
    }
}

impl Default for BrowserEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BrowserLauncher for BrowserEngine {
    async fn launch(&self) -> Result<Box<dyn BrowserActions>> {
        let config = self.chromium_config()?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    debug!("CDP handler event loop ended");
                    break;
                }
            }
        });

        let opened = open_page(&mut browser).await;
        let mut session = BrowserSession {
            page: None,
            network: None,
            browser: Some(browser),
            handler,
        };

        match opened {
            Ok((page, network)) => {
                session.page = Some(page);
                session.network = Some(network);
            }
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    warn!("Failed to close browser after page setup error: {}", close_err);
                }
                return Err(e);
            }
        }

        info!("Launched headless browser session");
        Ok(Box::new(session))
    }
}

/// Blank page with network tracking already running.
async fn open_page(browser: &mut Browser) -> Result<(Page, NetworkTracker)> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| BrowserError::ChromiumError(format!("Failed to create page: {e}")))?;
    let network = NetworkTracker::attach(&page).await?;
    Ok((page, network))
}

/// Background task counting the page's in-flight requests.
struct NetworkTracker {
    count: watch::Receiver<usize>,
    task: JoinHandle<()>,
}

impl NetworkTracker {
    async fn attach(page: &Page) -> Result<Self> {
        let listen_err = |e: chromiumoxide::error::CdpError| {
            BrowserError::ChromiumError(format!("network event subscription: {e}"))
        };

        let mut sent = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(listen_err)?;
        let mut finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(listen_err)?;
        let mut failed = page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(listen_err)?;

        let (mut activity, count) = NetworkActivity::new();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(event) = sent.next() => activity.started(event.request_id.inner().clone()),
                    Some(event) = finished.next() => activity.finished(event.request_id.inner()),
                    Some(event) = failed.next() => activity.finished(event.request_id.inner()),
                    else => break,
                }
            }
            debug!("Network event streams ended");
        });

        Ok(Self { count, task })
    }
}

impl Drop for NetworkTracker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// One Chromium process with a single page
pub struct BrowserSession {
    page: Option<Page>,
    network: Option<NetworkTracker>,
    browser: Option<Browser>,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| BrowserError::ChromiumError("browser session is closed".to_string()))
    }

    fn network(&self) -> Result<&NetworkTracker> {
        self.network
            .as_ref()
            .ok_or_else(|| BrowserError::ChromiumError("browser session is closed".to_string()))
    }
}

#[async_trait::async_trait]
impl BrowserActions for BrowserSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        let domain = extract_domain(url)?;
        debug!("Navigating to {}", domain);

        self.page()?
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationError(format!("{domain}: {e}")))?;
        Ok(())
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<()> {
        let element = self
            .page()?
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;

        element
            .click()
            .await
            .map_err(|e| BrowserError::InteractionError(format!("focus {selector}: {e}")))?
            .type_str(value)
            .await
            .map_err(|e| BrowserError::InteractionError(format!("type into {selector}: {e}")))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.page()?
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?
            .click()
            .await
            .map_err(|e| BrowserError::InteractionError(format!("click {selector}: {e}")))?;
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        let definition = key_definition(key)
            .ok_or_else(|| BrowserError::InteractionError(format!("unknown key: {key}")))?;
        let page = self.page()?;

        let key_down = if definition.text.is_some() {
            DispatchKeyEventType::KeyDown
        } else {
            DispatchKeyEventType::RawKeyDown
        };

        let events = [
            (key_down, definition.text),
            (DispatchKeyEventType::KeyUp, None),
        ];
        for (event_type, text) in events {
            let mut cmd = DispatchKeyEventParams::builder()
                .r#type(event_type)
                .key(definition.key)
                .code(definition.code)
                .windows_virtual_key_code(definition.key_code)
                .native_virtual_key_code(definition.key_code);
            if let Some(text) = text {
                cmd = cmd.text(text);
            }

            let params = cmd.build().map_err(BrowserError::InteractionError)?;
            page.execute(params)
                .await
                .map_err(|e| BrowserError::InteractionError(format!("press {key}: {e}")))?;
        }
        Ok(())
    }

    async fn wait_for_network_idle(&self, idle: Duration, timeout: Duration) -> Result<()> {
        let count = self.network()?.count.clone();

        let outcome = tokio::time::timeout(timeout, wait_for_idle(count.clone(), idle)).await;
        match outcome {
            Ok(result) => {
                debug!("Network idle");
                result
            }
            Err(_) => {
                let inflight = *count.borrow();
                Err(BrowserError::Timeout(format!(
                    "network not idle after {}ms ({} requests in flight)",
                    timeout.as_millis(),
                    inflight
                )))
            }
        }
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.page()?
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
            .map_err(|e| BrowserError::ChromiumError(format!("screenshot: {e}")))
    }

    async fn page_html(&self) -> Result<String> {
        self.page()?
            .evaluate(ROOT_HTML_SCRIPT)
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?
            .into_value::<String>()
            .map_err(|e| BrowserError::ScriptError(format!("root markup is not a string: {e}")))
    }

    async fn close(&mut self) -> Result<()> {
        self.page = None;
        self.network = None;
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        let result = match tokio::time::timeout(GRACEFUL_CLOSE_TIMEOUT, browser.close()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::ChromiumError(format!("close: {e}"))),
            Err(_) => Err(BrowserError::Timeout(format!(
                "close not acknowledged after {}s",
                GRACEFUL_CLOSE_TIMEOUT.as_secs()
            ))),
        };

        // A failed close leaves the process running; wait() would block on it
        if result.is_err() {
            if let Some(Err(e)) = browser.kill().await {
                warn!("Failed to kill browser process: {}", e);
            }
        }

        if let Err(e) = browser.wait().await {
            warn!("Failed to reap browser process: {}", e);
        }
        self.handler.abort();

        debug!("Browser session closed");
        result
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if self.browser.is_some() {
            // chromiumoxide kills the child process when the Browser handle drops
            warn!("Browser session dropped without close");
        }
        self.handler.abort();
    }
}
