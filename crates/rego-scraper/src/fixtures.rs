//! Synthetic results pages and a scripted browser for tests.

use rego_browser::{BrowserActions, BrowserError, BrowserLauncher};
use rego_core::layout::INVALID_REGISTRATION_MARKER;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn label_row(label: &str, value: &str) -> String {
    format!(
        r#"<div class="snswLabelValue"><div class="row">
            <div class="col-xs-6"><span>{label}</span></div>
            <div class="col-xs-6 hidden-xs"></div>
            <div class="col-xs-6"><strong>{value}</strong></div>
        </div></div>"#
    )
}

pub fn results_page() -> String {
    let rows = [
        ("Tare weight", "1200"),
        ("Gross vehicle mass", "1900"),
        ("Registration expiry", "12/12/2025"),
        ("Registration conditions", ""),
        ("CTP insurance period", "13/12/2024 to 12/12/2025"),
        ("CTP insurer", "NRMA Insurance"),
        ("CTP insurer code", "NRM"),
    ]
    .iter()
    .map(|(label, value)| label_row(label, value))
    .collect::<String>();

    format!(
        r#"<html><head><title>Free rego check</title></head><body>
            <div class="plate-detail">
                <small>ABC123</small>
                <small>Toyota Corolla</small>
                <small>VIN/chassis: 1HGCM82633A004352</small>
            </div>
            {rows}
        </body></html>"#
    )
}

pub fn invalid_page() -> String {
    format!(
        r#"<html><body><div class="form-error"><p>{INVALID_REGISTRATION_MARKER}</p></div></body></html>"#
    )
}

/// Counts shared between a [`ScriptedLauncher`] and the sessions it opens.
#[derive(Debug, Default)]
pub struct SessionCounters {
    pub launched: AtomicUsize,
    pub closed: AtomicUsize,
    pub active: AtomicUsize,
    pub peak_active: AtomicUsize,
}

impl SessionCounters {
    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn peak_active(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }
}

/// Which step of the form interaction should misbehave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    None,
    Launch,
    Navigate,
    MissingPlateInput,
    StallNetwork,
    Screenshot,
    HangClose,
}

pub struct ScriptedLauncher {
    pub html: String,
    pub fault: Fault,
    pub idle_delay: Duration,
    pub counters: Arc<SessionCounters>,
}

impl ScriptedLauncher {
    pub fn new(html: String) -> Self {
        Self {
            html,
            fault: Fault::None,
            idle_delay: Duration::ZERO,
            counters: Arc::new(SessionCounters::default()),
        }
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = fault;
        self
    }

    pub fn with_idle_delay(mut self, delay: Duration) -> Self {
        self.idle_delay = delay;
        self
    }
}

#[async_trait::async_trait]
impl BrowserLauncher for ScriptedLauncher {
    async fn launch(&self) -> rego_browser::Result<Box<dyn BrowserActions>> {
        if self.fault == Fault::Launch {
            return Err(BrowserError::ChromiumError("no chrome binary".to_string()));
        }

        self.counters.launched.fetch_add(1, Ordering::SeqCst);
        let active = self.counters.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak_active.fetch_max(active, Ordering::SeqCst);

        Ok(Box::new(ScriptedPage {
            html: self.html.clone(),
            fault: self.fault,
            idle_delay: self.idle_delay,
            counters: Arc::clone(&self.counters),
            open: true,
        }))
    }
}

struct ScriptedPage {
    html: String,
    fault: Fault,
    idle_delay: Duration,
    counters: Arc<SessionCounters>,
    open: bool,
}

#[async_trait::async_trait]
impl BrowserActions for ScriptedPage {
    async fn navigate(&self, url: &str) -> rego_browser::Result<()> {
        if self.fault == Fault::Navigate {
            return Err(BrowserError::NavigationError(format!("{url}: net::ERR_NAME_NOT_RESOLVED")));
        }
        Ok(())
    }

    async fn fill_field(&self, selector: &str, _value: &str) -> rego_browser::Result<()> {
        if self.fault == Fault::MissingPlateInput {
            return Err(BrowserError::SelectorNotFound(selector.to_string()));
        }
        Ok(())
    }

    async fn click(&self, _selector: &str) -> rego_browser::Result<()> {
        Ok(())
    }

    async fn press_key(&self, _key: &str) -> rego_browser::Result<()> {
        Ok(())
    }

    async fn wait_for_network_idle(
        &self,
        _idle: Duration,
        timeout: Duration,
    ) -> rego_browser::Result<()> {
        if self.fault == Fault::StallNetwork {
            tokio::time::sleep(timeout).await;
            return Err(BrowserError::Timeout("network not idle".to_string()));
        }
        tokio::time::sleep(self.idle_delay).await;
        Ok(())
    }

    async fn screenshot(&self) -> rego_browser::Result<Vec<u8>> {
        if self.fault == Fault::Screenshot {
            return Err(BrowserError::ChromiumError("screenshot: target closed".to_string()));
        }
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn page_html(&self) -> rego_browser::Result<String> {
        Ok(self.html.clone())
    }

    async fn close(&mut self) -> rego_browser::Result<()> {
        if self.open {
            self.open = false;
            self.counters.active.fetch_sub(1, Ordering::SeqCst);
        }
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        if self.fault == Fault::HangClose {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}
