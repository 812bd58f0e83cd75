//! In-flight request bookkeeping for the network idle wait.
//!
//! A session starts tracking as soon as its page exists, so requests fired
//! by a click or keypress are counted even when nobody is waiting yet.

use crate::error::{BrowserError, Result};
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::watch;

/// Requests that have started and not completed yet.
///
/// Completions for requests that started before tracking began are ignored.
#[derive(Debug, Default)]
pub struct InflightRequests {
    pending: HashSet<String>,
}

impl InflightRequests {
    pub fn started(&mut self, request_id: impl Into<String>) {
        self.pending.insert(request_id.into());
    }

    pub fn finished(&mut self, request_id: &str) {
        self.pending.remove(request_id);
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Publishes the in-flight count on every network event.
///
/// Each event notifies watchers even when the count is unchanged, so a
/// request that starts and finishes inside the quiet window restarts it.
#[derive(Debug)]
pub struct NetworkActivity {
    inflight: InflightRequests,
    count: watch::Sender<usize>,
}

impl NetworkActivity {
    /// Create a tracker and a receiver for its in-flight count.
    pub fn new() -> (Self, watch::Receiver<usize>) {
        let (count, rx) = watch::channel(0);
        let activity = Self {
            inflight: InflightRequests::default(),
            count,
        };
        (activity, rx)
    }

    pub fn started(&mut self, request_id: impl Into<String>) {
        self.inflight.started(request_id);
        self.publish();
    }

    pub fn finished(&mut self, request_id: &str) {
        self.inflight.finished(request_id);
        self.publish();
    }

    fn publish(&self) {
        self.count.send_replace(self.inflight.len());
    }
}

/// Resolve once no request has been in flight for `idle`.
///
/// Fails when the tracker is dropped, which means the event stream ended.
pub async fn wait_for_idle(mut count: watch::Receiver<usize>, idle: Duration) -> Result<()> {
    let closed = |_: watch::error::RecvError| {
        BrowserError::ChromiumError("network event stream closed".to_string())
    };

    loop {
        let inflight = *count.borrow_and_update();
        if inflight == 0 {
            tokio::select! {
                () = tokio::time::sleep(idle) => return Ok(()),
                changed = count.changed() => changed.map_err(closed)?,
            }
        } else {
            count.changed().await.map_err(closed)?;
        }
    }
}
